//! Orbiting camera with per-mode presets, eased retargeting, and shake.

use glam::{Mat4, Vec3};

use crate::modes::CameraPreset;
use crate::params::SmoothingConfig;

/// One frame's camera output: where it sits, where it looks, how wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub position: Vec3,
    pub look_at: Vec3,
    pub fov_degrees: f32,
}

impl CameraFrame {
    /// Combined view-projection matrix for a right-handed Y-up scene.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, 0.1, 2000.0);
        let view = Mat4::look_at_rh(self.position, self.look_at, Vec3::Y);
        proj * view
    }
}

/// Slowly orbiting camera. The orbit target is a pure function of the
/// simulated time and the active preset; the actual position eases toward
/// it, so mode switches glide instead of cutting.
pub struct CameraRig {
    preset: CameraPreset,
    position: Vec3,
    fov_degrees: f32,
    ease: f32,
}

impl CameraRig {
    pub fn new(preset: CameraPreset, smoothing: &SmoothingConfig) -> Self {
        Self {
            preset,
            position: Vec3::new(0.0, preset.height, preset.radius),
            fov_degrees: preset.fov_degrees,
            ease: smoothing.camera,
        }
    }

    pub fn set_preset(&mut self, preset: CameraPreset) {
        self.preset = preset;
    }

    pub fn preset(&self) -> &CameraPreset {
        &self.preset
    }

    /// Advance toward the orbit position for `time` and return the frame.
    /// Shake offsets displace both the eye and, doubled, the look target.
    pub fn update(&mut self, time: f32, shake: (f32, f32)) -> CameraFrame {
        let preset = self.preset;
        let radius = preset.radius + (time * 0.1).sin() * 20.0;
        let angle = time * preset.angular_speed;

        let target = Vec3::new(
            angle.sin() * radius * 0.3 + shake.0,
            preset.height + (time * 0.12).sin() * 10.0 + shake.1,
            radius + (time * 0.08).cos() * 20.0,
        );

        self.position += (target - self.position) * self.ease;
        self.fov_degrees += (preset.fov_degrees - self.fov_degrees) * self.ease;

        CameraFrame {
            position: self.position,
            look_at: Vec3::new(shake.0 * 2.0, shake.1 * 2.0, 0.0),
            fov_degrees: self.fov_degrees,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}
