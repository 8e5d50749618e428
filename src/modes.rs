//! Visual mode catalog and the elevation math behind each mode.
//!
//! Surface modes share one blended elevation field plus an audio-reactive
//! post pass; the string and histogram modes have their own displacement
//! functions. All functions are pure in the simulated time `t` so a frozen
//! clock yields a frozen shape.

use noise::{NoiseFn, Perlin};

use crate::effects::{RippleUniform, MAX_RIPPLES};
use crate::features::WAVEFORM_LEN;
use crate::params::DomainConfig;

pub const SURFACE_MODE_COUNT: usize = 8;
pub const BAR_COUNT: usize = 64;

/// Which geometry a mode renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFamily {
    /// Displaced height-field grid.
    Surface,
    /// Single displaced polyline.
    Curve,
    /// Row of scaled bars.
    Histogram,
}

/// Per-mode camera orbit parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPreset {
    pub radius: f32,
    pub height: f32,
    pub angular_speed: f32,
    pub fov_degrees: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeId {
    Ocean,
    Vortex,
    Mountain,
    PureSine,
    Fire,
    Explosion,
    RipplePool,
    StringVibration,
    Cymatics,
    SpectrumBars,
}

impl ModeId {
    pub const ALL: [ModeId; 10] = [
        ModeId::Ocean,
        ModeId::Vortex,
        ModeId::Mountain,
        ModeId::PureSine,
        ModeId::Fire,
        ModeId::Explosion,
        ModeId::RipplePool,
        ModeId::StringVibration,
        ModeId::Cymatics,
        ModeId::SpectrumBars,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ModeId::Ocean => "Ocean",
            ModeId::Vortex => "Vortex",
            ModeId::Mountain => "Mountain",
            ModeId::PureSine => "Pure Sine",
            ModeId::Fire => "Fire",
            ModeId::Explosion => "Explosion",
            ModeId::RipplePool => "Ripple Pool",
            ModeId::StringVibration => "String",
            ModeId::Cymatics => "Cymatics",
            ModeId::SpectrumBars => "Spectrum",
        }
    }

    pub fn family(&self) -> GeometryFamily {
        match self {
            ModeId::StringVibration => GeometryFamily::Curve,
            ModeId::SpectrumBars => GeometryFamily::Histogram,
            _ => GeometryFamily::Surface,
        }
    }

    /// Index of a surface mode within the blendable elevation stack.
    /// `None` for the curve and histogram modes.
    pub fn surface_index(&self) -> Option<usize> {
        match self {
            ModeId::Ocean => Some(0),
            ModeId::Vortex => Some(1),
            ModeId::Mountain => Some(2),
            ModeId::PureSine => Some(3),
            ModeId::Fire => Some(4),
            ModeId::Explosion => Some(5),
            ModeId::RipplePool => Some(6),
            ModeId::Cymatics => Some(7),
            _ => None,
        }
    }

    pub fn camera_preset(&self) -> CameraPreset {
        match self {
            ModeId::Ocean | ModeId::Vortex | ModeId::Mountain | ModeId::Fire => CameraPreset {
                radius: 100.0,
                height: 50.0,
                angular_speed: 0.05,
                fov_degrees: 60.0,
            },
            ModeId::PureSine => CameraPreset {
                radius: 120.0,
                height: 60.0,
                angular_speed: 0.03,
                fov_degrees: 55.0,
            },
            ModeId::Explosion => CameraPreset {
                radius: 130.0,
                height: 70.0,
                angular_speed: 0.02,
                fov_degrees: 65.0,
            },
            ModeId::RipplePool => CameraPreset {
                radius: 120.0,
                height: 80.0,
                angular_speed: 0.02,
                fov_degrees: 60.0,
            },
            ModeId::StringVibration => CameraPreset {
                radius: 80.0,
                height: 30.0,
                angular_speed: 0.01,
                fov_degrees: 50.0,
            },
            ModeId::Cymatics => CameraPreset {
                radius: 130.0,
                height: 90.0,
                angular_speed: 0.02,
                fov_degrees: 60.0,
            },
            ModeId::SpectrumBars => CameraPreset {
                radius: 100.0,
                height: 50.0,
                angular_speed: 0.03,
                fov_degrees: 55.0,
            },
        }
    }

    pub fn from_name(name: &str) -> Option<ModeId> {
        match name.to_ascii_lowercase().as_str() {
            "ocean" => Some(ModeId::Ocean),
            "vortex" => Some(ModeId::Vortex),
            "mountain" => Some(ModeId::Mountain),
            "pure-sine" | "puresine" | "sine" => Some(ModeId::PureSine),
            "fire" => Some(ModeId::Fire),
            "explosion" => Some(ModeId::Explosion),
            "ripple-pool" | "ripplepool" => Some(ModeId::RipplePool),
            "string" | "string-vibration" => Some(ModeId::StringVibration),
            "cymatics" => Some(ModeId::Cymatics),
            "spectrum" | "spectrum-bars" | "bars" => Some(ModeId::SpectrumBars),
            _ => None,
        }
    }
}

/// Smoothed audio values driving the elevation functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceInputs {
    pub amplitude: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub beat: f32,
    pub frequency: f32,
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Height-field evaluator for the eight surface modes.
pub struct ElevationField {
    perlin: Perlin,
    half_extent: f32,
}

impl ElevationField {
    pub fn new(domain: &DomainConfig) -> Self {
        Self {
            perlin: Perlin::new(domain.noise_seed),
            half_extent: domain.half_extent(),
        }
    }

    fn noise(&self, x: f32, y: f32, z: f32) -> f32 {
        self.perlin.get([x as f64, y as f64, z as f64]) as f32
    }

    /// Base elevation of one surface mode at (x, z), before the shared
    /// audio post pass.
    pub fn surface_elevation(&self, index: usize, x: f32, z: f32, t: f32, a: &SurfaceInputs) -> f32 {
        let wave_freq = 0.02 + a.frequency * 0.04;
        match index {
            // Ocean: four octaves of drifting noise.
            0 => {
                let w1 = self.noise(x * wave_freq + t * 0.5, z * wave_freq + t * 0.3, t * 0.1);
                let w2 = self.noise(
                    x * wave_freq * 2.0 - t * 0.4,
                    z * wave_freq * 2.0 + t * 0.2,
                    t * 0.15,
                ) * 0.5;
                let w3 = self.noise(
                    x * wave_freq * 4.0 + t * 0.6,
                    z * wave_freq * 4.0 - t * 0.4,
                    t * 0.2,
                ) * 0.25;
                let w4 = self.noise(
                    x * wave_freq * 8.0 - t * 0.8,
                    z * wave_freq * 8.0 + t * 0.6,
                    t * 0.25,
                ) * 0.125;
                (w1 + w2 + w3 + w4) * (5.0 + a.amplitude * 30.0)
            }
            // Vortex: spiral interference plus noise wobble.
            1 => {
                let angle = z.atan2(x);
                let radius = (x * x + z * z).sqrt();
                let spiral = (angle * 5.0 + radius * 0.05 - t * 3.0).sin();
                let radial = (radius * 0.1 - t * 2.0).sin();
                let mut e = spiral * radial * (8.0 + a.amplitude * 25.0);
                e += self.noise(x * 0.02 + t, z * 0.02, t * 0.2) * 5.0 * (1.0 + a.amplitude);
                e
            }
            // Mountain: three noise octaves scaled by amplitude.
            2 => {
                let mut terrain = self.noise(x * 0.01 + t * 0.1, z * 0.01 + t * 0.1, 0.0) * 20.0;
                terrain += self.noise(x * 0.03 + t * 0.2, z * 0.03 + t * 0.15, 1.0) * 10.0;
                terrain += self.noise(x * 0.06 + t * 0.3, z * 0.06 + t * 0.25, 2.0) * 5.0;
                terrain * (0.5 + a.amplitude * 2.0)
            }
            // Pure sine: one clean traveling wave with mild depth variation.
            3 => {
                let sine_freq = 0.03 + a.frequency * 0.06;
                let sine_amp = 8.0 + a.amplitude * 25.0;
                let mut e = (x * sine_freq + t * 2.0).sin() * sine_amp;
                e *= 0.8 + 0.2 * (z * sine_freq * 0.5 + t * 0.5).sin();
                e
            }
            // Fire: upward turbulence, clamped positive, fading at edges.
            4 => {
                let base = self.noise(x * 0.03, z * 0.03 - t * 2.0, t * 0.5) * 15.0;
                let mid = self.noise(x * 0.06, z * 0.06 - t * 3.0, t * 0.8) * 8.0;
                let detail = self.noise(x * 0.12, z * 0.12 - t * 5.0, t * 1.2) * 4.0;
                let flicker = self.noise(x * 0.25, z * 0.25 - t * 8.0, t * 2.0) * 2.0;
                let mut e = (base + mid + detail + flicker) * (0.3 + a.amplitude * 2.5);
                let center_fade = 1.0 - smoothstep(0.0, 0.8, x.abs() / self.half_extent);
                e *= center_fade;
                e.max(0.0)
            }
            // Explosion: two wrapping radial shockwaves.
            5 => {
                let dist = (x * x + z * z).sqrt();
                let shock_width = 15.0;
                let radius1 = (t * 30.0).rem_euclid(150.0);
                let shock1 = (-((dist - radius1) / shock_width).powi(2)).exp();
                let wave1 = (dist * 0.3 - t * 8.0).sin() * shock1;
                let radius2 = (t * 30.0 + 50.0).rem_euclid(150.0);
                let shock2 = (-((dist - radius2) / shock_width).powi(2)).exp();
                let wave2 = (dist * 0.3 - t * 8.0 + 3.14).sin() * shock2 * 0.6;
                let mut e = (wave1 + wave2) * (10.0 + a.amplitude * 30.0);
                e += self.noise(x * 0.05 + t, z * 0.05, t * 0.3) * a.amplitude * 5.0;
                e
            }
            // Ripple pool: two offset wave sources plus a phase-shifted
            // center source, all with distance falloff.
            6 => {
                let freq = 0.15 + a.frequency * 0.2;
                let d1 = ((x - 30.0) * (x - 30.0) + z * z).sqrt();
                let d2 = ((x + 30.0) * (x + 30.0) + z * z).sqrt();
                let d3 = (x * x + z * z).sqrt();
                let r1 = (d1 * freq - t * 4.0).sin() / (1.0 + d1 * 0.02);
                let r2 = (d2 * freq - t * 4.0).sin() / (1.0 + d2 * 0.02);
                let r3 = (d3 * freq - t * 4.0 + 1.57).sin() / (1.0 + d3 * 0.02) * 0.5;
                (r1 + r2 + r3) * (8.0 + a.amplitude * 25.0)
            }
            // Cymatics: Chladni plate patterns, mode numbers driven by
            // frequency and amplitude.
            7 => {
                let cx = x / self.half_extent * std::f32::consts::PI;
                let cz = z / self.half_extent * std::f32::consts::PI;
                let n = 2.0 + (a.frequency * 4.0).floor();
                let m = 3.0 + (a.amplitude * 3.0).floor();
                let c1 = (n * cx + t * 0.5).sin() * (m * cz).sin()
                    - (m * cx).sin() * (n * cz + t * 0.5).sin();
                let (n2, m2) = (n + 1.0, m + 1.0);
                let c2 = (n2 * cx + t * 0.3).sin() * (m2 * cz).sin()
                    - (m2 * cx).sin() * (n2 * cz + t * 0.3).sin();
                (c1 * 0.7 + c2 * 0.3) * (10.0 + a.amplitude * 20.0)
            }
            _ => 0.0,
        }
    }

    /// Linear blend between two adjacent surface modes. `blend` is a
    /// continuous mode coordinate in 0..SURFACE_MODE_COUNT-1.
    pub fn blended_elevation(&self, blend: f32, x: f32, z: f32, t: f32, a: &SurfaceInputs) -> f32 {
        let blend = blend.clamp(0.0, (SURFACE_MODE_COUNT - 1) as f32);
        let lo = blend.floor() as usize;
        let frac = blend - lo as f32;
        if frac < 1e-4 {
            return self.surface_elevation(lo, x, z, t, a);
        }
        let a_elev = self.surface_elevation(lo, x, z, t, a);
        let b_elev = self.surface_elevation(lo + 1, x, z, t, a);
        a_elev + (b_elev - a_elev) * frac
    }

    /// Shared audio post pass: band-driven swells, beat pulse, click
    /// ripples, mouse bulge, then edge fade on the total height.
    #[allow(clippy::too_many_arguments)]
    pub fn post_process(
        &self,
        x: f32,
        z: f32,
        base: f32,
        t: f32,
        a: &SurfaceInputs,
        ripples: &[RippleUniform; MAX_RIPPLES],
        mouse: (f32, f32),
    ) -> f32 {
        let dist_from_center = (x * x + z * z).sqrt() / self.half_extent;

        let bass_wave =
            (x * 0.015 + t * 0.5).sin() * (z * 0.015 + t * 0.3).sin() * a.bass * 25.0;
        let mid_wave = self.noise(x * 0.04 + t, z * 0.04, t * 0.3) * a.mid * 15.0;
        let treble_wave =
            self.noise(x * 0.15 + t * 2.5, z * 0.15 + t * 2.0, t) * a.treble * 8.0;
        let beat_pulse = (dist_from_center * 15.0 - a.beat * 10.0).sin()
            * a.beat
            * 10.0
            * (1.0 - dist_from_center);

        let mut ripple_effect = 0.0;
        for ripple in ripples {
            if ripple.strength > 0.0 {
                let dx = x - ripple.x;
                let dz = z - ripple.z;
                let dist = (dx * dx + dz * dz).sqrt();
                let age = (t - ripple.spawn_time) * 3.0;
                let wave = (dist * 0.5 - age * 5.0).sin()
                    * (-age * 0.5).exp()
                    * (-dist * 0.02).exp();
                ripple_effect += wave * ripple.strength * 15.0;
            }
        }

        let mdx = x - mouse.0 * 100.0;
        let mdz = z - mouse.1 * 100.0;
        let mouse_dist = (mdx * mdx + mdz * mdz).sqrt();
        let mouse_influence = (-mouse_dist * 0.02).exp() * 5.0 * (1.0 + a.amplitude);

        let height =
            base + bass_wave + mid_wave + treble_wave + beat_pulse + ripple_effect + mouse_influence;
        let edge_fade = 1.0 - smoothstep(0.7, 1.0, dist_from_center);
        height * edge_fade
    }
}

/// Standing-wave displacement at normalized string position `u` in 0..1.
/// The sin(pi*u) factor pins both ends to zero.
pub fn string_displacement(u: f32, t: f32, a: &SurfaceInputs) -> f32 {
    use std::f32::consts::PI;
    let amp = 10.0 + a.amplitude * 30.0;
    let mut y = (PI * u).sin() * (t * 3.0).sin() * amp;
    y += (2.0 * PI * u).sin() * (t * 6.0).sin() * amp * a.mid * 0.6;
    y += (3.0 * PI * u).sin() * (t * 9.0).sin() * amp * a.treble * 0.4;
    y += (4.0 * PI * u).sin() * (t * 12.0).sin() * amp * a.bass * 0.3;
    y += (PI * u).sin() * a.beat * 8.0;
    y
}

/// Bar heights for the histogram mode, sampled evenly from the waveform.
/// Every bar keeps a minimum visible height.
pub fn bar_heights(waveform: &[f32; WAVEFORM_LEN], amplitude: f32, beat: f32) -> [f32; BAR_COUNT] {
    let mut out = [0.0f32; BAR_COUNT];
    for (i, bar) in out.iter_mut().enumerate() {
        let data_idx = i * WAVEFORM_LEN / BAR_COUNT;
        let sample = waveform[data_idx];
        *bar = (sample * (20.0 + amplitude * 40.0) + beat * 3.0 * sample).max(0.5);
    }
    out
}
