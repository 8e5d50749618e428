//! Per-frame orchestration: audio features in, render parameters out.
//!
//! `SceneSystem::update` runs the whole frame pipeline in a fixed order:
//! clock, feature smoothing, beat detection, transient triggers, glow,
//! colors, mode blend, effects decay, camera. Vertex displacement itself
//! belongs to the renderer; `refresh_geometry` applies it on the CPU for
//! headless consumers.

use glam::Vec3;

use crate::beat::BeatDetector;
use crate::camera::{CameraFrame, CameraRig};
use crate::colors::ColorState;
use crate::effects::{RippleUniform, TransientEffects, MAX_RIPPLES};
use crate::features::{FeatureSample, WAVEFORM_LEN};
use crate::geometry::GeometryBuffers;
use crate::modes::{
    string_displacement, ElevationField, GeometryFamily, ModeId, SurfaceInputs, BAR_COUNT,
};
use crate::params::{
    BeatConfig, DomainConfig, EffectsConfig, SmoothingConfig, MAX_FRAME_DELTA,
};

/// Family-specific uniforms for the active geometry.
#[derive(Debug, Clone, Copy)]
pub enum GeometryParams {
    Surface {
        /// Continuous mode coordinate for the blended elevation stack.
        mode_blend: f32,
        /// Normalized pointer position in -1..1.
        mouse: (f32, f32),
        ripples: [RippleUniform; MAX_RIPPLES],
    },
    Curve {
        waveform: [f32; WAVEFORM_LEN],
    },
    Histogram {
        waveform: [f32; WAVEFORM_LEN],
        bar_heights: [f32; BAR_COUNT],
    },
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderParams {
    pub time: f32,
    pub amplitude: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub frequency: f32,
    pub beat: f32,
    pub glow: f32,
    pub color_a: Vec3,
    pub color_b: Vec3,
    pub color_c: Vec3,
    pub camera: CameraFrame,
    pub geometry: GeometryParams,
}

pub struct SceneSystem {
    smoothing: SmoothingConfig,
    domain: DomainConfig,

    time: f32,
    amplitude: f32,
    bass: f32,
    mid: f32,
    treble: f32,
    frequency: f32,
    beat_value: f32,
    glow: f32,

    mode: ModeId,
    surface_blend: f32,
    mouse: (f32, f32),
    waveform: [f32; WAVEFORM_LEN],

    detector: BeatDetector,
    effects: TransientEffects,
    colors: ColorState,
    camera: CameraRig,
    field: ElevationField,
    geometry: GeometryBuffers,
}

impl SceneSystem {
    pub fn new(mode: ModeId, scheme_index: usize) -> Self {
        Self::with_configs(
            mode,
            scheme_index,
            SmoothingConfig::default(),
            BeatConfig::default(),
            EffectsConfig::default(),
            DomainConfig::default(),
        )
    }

    pub fn with_configs(
        mode: ModeId,
        scheme_index: usize,
        smoothing: SmoothingConfig,
        beat: BeatConfig,
        effects: EffectsConfig,
        domain: DomainConfig,
    ) -> Self {
        let surface_blend = mode.surface_index().unwrap_or(0) as f32;
        let camera = CameraRig::new(mode.camera_preset(), &smoothing);
        let field = ElevationField::new(&domain);
        let geometry = GeometryBuffers::for_family(mode.family(), &domain);
        let glow = smoothing.glow_baseline;
        Self {
            smoothing,
            time: 0.0,
            amplitude: 0.0,
            bass: 0.0,
            mid: 0.0,
            treble: 0.0,
            // Seeded at its equilibrium so wave frequencies start at full
            // width instead of sweeping up over the first frames.
            frequency: 1.0,
            beat_value: 0.0,
            glow,
            mode,
            surface_blend,
            mouse: (0.0, 0.0),
            waveform: [0.0; WAVEFORM_LEN],
            detector: BeatDetector::new(beat),
            effects: TransientEffects::new(effects, domain.noise_seed as u64),
            colors: ColorState::new(scheme_index),
            camera,
            field,
            geometry,
            domain,
        }
    }

    /// Switch the active mode. Surface-to-surface switches blend through
    /// the elevation stack; family switches rebuild the geometry.
    pub fn set_mode(&mut self, mode: ModeId) {
        if mode == self.mode {
            return;
        }
        log::info!("mode -> {}", mode.label());
        if mode.family() != self.mode.family() {
            self.geometry = GeometryBuffers::for_family(mode.family(), &self.domain);
        }
        self.mode = mode;
        self.camera.set_preset(mode.camera_preset());
    }

    pub fn set_color_scheme(&mut self, scheme_index: usize) {
        self.colors.set_target(scheme_index);
    }

    pub fn set_mouse(&mut self, x: f32, y: f32) {
        self.mouse = (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
    }

    /// Spawn a click ripple at a normalized position, stamped with the
    /// current simulated time.
    pub fn add_ripple(&mut self, normalized_x: f32, normalized_y: f32) {
        self.effects.add_ripple(normalized_x, normalized_y, self.time);
    }

    /// Run one frame. `delta` is wall-clock seconds since the previous
    /// frame; the simulated clock advances by `delta * time_scale` unless
    /// paused. Transient decay ticks even while paused.
    pub fn update(
        &mut self,
        delta: f32,
        features: &FeatureSample,
        paused: bool,
        time_scale: f32,
    ) -> RenderParams {
        let delta = delta.min(MAX_FRAME_DELTA);
        if !paused {
            self.time += delta * time_scale;
        }

        let k = self.smoothing.feature;
        self.amplitude += (features.amplitude - self.amplitude) * k;
        self.bass += (features.bass - self.bass) * k;
        self.mid += (features.mid - self.mid) * k;
        self.treble += (features.treble - self.treble) * k;
        self.frequency += (1.0 - self.frequency) * k;
        self.waveform = features.waveform;

        if self.detector.step(features, self.time) {
            self.beat_value = 1.0;
            self.glow = 1.0;
            if features.bass > 0.6 {
                log::debug!("beat at t={:.2}s, bass {:.2}: ring + shake", self.time, features.bass);
                self.effects.spawn_ring(features.bass, self.colors.target());
                self.effects.trigger_shake(features.bass * 5.0);
            }
        } else {
            self.beat_value *= self.smoothing.beat_decay;
        }

        self.glow += (self.smoothing.glow_baseline - self.glow) * self.smoothing.glow;
        self.colors.update(&self.smoothing);

        if let Some(target) = self.mode.surface_index() {
            self.surface_blend += (target as f32 - self.surface_blend) * self.smoothing.mode_blend;
        }

        let shake = self.effects.tick();
        let camera = self.camera.update(self.time, shake);

        let geometry = match self.mode.family() {
            GeometryFamily::Surface => GeometryParams::Surface {
                mode_blend: self.surface_blend,
                mouse: self.mouse,
                ripples: self.effects.ripple_uniforms(),
            },
            GeometryFamily::Curve => GeometryParams::Curve {
                waveform: self.waveform,
            },
            GeometryFamily::Histogram => GeometryParams::Histogram {
                waveform: self.waveform,
                bar_heights: crate::modes::bar_heights(
                    &self.waveform,
                    self.amplitude,
                    self.beat_value,
                ),
            },
        };

        RenderParams {
            time: self.time,
            amplitude: self.amplitude,
            bass: self.bass,
            mid: self.mid,
            treble: self.treble,
            frequency: self.frequency,
            beat: self.beat_value,
            glow: self.glow,
            color_a: self.colors.a,
            color_b: self.colors.b,
            color_c: self.colors.c,
            camera,
            geometry,
        }
    }

    fn surface_inputs(&self) -> SurfaceInputs {
        SurfaceInputs {
            amplitude: self.amplitude,
            bass: self.bass,
            mid: self.mid,
            treble: self.treble,
            beat: self.beat_value,
            frequency: self.frequency,
        }
    }

    /// Apply the current frame's displacement to the CPU geometry.
    /// Renderers displacing on the GPU never need this; the headless
    /// demo and tests do.
    pub fn refresh_geometry(&mut self) {
        let inputs = self.surface_inputs();
        let t = self.time;
        match &mut self.geometry {
            GeometryBuffers::Surface(grid) => {
                let field = &self.field;
                let blend = self.surface_blend;
                let ripples = self.effects.ripple_uniforms();
                let mouse = self.mouse;
                grid.apply_heights(|x, z| {
                    let base = field.blended_elevation(blend, x, z, t, &inputs);
                    field.post_process(x, z, base, t, &inputs, &ripples, mouse)
                });
            }
            GeometryBuffers::Curve(strip) => {
                strip.apply_displacement(|u| string_displacement(u, t, &inputs));
            }
            GeometryBuffers::Histogram(bars) => {
                bars.update(&self.waveform, self.amplitude, self.beat_value);
            }
        }
    }

    pub fn mode(&self) -> ModeId {
        self.mode
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn surface_blend(&self) -> f32 {
        self.surface_blend
    }

    pub fn effects(&self) -> &TransientEffects {
        &self.effects
    }

    pub fn geometry(&self) -> &GeometryBuffers {
        &self.geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn loud() -> FeatureSample {
        FeatureSample {
            amplitude: 0.8,
            bass: 0.9,
            mid: 0.6,
            treble: 0.4,
            ..FeatureSample::default()
        }
    }

    fn quiet() -> FeatureSample {
        FeatureSample::default()
    }

    fn run_until_beat(scene: &mut SceneSystem) {
        // Warm up past the initial refractory guard, then hit a spike.
        for _ in 0..20 {
            scene.update(DT, &quiet(), false, 1.0);
        }
        scene.update(DT, &loud(), false, 1.0);
    }

    #[test]
    fn test_beat_sets_value_then_decays() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        run_until_beat(&mut scene);
        let p = scene.update(DT, &loud(), false, 1.0);
        // One decay step after the beat frame.
        assert!((p.beat - 0.9).abs() < 1e-6);
        let p = scene.update(DT, &loud(), false, 1.0);
        assert!((p.beat - 0.81).abs() < 1e-6);
    }

    #[test]
    fn test_beat_spawns_ring_and_shake_on_heavy_bass() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        run_until_beat(&mut scene);
        assert_eq!(scene.effects().rings().len(), 1);
        assert!(scene.effects().shake_intensity() > 0.0);
    }

    #[test]
    fn test_ring_color_pinned_at_spawn_scheme() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 3);
        run_until_beat(&mut scene);
        scene.set_color_scheme(1);
        scene.update(DT, &quiet(), false, 1.0);
        assert_eq!(scene.effects().rings()[0].color_index, 3);
    }

    #[test]
    fn test_frequency_starts_at_equilibrium() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        let p = scene.update(DT, &quiet(), false, 1.0);
        assert!((p.frequency - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_glow_peaks_then_settles_at_baseline() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        run_until_beat(&mut scene);
        let mut last = scene.update(DT, &quiet(), false, 1.0).glow;
        assert!(last > 0.6);
        for _ in 0..300 {
            let glow = scene.update(DT, &quiet(), false, 1.0).glow;
            assert!(glow <= last + 1e-6);
            last = glow;
        }
        assert!((last - 0.6).abs() < 1e-3);
    }

    #[test]
    fn test_pause_freezes_clock_but_not_ring_decay() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        run_until_beat(&mut scene);
        let opacity_before = scene.effects().rings()[0].opacity;
        let t = scene.time();

        for _ in 0..10 {
            scene.update(DT, &loud(), true, 1.0);
        }
        assert_eq!(scene.time(), t);
        let rings = scene.effects().rings();
        assert!(rings[0].opacity < opacity_before);
    }

    #[test]
    fn test_pause_freezes_ripple_ages() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        scene.update(DT, &quiet(), false, 1.0);
        scene.add_ripple(0.2, 0.2);
        let spawn = scene.effects().ripple_uniforms()[0].spawn_time;
        let age_before = scene.time() - spawn;
        for _ in 0..10 {
            scene.update(DT, &quiet(), true, 1.0);
        }
        // Frozen clock means the age term (time - spawn) cannot grow.
        assert_eq!(scene.time() - spawn, age_before);
        assert_eq!(scene.effects().ripple_uniforms()[0].spawn_time, spawn);
    }

    #[test]
    fn test_idle_silence_still_animates() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        let mut last_time = 0.0;
        for _ in 0..60 {
            let p = scene.update(DT, &quiet(), false, 1.0);
            assert!(p.time > last_time);
            last_time = p.time;
            assert_eq!(p.amplitude, 0.0);
            assert_eq!(p.bass, 0.0);
            assert!(p.beat.abs() < 1e-6);
            assert!(p.glow.is_finite() && p.camera.position.is_finite());
        }
    }

    #[test]
    fn test_time_scale_slows_clock() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        scene.update(0.1, &quiet(), false, 0.5);
        assert!((scene.time() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_frame_delta_clamped() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        scene.update(5.0, &quiet(), false, 1.0);
        assert!((scene.time() - MAX_FRAME_DELTA).abs() < 1e-6);
    }

    #[test]
    fn test_mode_blend_moves_monotonically() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        scene.set_mode(ModeId::Cymatics);
        let mut last = scene.surface_blend();
        for _ in 0..200 {
            scene.update(DT, &quiet(), false, 1.0);
            let blend = scene.surface_blend();
            assert!(blend >= last - 1e-6);
            last = blend;
        }
        assert!((last - 7.0).abs() < 1e-2);

        scene.set_mode(ModeId::Ocean);
        for _ in 0..200 {
            scene.update(DT, &quiet(), false, 1.0);
            let blend = scene.surface_blend();
            assert!(blend <= last + 1e-6);
            last = blend;
        }
        assert!(last < 0.1);
    }

    #[test]
    fn test_family_switch_rebuilds_geometry() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        assert_eq!(scene.geometry().family(), GeometryFamily::Surface);
        scene.set_mode(ModeId::SpectrumBars);
        assert_eq!(scene.geometry().family(), GeometryFamily::Histogram);
        let p = scene.update(DT, &quiet(), false, 1.0);
        assert!(matches!(p.geometry, GeometryParams::Histogram { .. }));
    }

    #[test]
    fn test_surface_switch_keeps_geometry() {
        let mut scene = SceneSystem::new(ModeId::Ocean, 0);
        scene.set_mode(ModeId::Fire);
        assert_eq!(scene.geometry().family(), GeometryFamily::Surface);
    }

    #[test]
    fn test_curve_geometry_stays_pinned_after_refresh() {
        let mut scene = SceneSystem::new(ModeId::StringVibration, 0);
        for _ in 0..30 {
            scene.update(DT, &loud(), false, 1.0);
        }
        scene.refresh_geometry();
        if let GeometryBuffers::Curve(strip) = scene.geometry() {
            assert!(strip.vertices.first().unwrap().position[1].abs() < 1e-3);
            assert!(strip.vertices.last().unwrap().position[1].abs() < 1e-3);
        } else {
            panic!("expected curve geometry");
        }
    }
}
