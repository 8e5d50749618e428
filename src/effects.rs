//! Beat-driven transient effects: shock rings, click ripples, camera shake.
//!
//! Rings and shake decay in wall-clock frames even while the simulation is
//! paused; ripples age against simulated time, so pausing freezes them.

use std::collections::VecDeque;

use bytemuck::{Pod, Zeroable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::EffectsConfig;

pub const MAX_RIPPLES: usize = 5;

/// Packed ripple slot for the elevation shader: (x, z, spawn_time, strength).
/// Empty slots carry a spawn time far in the past so they contribute nothing.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RippleUniform {
    pub x: f32,
    pub z: f32,
    pub spawn_time: f32,
    pub strength: f32,
}

impl RippleUniform {
    pub const EMPTY: Self = Self {
        x: 0.0,
        z: 0.0,
        spawn_time: -1000.0,
        strength: 0.0,
    };
}

#[derive(Debug, Clone, Copy)]
pub struct Ripple {
    pub x: f32,
    pub z: f32,
    pub spawn_time: f32,
    pub strength: f32,
}

/// An expanding beat ring. Scale grows linearly, opacity decays
/// geometrically; the ring is dropped once it is effectively invisible.
/// `color_index` pins the scheme active at spawn time, so a later scheme
/// switch does not recolor rings already in flight.
#[derive(Debug, Clone, Copy)]
pub struct Ring {
    pub scale: f32,
    pub opacity: f32,
    pub speed: f32,
    pub color_index: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct CameraShake {
    intensity: f32,
}

pub struct TransientEffects {
    config: EffectsConfig,
    rings: Vec<Ring>,
    ripples: VecDeque<Ripple>,
    shake: CameraShake,
    rng: StdRng,
}

impl TransientEffects {
    pub fn new(config: EffectsConfig, seed: u64) -> Self {
        Self {
            config,
            rings: Vec::new(),
            ripples: VecDeque::with_capacity(MAX_RIPPLES),
            shake: CameraShake::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Spawn a ring at the given opacity, stamped with the color scheme
    /// active right now. Growth speed is randomized per ring so stacked
    /// beats separate visually.
    pub fn spawn_ring(&mut self, intensity: f32, color_index: usize) {
        let speed = self.config.ring_growth_base + self.rng.gen::<f32>();
        self.rings.push(Ring {
            scale: 1.0,
            opacity: intensity,
            speed,
            color_index,
        });
    }

    /// Replace the shake intensity. Deliberately an overwrite, not a max:
    /// a weak beat landing mid-shake restarts the decay at its own level.
    pub fn trigger_shake(&mut self, intensity: f32) {
        self.shake.intensity = intensity;
    }

    /// Add a ripple at domain coordinates derived from a normalized click
    /// position. Oldest ripple is evicted beyond the cap.
    pub fn add_ripple(&mut self, normalized_x: f32, normalized_y: f32, time: f32) {
        self.ripples.push_back(Ripple {
            x: normalized_x * 100.0,
            z: normalized_y * 100.0,
            spawn_time: time,
            strength: 1.0,
        });
        while self.ripples.len() > self.config.max_ripples {
            self.ripples.pop_front();
        }
    }

    /// Advance one frame: decay rings and shake, return this frame's
    /// shake offsets. Runs every frame regardless of pause.
    pub fn tick(&mut self) -> (f32, f32) {
        for ring in &mut self.rings {
            ring.scale += ring.speed;
            ring.opacity *= self.config.ring_fade;
        }
        let cutoff = self.config.ring_cutoff;
        self.rings.retain(|ring| ring.opacity >= cutoff);

        let shake_x = (self.rng.gen::<f32>() - 0.5) * self.shake.intensity;
        let shake_y = (self.rng.gen::<f32>() - 0.5) * self.shake.intensity;
        self.shake.intensity *= self.config.shake_decay;
        (shake_x, shake_y)
    }

    /// Fixed-size ripple array for the surface shader, oldest first,
    /// padded with empty slots.
    pub fn ripple_uniforms(&self) -> [RippleUniform; MAX_RIPPLES] {
        let mut out = [RippleUniform::EMPTY; MAX_RIPPLES];
        for (slot, ripple) in out.iter_mut().zip(self.ripples.iter()) {
            *slot = RippleUniform {
                x: ripple.x,
                z: ripple.z,
                spawn_time: ripple.spawn_time,
                strength: ripple.strength,
            };
        }
        out
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn ripples(&self) -> impl Iterator<Item = &Ripple> {
        self.ripples.iter()
    }

    pub fn shake_intensity(&self) -> f32 {
        self.shake.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effects() -> TransientEffects {
        TransientEffects::new(EffectsConfig::default(), 7)
    }

    #[test]
    fn test_ring_grows_and_fades() {
        let mut fx = effects();
        fx.spawn_ring(1.0, 0);
        let speed = fx.rings()[0].speed;
        assert!(speed >= 2.0 && speed < 3.0);

        fx.tick();
        let ring = fx.rings()[0];
        assert!((ring.scale - (1.0 + speed)).abs() < 1e-6);
        assert!((ring.opacity - 0.96).abs() < 1e-6);
    }

    #[test]
    fn test_ring_removed_when_invisible() {
        // 0.96^112 ~= 0.0104, 0.96^113 ~= 0.0100; removal lands at tick 113.
        let mut fx = effects();
        fx.spawn_ring(1.0, 0);
        for _ in 0..112 {
            fx.tick();
        }
        assert_eq!(fx.rings().len(), 1);
        fx.tick();
        assert!(fx.rings().is_empty());
    }

    #[test]
    fn test_ring_keeps_spawn_time_color() {
        let mut fx = effects();
        fx.spawn_ring(0.9, 2);
        fx.spawn_ring(0.8, 4);
        fx.tick();
        // Each ring carries the scheme it was spawned under, independent
        // of any scheme selected afterwards.
        assert_eq!(fx.rings()[0].color_index, 2);
        assert_eq!(fx.rings()[1].color_index, 4);
    }

    #[test]
    fn test_ripple_fifo_keeps_newest_five() {
        let mut fx = effects();
        for i in 0..7 {
            fx.add_ripple(i as f32 * 0.1, 0.0, i as f32);
        }
        let uniforms = fx.ripple_uniforms();
        let times: Vec<f32> = uniforms.iter().map(|u| u.spawn_time).collect();
        assert_eq!(times, vec![2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_ripple_uniforms_padded_with_sentinel() {
        let mut fx = effects();
        fx.add_ripple(0.5, -0.5, 3.0);
        let uniforms = fx.ripple_uniforms();
        assert!((uniforms[0].x - 50.0).abs() < 1e-6);
        assert!((uniforms[0].z + 50.0).abs() < 1e-6);
        assert_eq!(uniforms[0].strength, 1.0);
        for slot in &uniforms[1..] {
            assert_eq!(*slot, RippleUniform::EMPTY);
        }
    }

    #[test]
    fn test_shake_decays_and_stays_bounded() {
        let mut fx = effects();
        fx.trigger_shake(4.0);
        let (x, y) = fx.tick();
        assert!(x.abs() <= 2.0 && y.abs() <= 2.0);
        assert!((fx.shake_intensity() - 4.0 * 0.95).abs() < 1e-6);

        for _ in 0..200 {
            fx.tick();
        }
        assert!(fx.shake_intensity() < 1e-3);
    }

    #[test]
    fn test_shake_overwrites_rather_than_stacks() {
        let mut fx = effects();
        fx.trigger_shake(5.0);
        fx.trigger_shake(1.0);
        assert_eq!(fx.shake_intensity(), 1.0);
    }
}
