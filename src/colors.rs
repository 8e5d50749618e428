//! Color schemes and the eased tri-color state fed to the renderer.

use glam::Vec3;

use crate::params::SmoothingConfig;

/// A named palette of three linear-RGB colors: primary, secondary, accent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScheme {
    pub name: &'static str,
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

const fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

pub const COLOR_SCHEMES: [ColorScheme; 5] = [
    ColorScheme {
        name: "Neon Dreams",
        a: rgb(0x0066ff),
        b: rgb(0x00ffcc),
        c: rgb(0xff0066),
    },
    ColorScheme {
        name: "Solar Flare",
        a: rgb(0xff6600),
        b: rgb(0xffcc00),
        c: rgb(0xff0044),
    },
    ColorScheme {
        name: "Cyberpunk",
        a: rgb(0x9900ff),
        b: rgb(0x00ffff),
        c: rgb(0xff00ff),
    },
    ColorScheme {
        name: "Matrix",
        a: rgb(0x00ff88),
        b: rgb(0x00ffcc),
        c: rgb(0x88ff00),
    },
    ColorScheme {
        name: "Inferno",
        a: rgb(0xff0055),
        b: rgb(0xff8800),
        c: rgb(0xffff00),
    },
];

/// Current smoothed colors, eased toward the selected scheme per frame.
#[derive(Debug, Clone, Copy)]
pub struct ColorState {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    target: usize,
}

impl ColorState {
    pub fn new(scheme_index: usize) -> Self {
        let scheme = &COLOR_SCHEMES[scheme_index % COLOR_SCHEMES.len()];
        Self {
            a: scheme.a,
            b: scheme.b,
            c: scheme.c,
            target: scheme_index % COLOR_SCHEMES.len(),
        }
    }

    pub fn set_target(&mut self, scheme_index: usize) {
        self.target = scheme_index % COLOR_SCHEMES.len();
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Move each channel a fixed fraction toward the target scheme.
    pub fn update(&mut self, smoothing: &SmoothingConfig) {
        let scheme = &COLOR_SCHEMES[self.target];
        let k = smoothing.color;
        self.a += (scheme.a - self.a) * k;
        self.b += (scheme.b - self.b) * k;
        self.c += (scheme.c - self.c) * k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_unpacks_channels() {
        let v = rgb(0xff8000);
        assert!((v.x - 1.0).abs() < 1e-6);
        assert!((v.y - 128.0 / 255.0).abs() < 1e-6);
        assert!(v.z.abs() < 1e-6);
    }

    #[test]
    fn test_color_state_converges_without_overshoot() {
        let smoothing = SmoothingConfig::default();
        let mut state = ColorState::new(0);
        state.set_target(4);
        let target = COLOR_SCHEMES[4];

        let mut prev_dist = (state.a - target.a).length();
        for _ in 0..400 {
            state.update(&smoothing);
            let dist = (state.a - target.a).length();
            assert!(dist <= prev_dist + 1e-6, "distance must not grow");
            prev_dist = dist;
        }
        assert!(prev_dist < 1e-3);
        // Exponential easing never overshoots: each channel stays between
        // its start and target values.
        let start = COLOR_SCHEMES[0];
        for i in 0..3 {
            let lo = start.a[i].min(target.a[i]);
            let hi = start.a[i].max(target.a[i]);
            assert!(state.a[i] >= lo - 1e-6 && state.a[i] <= hi + 1e-6);
        }
    }

    #[test]
    fn test_retarget_mid_transition() {
        let smoothing = SmoothingConfig::default();
        let mut state = ColorState::new(0);
        state.set_target(1);
        for _ in 0..10 {
            state.update(&smoothing);
        }
        state.set_target(2);
        for _ in 0..600 {
            state.update(&smoothing);
        }
        assert!((state.a - COLOR_SCHEMES[2].a).length() < 1e-3);
    }
}
