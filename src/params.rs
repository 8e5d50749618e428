//! Parameter definitions with documented ranges and semantics.
//!
//! All tuning constants live here with `Default` impls matching the
//! reference behaviour of the visualization.

/// Spectrum analysis configuration (AnalyserNode-style byte spectra).
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// FFT window size in samples (must be a power of 2)
    pub fft_size: usize,

    /// Audio sample rate (Hz)
    pub sample_rate_hz: usize,

    /// Exponential smoothing applied to magnitude spectra per analysis
    /// call, in [0, 1). 0 = no smoothing, values near 1 = very sluggish.
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte 0 (decibels)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (decibels)
    pub max_decibels: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            sample_rate_hz: 44_100,
            smoothing_time_constant: 0.75,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyzerConfig {
    /// Number of frequency bins produced per analysis (fft_size / 2)
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() {
            return Err(format!("FFT size must be power of 2, got {}", self.fft_size));
        }
        if self.sample_rate_hz == 0 {
            return Err("Sample rate must be > 0".to_string());
        }
        if self.min_decibels >= self.max_decibels {
            return Err("min_decibels must be below max_decibels".to_string());
        }
        Ok(())
    }
}

/// Onset (beat) detector thresholds.
#[derive(Debug, Clone)]
pub struct BeatConfig {
    /// Minimum energy rise between consecutive frames to qualify as an onset
    pub rise_threshold: f32,

    /// Absolute energy floor below which no beat fires
    pub energy_floor: f32,

    /// Minimum simulated seconds between two beats
    pub refractory_s: f32,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            rise_threshold: 0.15,
            energy_floor: 0.4,
            refractory_s: 0.2,
        }
    }
}

/// Per-frame interpolation rates for the scene update.
#[derive(Debug, Clone)]
pub struct SmoothingConfig {
    /// Exponential smoothing factor for the four feature scalars
    pub feature: f32,

    /// Multiplicative decay of the beat value on non-beat frames
    pub beat_decay: f32,

    /// Color channel lerp toward the target scheme
    pub color: f32,

    /// Mode-blend index ease toward the selected surface mode
    pub mode_blend: f32,

    /// Camera ease toward the preset-derived orbit target
    pub camera: f32,

    /// Glow ease back toward `glow_baseline` after a beat peak
    pub glow: f32,

    /// Resting glow strength (beat peaks jump to 1.0)
    pub glow_baseline: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            feature: 0.12,
            beat_decay: 0.9,
            color: 0.05,
            mode_blend: 0.05,
            camera: 0.05,
            glow: 0.08,
            glow_baseline: 0.6,
        }
    }
}

/// Transient effect tuning (ripples, rings, camera shake).
#[derive(Debug, Clone)]
pub struct EffectsConfig {
    /// Maximum concurrent click ripples (FIFO eviction beyond this)
    pub max_ripples: usize,

    /// Multiplicative ring opacity decay per tick
    pub ring_fade: f32,

    /// Opacity below which a ring is removed
    pub ring_cutoff: f32,

    /// Base ring growth speed; actual speed is base + rand[0, 1)
    pub ring_growth_base: f32,

    /// Multiplicative shake intensity decay per tick
    pub shake_decay: f32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            max_ripples: 5,
            ring_fade: 0.96,
            ring_cutoff: 0.01,
            ring_growth_base: 2.0,
            shake_decay: 0.95,
        }
    }
}

/// Spatial domain the visual modes are evaluated over.
#[derive(Debug, Clone)]
pub struct DomainConfig {
    /// Surface plane side length in world units (domain is a square)
    pub extent: f32,

    /// Surface grid resolution (segments per side)
    pub segments: usize,

    /// Vibrating string length (curve family), anchored at both ends
    pub string_length: f32,

    /// Sample points along the string polyline
    pub string_samples: usize,

    /// Perlin noise seed for elevation fields
    pub noise_seed: u32,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            extent: 250.0,
            segments: 200,
            string_length: 200.0,
            string_samples: 256,
            noise_seed: 42,
        }
    }
}

impl DomainConfig {
    /// Half the plane side length; `length(xz) / half_extent` is the
    /// normalized distance from center used by edge fades.
    pub fn half_extent(&self) -> f32 {
        self.extent / 2.0
    }
}

/// Largest frame delta fed to the simulation, in seconds. Guards against
/// huge catch-up steps after the host suspends the frame callback.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Audio constants (compile-time, match the synthesis engine setup)
pub mod audio_constants {
    /// Synthesis block size (samples per buffer)
    pub const BLOCK_SIZE: usize = 128;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_config_validation() {
        assert!(AnalyzerConfig::default().validate().is_ok());

        let mut bad = AnalyzerConfig::default();
        bad.fft_size = 500;
        assert!(bad.validate().is_err());

        let mut bad = AnalyzerConfig::default();
        bad.min_decibels = -20.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_bin_count() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.bin_count(), 256);
    }
}
