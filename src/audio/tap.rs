//! Per-source spectrum tap: PCM window in, byte spectra out.
//!
//! Reproduces the analyser contract the visualization was written
//! against: Hann-windowed forward FFT, exponential magnitude smoothing,
//! and byte frequency data mapped from a fixed decibel range.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::params::AnalyzerConfig;

/// Sampling point converting a mono PCM window into byte frequency and
/// time-domain bins. Each audio source owns one, and the registry owns
/// one more for the combined mix, since smoothing state is per-tap.
pub struct SpectrumTap {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    frequency_bytes: Vec<u8>,
    time_domain_bytes: Vec<u8>,
    smoothing: f32,
    min_db: f32,
    max_db: f32,
}

impl SpectrumTap {
    pub fn new(config: &AnalyzerConfig) -> Self {
        let fft_size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Hann window for smoother frequency response
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (fft_size - 1) as f32).cos()))
            .collect();

        let bins = config.bin_count();
        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; bins],
            frequency_bytes: vec![0; bins],
            time_domain_bytes: vec![0; bins],
            smoothing: config.smoothing_time_constant,
            min_db: config.min_decibels,
            max_db: config.max_decibels,
        }
    }

    /// Analyze one window of mono samples. `samples` shorter than the FFT
    /// size is zero-padded; longer input is truncated.
    pub fn process(&mut self, samples: &[f32]) {
        let fft_size = self.scratch.len();

        for i in 0..fft_size {
            let s = samples.get(i).copied().unwrap_or(0.0);
            self.scratch[i] = Complex::new(s * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let norm = 2.0 / fft_size as f32;
        let db_range = self.max_db - self.min_db;
        for (i, bin) in self.scratch[..self.smoothed.len()].iter().enumerate() {
            let magnitude = bin.norm() * norm;
            self.smoothed[i] =
                self.smoothing * self.smoothed[i] + (1.0 - self.smoothing) * magnitude;

            let db = 20.0 * self.smoothed[i].max(1e-10).log10();
            let scaled = (db - self.min_db) / db_range * 255.0;
            self.frequency_bytes[i] = scaled.clamp(0.0, 255.0) as u8;
        }

        for (i, out) in self.time_domain_bytes.iter_mut().enumerate() {
            let s = samples.get(i).copied().unwrap_or(0.0).clamp(-1.0, 1.0);
            *out = (s * 128.0 + 128.0).clamp(0.0, 255.0) as u8;
        }
    }

    /// Byte frequency data from the most recent [`Self::process`] call.
    pub fn frequency_bytes(&self) -> &[u8] {
        &self.frequency_bytes
    }

    /// Byte time-domain data from the most recent [`Self::process`] call.
    pub fn time_domain_bytes(&self) -> &[u8] {
        &self.time_domain_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn sine_window(freq_hz: f32, config: &AnalyzerConfig) -> Vec<f32> {
        (0..config.fft_size)
            .map(|i| (TAU * freq_hz * i as f32 / config.sample_rate_hz as f32).sin())
            .collect()
    }

    #[test]
    fn test_silence_maps_to_floor_bytes() {
        let config = AnalyzerConfig::default();
        let mut tap = SpectrumTap::new(&config);
        tap.process(&vec![0.0; config.fft_size]);

        assert!(tap.frequency_bytes().iter().all(|&b| b == 0));
        assert!(tap.time_domain_bytes().iter().all(|&b| b == 128));
    }

    #[test]
    fn test_tone_peaks_at_expected_bin() {
        let config = AnalyzerConfig::default();
        let mut tap = SpectrumTap::new(&config);

        // 1 kHz @ 44.1 kHz, 512-point FFT → bin ≈ 11.6
        let window = sine_window(1000.0, &config);
        for _ in 0..8 {
            tap.process(&window); // let smoothing settle
        }

        let bytes = tap.frequency_bytes();
        let peak = bytes
            .iter()
            .enumerate()
            .max_by_key(|(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert!((11..=13).contains(&peak), "peak at bin {}", peak);
        assert!(bytes[peak] > 100);
    }

    #[test]
    fn test_magnitude_smoothing_is_gradual() {
        let config = AnalyzerConfig::default();
        let mut tap = SpectrumTap::new(&config);
        let window = sine_window(1000.0, &config);

        tap.process(&window);
        let first: Vec<u8> = tap.frequency_bytes().to_vec();
        for _ in 0..10 {
            tap.process(&window);
        }
        let settled: Vec<u8> = tap.frequency_bytes().to_vec();

        // Settled spectrum should be at least as hot as the first frame.
        let first_max = *first.iter().max().unwrap();
        let settled_max = *settled.iter().max().unwrap();
        assert!(settled_max >= first_max);
    }
}
