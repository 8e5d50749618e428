//! Semantic audio features extracted from raw byte spectra.
//!
//! [`analyze`] is the pure core of the pipeline: it turns one
//! frequency/time-domain byte snapshot into the band scalars and
//! normalized waveform every visual mode consumes.

/// Fixed length of the normalized waveform, regardless of source buffer size.
pub const WAVEFORM_LEN: usize = 256;

/// Per-frame audio features. All band scalars are in [0, 1]; waveform
/// samples are in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSample {
    pub amplitude: f32,
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub waveform: [f32; WAVEFORM_LEN],
}

impl Default for FeatureSample {
    fn default() -> Self {
        Self {
            amplitude: 0.0,
            bass: 0.0,
            mid: 0.0,
            treble: 0.0,
            waveform: [0.0; WAVEFORM_LEN],
        }
    }
}

impl FeatureSample {
    /// The all-zero sample used when no audio source is live.
    pub fn silence() -> Self {
        Self::default()
    }
}

/// Extract band features from byte frequency data and a byte time-domain
/// snapshot (both in 0..=255, AnalyserNode conventions).
///
/// Bands partition the frequency bins by index: bass = first 10%,
/// mid = 10%..50%, treble = the rest. Each band is the arithmetic mean of
/// the bin values normalized by 255; an empty index range yields 0.
/// The waveform is resampled to exactly [`WAVEFORM_LEN`] entries by
/// nearest-index lookup, mapping bytes to [-1, 1] via `(v - 128) / 128`.
pub fn analyze(frequency_bins: &[u8], time_domain_bins: &[u8]) -> FeatureSample {
    let len = frequency_bins.len();
    let bass_end = (len as f32 * 0.1) as usize;
    let mid_end = (len as f32 * 0.5) as usize;

    let bass = band_mean(&frequency_bins[..bass_end.min(len)]);
    let mid = band_mean(&frequency_bins[bass_end.min(len)..mid_end.min(len)]);
    let treble = band_mean(&frequency_bins[mid_end.min(len)..]);
    let amplitude = band_mean(frequency_bins);

    let mut waveform = [0.0; WAVEFORM_LEN];
    let td_len = time_domain_bins.len();
    if td_len > 0 {
        for (i, out) in waveform.iter_mut().enumerate() {
            let idx = i * td_len / WAVEFORM_LEN;
            *out = (time_domain_bins[idx] as f32 - 128.0) / 128.0;
        }
    }

    FeatureSample {
        amplitude,
        bass,
        mid,
        treble,
        waveform,
    }
}

fn band_mean(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    bins.iter().map(|&v| v as f32 / 255.0).sum::<f32>() / bins.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sample_valid(sample: &FeatureSample) {
        for v in [sample.amplitude, sample.bass, sample.mid, sample.treble] {
            assert!((0.0..=1.0).contains(&v), "band value {} out of range", v);
        }
        assert_eq!(sample.waveform.len(), WAVEFORM_LEN);
        for w in sample.waveform {
            assert!((-1.0..=1.0).contains(&w));
        }
    }

    #[test]
    fn test_bands_in_range_across_buffer_sizes() {
        for len in [32usize, 256, 2048] {
            let freq: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
            let time: Vec<u8> = (0..len).map(|i| (i * 13 % 256) as u8).collect();
            let sample = analyze(&freq, &time);
            assert_sample_valid(&sample);
        }
    }

    #[test]
    fn test_silence_yields_zero_bands() {
        let freq = vec![0u8; 256];
        let time = vec![128u8; 256]; // byte 128 = zero crossing
        let sample = analyze(&freq, &time);
        assert_eq!(sample.amplitude, 0.0);
        assert_eq!(sample.bass, 0.0);
        assert_eq!(sample.mid, 0.0);
        assert_eq!(sample.treble, 0.0);
        assert!(sample.waveform.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_full_scale_bands() {
        let freq = vec![255u8; 512];
        let time = vec![255u8; 512];
        let sample = analyze(&freq, &time);
        assert!((sample.amplitude - 1.0).abs() < 1e-6);
        assert!((sample.bass - 1.0).abs() < 1e-6);
        assert!((sample.treble - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_band_range_is_zero_not_nan() {
        // With 4 bins the bass range (first 10%) is empty.
        let freq = vec![200u8; 4];
        let time = vec![128u8; 4];
        let sample = analyze(&freq, &time);
        assert_eq!(sample.bass, 0.0);
        assert!(sample.mid.is_finite());
        assert!(sample.treble.is_finite());
    }

    #[test]
    fn test_waveform_resampling_nearest_index() {
        // 32 time-domain samples stretched to 256 outputs.
        let time: Vec<u8> = (0..32).map(|i| if i < 16 { 0 } else { 255 }).collect();
        let sample = analyze(&[0u8; 32], &time);
        assert!((sample.waveform[0] + 1.0).abs() < 1e-6);
        assert!(sample.waveform[255] > 0.9);
    }
}
