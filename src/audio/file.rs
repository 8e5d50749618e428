//! Looped file playback source decoded with hound.

use std::io::Cursor;
use std::time::Instant;

use crate::audio::{AudioSource, SourceKind};
use crate::error::AudioError;

/// A decoded WAV clip played on a wall-clock loop. The source never
/// produces silence: the playback cursor wraps at the end of the clip.
#[derive(Debug)]
pub struct FileSource {
    samples: Vec<f32>,
    sample_rate: u32,
    started: Instant,
    live: bool,
}

impl FileSource {
    /// Decode `data` as WAV audio, mixing all channels down to mono.
    /// Fails with [`AudioError::DecodeError`] when the bytes are not a
    /// parseable WAV stream or contain no audio frames.
    pub fn new(data: &[u8]) -> Result<Self, AudioError> {
        let reader = hound::WavReader::new(Cursor::new(data))
            .map_err(|e| AudioError::DecodeError(e.to_string()))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::DecodeError(e.to_string()))?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| AudioError::DecodeError(e.to_string()))?
            }
        };

        // Mono mixdown
        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        if samples.is_empty() {
            return Err(AudioError::DecodeError("no audio frames".into()));
        }

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            started: Instant::now(),
            live: true,
        })
    }

    /// Playback position in samples, following wall-clock time, looped.
    fn cursor(&self) -> usize {
        let elapsed = self.started.elapsed().as_secs_f64();
        (elapsed * self.sample_rate as f64) as usize % self.samples.len()
    }
}

impl AudioSource for FileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn fill_window(&mut self, out: &mut [f32]) {
        let len = self.samples.len();
        if len == 0 {
            out.fill(0.0);
            return;
        }
        // Window ends at the playback cursor, wrapping backwards.
        let start = (self.cursor() + len - out.len() % len) % len;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.samples[(start + i) % len];
        }
    }

    fn shutdown(&mut self) {
        self.live = false;
        self.samples.clear();
        self.samples.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(samples: &[i16], sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_error_on_garbage() {
        let err = FileSource::new(b"definitely not audio").unwrap_err();
        assert!(matches!(err, AudioError::DecodeError(_)));
    }

    #[test]
    fn test_decode_error_on_empty_clip() {
        let bytes = wav_bytes(&[], 44_100);
        let err = FileSource::new(&bytes).unwrap_err();
        assert!(matches!(err, AudioError::DecodeError(_)));
    }

    #[test]
    fn test_decoded_samples_normalized() {
        let bytes = wav_bytes(&[i16::MAX, 0, i16::MIN, 0], 44_100);
        let mut source = FileSource::new(&bytes).unwrap();
        assert!(source.is_live());

        let mut window = vec![0.0; 8];
        source.fill_window(&mut window);
        assert!(window.iter().all(|s| (-1.001..=1.001).contains(s)));
    }
}
