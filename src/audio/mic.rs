//! Microphone capture source backed by a cpal input stream.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use crate::audio::AudioSource;
use crate::audio::SourceKind;
use crate::error::AudioError;

/// Shared capture buffer written by the audio callback, read on the
/// update thread. Bounded so a stalled reader never grows it unboundedly.
type CaptureBuffer = Arc<Mutex<VecDeque<f32>>>;

pub struct MicSource {
    buffer: CaptureBuffer,
    _stream: cpal::Stream,
    live: bool,
}

impl MicSource {
    /// Open the default input device and start capturing. Fails with
    /// [`AudioError::SourceUnavailable`] when no device exists or the
    /// stream cannot be built (typically: permission denied).
    pub fn new(window_len: usize) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| AudioError::SourceUnavailable("no input device".into()))?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::SourceUnavailable(e.to_string()))?;

        log::debug!(
            "microphone: {} @ {}Hz",
            device.name().unwrap_or_else(|_| "unknown".into()),
            config.sample_rate().0
        );

        let capacity = window_len * 4;
        let buffer: CaptureBuffer = Arc::new(Mutex::new(VecDeque::with_capacity(capacity)));
        let channels = config.channels() as usize;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config.into(), channels, capacity, &buffer)?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config.into(), channels, capacity, &buffer)?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config.into(), channels, capacity, &buffer)?
            }
            other => {
                return Err(AudioError::SourceUnavailable(format!(
                    "unsupported input sample format {other:?}"
                )))
            }
        };

        stream
            .play()
            .map_err(|e| AudioError::SourceUnavailable(e.to_string()))?;

        Ok(Self {
            buffer,
            _stream: stream,
            live: true,
        })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    capacity: usize,
    buffer: &CaptureBuffer,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let writer = Arc::clone(buffer);
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mut buf = writer.lock().unwrap();
                for frame in data.chunks(channels) {
                    buf.push_back(f32::from_sample(frame[0]));
                }
                while buf.len() > capacity {
                    buf.pop_front();
                }
            },
            |err| log::warn!("microphone stream error: {err}"),
            None,
        )
        .map_err(|e| AudioError::SourceUnavailable(e.to_string()))
}

impl AudioSource for MicSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Microphone
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn fill_window(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let buf = self.buffer.lock().unwrap();
        let available = buf.len().min(out.len());
        let start = buf.len() - available;
        let pad = out.len() - available;
        for (i, s) in buf.iter().skip(start).enumerate() {
            out[pad + i] = *s;
        }
    }

    fn shutdown(&mut self) {
        // Dropping the stream releases the device; the flag only keeps the
        // combined mix honest if something still holds the source.
        self.live = false;
    }
}
