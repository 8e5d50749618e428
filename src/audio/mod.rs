//! Audio source ownership and feature sampling.
//!
//! The [`SourceRegistry`] owns every live producer (microphone, looped
//! file, synthesized tone), assigns monotonic ids, and exposes one
//! combined sampling point mixing all live sources. It is created and
//! disposed explicitly by the orchestrating caller; there is no hidden
//! global audio context.

mod file;
mod mic;
mod tap;
mod tone;

pub use file::FileSource;
pub use mic::MicSource;
pub use tap::SpectrumTap;
pub use tone::{ToneSource, ToneWaveform};

use std::collections::BTreeMap;
use std::fmt;

use crate::error::AudioError;
use crate::features::{self, FeatureSample};
use crate::params::AnalyzerConfig;

/// Stable source identifier. Monotonic within a session, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Microphone,
    File,
    Tone,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Microphone => "microphone",
            SourceKind::File => "file",
            SourceKind::Tone => "tone",
        }
    }
}

/// A producer of raw mono PCM the registry can analyze on demand
/// (pull model: the core samples once per frame, never via callbacks).
pub trait AudioSource {
    fn kind(&self) -> SourceKind;

    fn is_live(&self) -> bool;

    /// Copy the most recent `out.len()` mono samples into `out`,
    /// zero-padding when less audio is available.
    fn fill_window(&mut self, out: &mut [f32]);

    /// Release the underlying hardware/decoding resource.
    fn shutdown(&mut self) {}
}

struct SourceEntry {
    source: Box<dyn AudioSource>,
    tap: SpectrumTap,
    label: String,
}

/// Owns all audio sources and their analysis taps.
pub struct SourceRegistry {
    config: AnalyzerConfig,
    entries: BTreeMap<SourceId, SourceEntry>,
    combined_tap: SpectrumTap,
    window: Vec<f32>,
    mix: Vec<f32>,
    next_id: u64,
}

impl SourceRegistry {
    pub fn new(config: AnalyzerConfig) -> Self {
        let combined_tap = SpectrumTap::new(&config);
        let window = vec![0.0; config.fft_size];
        let mix = vec![0.0; config.fft_size];
        Self {
            config,
            entries: BTreeMap::new(),
            combined_tap,
            window,
            mix,
            next_id: 1,
        }
    }

    /// Open the default capture device and register it.
    pub fn add_microphone(&mut self) -> Result<SourceId, AudioError> {
        let source = MicSource::new(self.config.fft_size)?;
        Ok(self.register(Box::new(source), "Microphone".to_string()))
    }

    /// Decode `data` as audio and register a looped playback source.
    pub fn add_file(&mut self, data: &[u8], label: &str) -> Result<SourceId, AudioError> {
        let source = FileSource::new(data)?;
        Ok(self.register(Box::new(source), label.to_string()))
    }

    /// Register a continuous tone generator.
    pub fn add_tone(
        &mut self,
        waveform: ToneWaveform,
        frequency_hz: f32,
        amplitude: f32,
    ) -> Result<SourceId, AudioError> {
        let source = ToneSource::new(waveform, frequency_hz, amplitude, self.config.sample_rate_hz)?;
        let label = source.describe();
        Ok(self.register(Box::new(source), label))
    }

    fn register(&mut self, source: Box<dyn AudioSource>, label: String) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;
        log::info!("source {id} added: {} ({label})", source.kind().label());
        let tap = SpectrumTap::new(&self.config);
        self.entries.insert(id, SourceEntry { source, tap, label });
        id
    }

    /// Detach and release a source. Unknown ids are a no-op, not an
    /// error, so teardown races between views stay harmless.
    pub fn remove_source(&mut self, id: SourceId) {
        match self.entries.remove(&id) {
            Some(mut entry) => {
                entry.source.shutdown();
                log::info!("source {id} removed ({})", entry.label);
            }
            None => log::debug!("remove_source: unknown id {id}, ignoring"),
        }
    }

    /// Per-source features, or `None` for unknown ids.
    pub fn features(&mut self, id: SourceId) -> Option<FeatureSample> {
        let entry = self.entries.get_mut(&id)?;
        entry.source.fill_window(&mut self.window);
        entry.tap.process(&self.window);
        Some(features::analyze(
            entry.tap.frequency_bytes(),
            entry.tap.time_domain_bytes(),
        ))
    }

    /// Features of the combined sampling point. With zero live sources
    /// this is silence, never an error.
    pub fn combined_features(&mut self) -> FeatureSample {
        if self.entries.is_empty() {
            return FeatureSample::silence();
        }

        self.mix.fill(0.0);
        for entry in self.entries.values_mut() {
            if !entry.source.is_live() {
                continue;
            }
            entry.source.fill_window(&mut self.window);
            for (acc, s) in self.mix.iter_mut().zip(self.window.iter()) {
                *acc += s;
            }
        }
        for s in self.mix.iter_mut() {
            *s = s.clamp(-1.0, 1.0);
        }

        self.combined_tap.process(&self.mix);
        features::analyze(
            self.combined_tap.frequency_bytes(),
            self.combined_tap.time_domain_bytes(),
        )
    }

    /// Snapshot of registered sources for display purposes.
    pub fn sources(&self) -> impl Iterator<Item = (SourceId, SourceKind, &str)> {
        self.entries
            .iter()
            .map(|(id, e)| (*id, e.source.kind(), e.label.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Release every source. Called on session teardown; also runs on drop.
    pub fn dispose(&mut self) {
        let ids: Vec<SourceId> = self.entries.keys().copied().collect();
        for id in ids {
            self.remove_source(id);
        }
    }
}

impl Drop for SourceRegistry {
    fn drop(&mut self) {
        self.dispose();
    }
}
