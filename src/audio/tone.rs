//! Synthesized tone source expressed as a tiny glicol patch.

use glicol::Engine;

use crate::audio::{AudioSource, SourceKind};
use crate::error::AudioError;
use crate::params::audio_constants::BLOCK_SIZE;

/// Oscillator shape for [`ToneSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneWaveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl ToneWaveform {
    /// Glicol node name for this shape.
    fn node(self) -> &'static str {
        match self {
            ToneWaveform::Sine => "sin",
            ToneWaveform::Square => "squ",
            ToneWaveform::Sawtooth => "saw",
            ToneWaveform::Triangle => "tri",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToneWaveform::Sine => "sine",
            ToneWaveform::Square => "square",
            ToneWaveform::Sawtooth => "sawtooth",
            ToneWaveform::Triangle => "triangle",
        }
    }
}

impl std::str::FromStr for ToneWaveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sine" | "sin" => Ok(ToneWaveform::Sine),
            "square" | "squ" => Ok(ToneWaveform::Square),
            "sawtooth" | "saw" => Ok(ToneWaveform::Sawtooth),
            "triangle" | "tri" => Ok(ToneWaveform::Triangle),
            other => Err(format!("unknown waveform '{other}'")),
        }
    }
}

/// Continuous periodic signal generator. Phase lives in the glicol
/// engine, so consecutive window pulls produce one unbroken signal.
pub struct ToneSource {
    engine: Engine<BLOCK_SIZE>,
    waveform: ToneWaveform,
    frequency_hz: f32,
    live: bool,
}

impl std::fmt::Debug for ToneSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneSource")
            .field("waveform", &self.waveform)
            .field("frequency_hz", &self.frequency_hz)
            .field("live", &self.live)
            .finish_non_exhaustive()
    }
}

impl ToneSource {
    /// Build a tone generator. `frequency_hz` must be positive and
    /// finite, `amplitude` in [0, 1]; anything else fails with
    /// [`AudioError::InvalidParameter`].
    pub fn new(
        waveform: ToneWaveform,
        frequency_hz: f32,
        amplitude: f32,
        sample_rate_hz: usize,
    ) -> Result<Self, AudioError> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(AudioError::InvalidParameter(format!(
                "frequency must be > 0, got {frequency_hz}"
            )));
        }
        if !(0.0..=1.0).contains(&amplitude) {
            return Err(AudioError::InvalidParameter(format!(
                "amplitude must be in [0, 1], got {amplitude}"
            )));
        }

        let mut engine = Engine::<BLOCK_SIZE>::new();
        engine.set_sr(sample_rate_hz);
        engine.update_with_code(&format!(
            "o: {} {} >> mul {}",
            waveform.node(),
            frequency_hz,
            amplitude
        ));
        engine
            .update()
            .map_err(|e| AudioError::InvalidParameter(format!("synthesis setup failed: {e:?}")))?;

        Ok(Self {
            engine,
            waveform,
            frequency_hz,
            live: true,
        })
    }

    pub fn describe(&self) -> String {
        format!("{} {}Hz", self.waveform.label(), self.frequency_hz)
    }
}

impl AudioSource for ToneSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Tone
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn fill_window(&mut self, out: &mut [f32]) {
        if !self.live {
            out.fill(0.0);
            return;
        }
        let mut filled = 0;
        while filled < out.len() {
            let (buffers, _) = self.engine.next_block(vec![]);
            let take = (out.len() - filled).min(BLOCK_SIZE);
            out[filled..filled + take].copy_from_slice(&buffers[0][..take]);
            filled += take;
        }
    }

    fn shutdown(&mut self) {
        self.live = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_parameters() {
        for (freq, amp) in [(0.0, 0.5), (-440.0, 0.5), (f32::NAN, 0.5), (440.0, 1.5)] {
            let err = ToneSource::new(ToneWaveform::Sine, freq, amp, 44_100).unwrap_err();
            assert!(matches!(err, AudioError::InvalidParameter(_)));
        }
    }

    #[test]
    fn test_waveform_parsing() {
        assert_eq!("sine".parse::<ToneWaveform>().unwrap(), ToneWaveform::Sine);
        assert_eq!("SAW".parse::<ToneWaveform>().unwrap(), ToneWaveform::Sawtooth);
        assert!("noise".parse::<ToneWaveform>().is_err());
    }

    #[test]
    fn test_tone_produces_nonsilent_signal() {
        let mut tone = ToneSource::new(ToneWaveform::Sine, 440.0, 0.5, 44_100).unwrap();
        let mut window = vec![0.0; 512];
        tone.fill_window(&mut window);
        let peak = window.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.1, "tone peak {peak} too quiet");
    }
}
