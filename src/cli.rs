//! Command-line argument parsing.

use clap::Parser;

use crate::audio::ToneWaveform;
use crate::colors::COLOR_SCHEMES;
use crate::modes::ModeId;

/// A named tone preset: waveform, frequency, amplitude.
pub const TONE_PRESETS: [(&str, ToneWaveform, f32, f32); 8] = [
    ("drum-beat", ToneWaveform::Square, 80.0, 0.8),
    ("singing-voice", ToneWaveform::Sine, 300.0, 0.6),
    ("piano-note", ToneWaveform::Sine, 440.0, 0.5),
    ("whistle", ToneWaveform::Sine, 1200.0, 0.4),
    ("bass-guitar", ToneWaveform::Sawtooth, 100.0, 0.7),
    ("buzz", ToneWaveform::Sawtooth, 220.0, 0.5),
    ("organ", ToneWaveform::Square, 440.0, 0.4),
    ("flute-like", ToneWaveform::Triangle, 600.0, 0.5),
];

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Wavefield")]
#[command(about = "Audio-reactive wave visualization engine", long_about = None)]
pub struct Args {
    /// Visual mode: ocean, vortex, mountain, pure-sine, fire, explosion,
    /// ripple-pool, string, cymatics, spectrum
    #[arg(long, value_name = "MODE", default_value = "ocean")]
    pub mode: String,

    /// Color scheme name or index (e.g. "cyberpunk" or 2)
    #[arg(long, value_name = "SCHEME", default_value = "0")]
    pub scheme: String,

    /// Capture the default input device
    #[arg(long)]
    pub mic: bool,

    /// Play a WAV file as a source
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,

    /// Add a generated tone at this frequency (Hz)
    #[arg(long, value_name = "HZ")]
    pub tone: Option<f32>,

    /// Tone waveform: sine, square, sawtooth, triangle
    #[arg(long, value_name = "WAVEFORM", default_value = "sine")]
    pub tone_waveform: String,

    /// Tone amplitude in 0..1
    #[arg(long, value_name = "AMP", default_value = "0.5")]
    pub tone_amplitude: f32,

    /// Named tone preset (drum-beat, singing-voice, piano-note, whistle,
    /// bass-guitar, buzz, organ, flute-like)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Run duration in seconds
    #[arg(long, value_name = "SECONDS", default_value = "10")]
    pub duration: f32,

    /// Simulation frame rate
    #[arg(long, value_name = "FPS", default_value = "60")]
    pub fps: u32,

    /// Simulated-clock multiplier (0.25 = slow motion)
    #[arg(long, value_name = "SCALE", default_value = "1")]
    pub time_scale: f32,
}

impl Args {
    /// Parse the visual mode, falling back to ocean on unknown names.
    pub fn parse_mode(&self) -> ModeId {
        match ModeId::from_name(&self.mode) {
            Some(mode) => mode,
            None => {
                eprintln!("Warning: Unknown mode '{}', using ocean", self.mode);
                ModeId::Ocean
            }
        }
    }

    /// Parse the color scheme as an index or a (case-insensitive) name.
    pub fn parse_scheme(&self) -> usize {
        if let Ok(index) = self.scheme.parse::<usize>() {
            return index % COLOR_SCHEMES.len();
        }
        let wanted = self.scheme.to_lowercase().replace(['-', '_'], " ");
        for (i, scheme) in COLOR_SCHEMES.iter().enumerate() {
            if scheme.name.to_lowercase() == wanted {
                return i;
            }
        }
        eprintln!("Warning: Unknown color scheme '{}', using {}", self.scheme, COLOR_SCHEMES[0].name);
        0
    }

    pub fn parse_tone_waveform(&self) -> ToneWaveform {
        match self.tone_waveform.parse() {
            Ok(waveform) => waveform,
            Err(_) => {
                eprintln!(
                    "Warning: Unknown waveform '{}', using sine",
                    self.tone_waveform
                );
                ToneWaveform::Sine
            }
        }
    }

    /// Look up a tone preset by name.
    pub fn parse_preset(&self) -> Option<(ToneWaveform, f32, f32)> {
        let name = self.preset.as_deref()?;
        let wanted = name.to_lowercase().replace([' ', '_'], "-");
        match TONE_PRESETS.iter().find(|(n, _, _, _)| *n == wanted) {
            Some(&(_, waveform, freq, amp)) => Some((waveform, freq, amp)),
            None => {
                eprintln!("Warning: Unknown preset '{}', ignoring", name);
                None
            }
        }
    }
}
