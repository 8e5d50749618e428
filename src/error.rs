//! Error taxonomy for audio source operations.

use thiserror::Error;

/// Errors raised by [`crate::audio::SourceRegistry`] operations.
///
/// None of these are fatal to the frame update: a failed add leaves the
/// source set unchanged, and the combined feature sample degrades to
/// silence only when zero sources remain.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Capture permission denied or no usable input device.
    #[error("audio source unavailable: {0}")]
    SourceUnavailable(String),

    /// The supplied data could not be decoded as audio.
    #[error("could not decode audio data: {0}")]
    DecodeError(String),

    /// Out-of-range tone generator settings.
    #[error("invalid tone parameter: {0}")]
    InvalidParameter(String),
}
