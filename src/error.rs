//! User-facing error taxonomy for the practice screen.
//!
//! Every operation that can fail surfaces one of these at its own boundary;
//! none of them terminate the application. Cancellation of an in-flight
//! scoring request is deliberately not represented here, it is a benign
//! outcome (`scoring::ScoreOutcome::Cancelled`), not an error.

use thiserror::Error;

/// Errors raised by the recording, playback and configuration layers.
///
/// Scoring transport/application errors have their own type,
/// [`crate::scoring::ScoringError`], since they carry API-specific detail.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// The input device is missing or refused to open.
    #[error("microphone unavailable or access denied: {0}")]
    PermissionDenied(String),

    /// Capture start/stop failed after the device was acquired.
    #[error("recording failed: {0}")]
    RecordingFailure(String),

    /// The playback engine failed to load, seek or decode.
    #[error("playback failed: {0}")]
    PlaybackFailure(String),

    /// `play()` was requested before any recording was loaded.
    #[error("no recording loaded for playback")]
    NoArtifactLoaded,

    /// A required environment setting is absent.
    #[error("missing configuration: set the {0} environment variable")]
    ConfigurationMissing(&'static str),
}
