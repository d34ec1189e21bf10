//! Recording session state machine and the artifact it produces.

use std::path::PathBuf;
use std::time::Instant;

use crate::error::ScreenError;

/// Lifecycle state of the single recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No capture active, ready to start.
    Idle,
    /// Capture running; the elapsed counter ticks from this state's start.
    Recording,
    /// Capture finalized, artifact handed off.
    Stopped,
}

/// Tracks the one allowed recording session at a time.
///
/// The elapsed counter starts at 0 when recording begins, ticks in whole
/// seconds with no upper bound, and resets to 0 on any transition out of
/// `Recording`.
#[derive(Debug)]
pub struct RecordingSession {
    state: SessionState,
    started_at: Option<Instant>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            started_at: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// Transitions Idle/Stopped -> Recording. Starting while a session is
    /// already recording is rejected; only one session may exist at a time.
    pub fn begin(&mut self) -> Result<(), ScreenError> {
        if self.state == SessionState::Recording {
            return Err(ScreenError::RecordingFailure(
                "a recording is already in progress".to_string(),
            ));
        }
        self.state = SessionState::Recording;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Transitions Recording -> Stopped, resetting the elapsed counter.
    pub fn finish(&mut self) -> Result<(), ScreenError> {
        if self.state != SessionState::Recording {
            return Err(ScreenError::RecordingFailure(
                "no recording in progress".to_string(),
            ));
        }
        self.state = SessionState::Stopped;
        self.started_at = None;
        Ok(())
    }

    /// Resets to Idle after a failure. Non-fatal to the screen.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.started_at = None;
    }

    /// Whole seconds since recording began; 0 outside of `Recording`.
    pub fn elapsed_seconds(&self) -> u64 {
        match (self.state, self.started_at) {
            (SessionState::Recording, Some(started_at)) => started_at.elapsed().as_secs(),
            _ => 0,
        }
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// The immutable output of a completed recording session.
///
/// Shared read-only between the uploader and the player; neither mutates it.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    /// Path of the encoded recording on disk.
    pub path: PathBuf,
    /// Codec name of the container contents.
    pub encoding: &'static str,
    /// Capture sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count after downmix.
    pub channels: u16,
    /// Recorded duration, derived from the captured sample count.
    pub duration_millis: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_twice_is_rejected() {
        let mut session = RecordingSession::new();
        session.begin().unwrap();
        assert!(session.begin().is_err());
        assert!(session.is_recording());
    }

    #[test]
    fn finish_requires_an_active_recording() {
        let mut session = RecordingSession::new();
        assert!(session.finish().is_err());
    }

    #[test]
    fn elapsed_counter_resets_on_every_exit_from_recording() {
        let mut session = RecordingSession::new();
        session.begin().unwrap();
        session.finish().unwrap();
        assert_eq!(session.elapsed_seconds(), 0);

        session.begin().unwrap();
        session.reset();
        assert_eq!(session.elapsed_seconds(), 0);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn stopped_session_can_start_again() {
        let mut session = RecordingSession::new();
        session.begin().unwrap();
        session.finish().unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
        session.begin().unwrap();
        assert!(session.is_recording());
    }
}
