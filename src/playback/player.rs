//! rodio-backed playback engine with explicit state tracking.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::source::Source;
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::watch;

use crate::error::ScreenError;
use crate::recording::AudioArtifact;

/// Snapshot of the playback engine, republished on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub position_millis: u64,
    pub duration_millis: u64,
    pub is_playing: bool,
}

impl PlaybackState {
    /// Folds one engine observation into the state.
    ///
    /// When the engine has drained, playback stops implicitly and the
    /// position parks at the duration rather than resetting to 0.
    fn advance(&mut self, engine_position: u64, engine_empty: bool) {
        if engine_empty && self.is_playing {
            self.is_playing = false;
            self.position_millis = self.duration_millis;
        } else if self.is_playing {
            self.position_millis = engine_position;
        }
    }
}

/// Clamps a seek target into `[0, duration]`.
fn clamp_seek(target_millis: i64, duration_millis: u64) -> u64 {
    if target_millis < 0 {
        0
    } else {
        (target_millis as u64).min(duration_millis)
    }
}

/// Owns the output stream, the sink, and the published [`PlaybackState`].
///
/// Load replaces any previous sink; dropping the player releases the audio
/// device on every exit path.
pub struct Player {
    // Keeps the audio device open for as long as the sink lives.
    _stream: Option<OutputStream>,
    sink: Option<Sink>,
    state: PlaybackState,
    updates: watch::Sender<PlaybackState>,
}

impl Player {
    pub fn new() -> Self {
        let (updates, _) = watch::channel(PlaybackState::default());
        Self {
            _stream: None,
            sink: None,
            state: PlaybackState::default(),
            updates,
        }
    }

    /// Subscription to position/state updates, one value per tick.
    pub fn positions(&self) -> watch::Receiver<PlaybackState> {
        self.updates.subscribe()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Binds the player to a recorded artifact, paused at position 0.
    ///
    /// Replaces and releases any previously loaded engine. Duration comes
    /// from the artifact's capture metadata, with the decoder as fallback
    /// for files we did not record ourselves.
    ///
    /// # Errors
    /// - `PlaybackFailure` if the device, file or codec cannot be opened
    pub fn load(&mut self, path: &Path, artifact: Option<&AudioArtifact>) -> Result<(), ScreenError> {
        self.unload();

        let file = File::open(path)
            .map_err(|e| ScreenError::PlaybackFailure(format!("{}: {e}", path.display())))?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| ScreenError::PlaybackFailure(e.to_string()))?;

        let decoder_duration = decoder
            .total_duration()
            .map(|d| d.as_millis() as u64);
        let duration_millis = artifact
            .map(|a| a.duration_millis)
            .or(decoder_duration)
            .unwrap_or(0);

        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| ScreenError::PlaybackFailure(e.to_string()))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| ScreenError::PlaybackFailure(e.to_string()))?;
        sink.pause();
        sink.append(decoder);

        self._stream = Some(stream);
        self.sink = Some(sink);
        self.state = PlaybackState {
            position_millis: 0,
            duration_millis,
            is_playing: false,
        };
        self.publish();

        tracing::debug!(
            "Playback loaded: {} ({} ms)",
            path.display(),
            duration_millis
        );
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.sink.is_some()
    }

    /// Starts or resumes playback.
    ///
    /// # Errors
    /// - `NoArtifactLoaded` when nothing has been loaded yet
    pub fn play(&mut self) -> Result<(), ScreenError> {
        let sink = self.sink.as_ref().ok_or(ScreenError::NoArtifactLoaded)?;
        sink.play();
        self.state.is_playing = true;
        self.publish();
        Ok(())
    }

    pub fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
            self.state.is_playing = false;
            self.publish();
        }
    }

    /// Toggles between playing and paused.
    pub fn toggle(&mut self) -> Result<(), ScreenError> {
        if self.state.is_playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Seeks to `target_millis`, clamped into `[0, duration]`. Does not
    /// change the play/pause state.
    ///
    /// # Errors
    /// - `NoArtifactLoaded` when nothing has been loaded yet
    /// - `PlaybackFailure` when the engine refuses the seek
    pub fn seek(&mut self, target_millis: i64) -> Result<(), ScreenError> {
        let sink = self.sink.as_ref().ok_or(ScreenError::NoArtifactLoaded)?;
        let clamped = clamp_seek(target_millis, self.state.duration_millis);
        sink.try_seek(std::time::Duration::from_millis(clamped))
            .map_err(|e| ScreenError::PlaybackFailure(format!("seek failed: {e}")))?;
        self.state.position_millis = clamped;
        self.publish();
        Ok(())
    }

    /// Samples the engine and republishes the state. Driven once per UI
    /// frame; this is where end-of-media flips `is_playing` off.
    pub fn tick(&mut self) {
        let Some(sink) = &self.sink else {
            return;
        };
        let engine_position = sink.get_pos().as_millis() as u64;
        self.state.advance(engine_position, sink.empty());
        self.publish();
    }

    /// Releases the engine and resets the published state.
    pub fn unload(&mut self) {
        self.sink = None;
        self._stream = None;
        self.state = PlaybackState::default();
        self.publish();
    }

    fn publish(&self) {
        self.updates.send_replace(self.state);
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_clamps_above_duration() {
        assert_eq!(clamp_seek(12_000, 3_000), 3_000);
    }

    #[test]
    fn seek_clamps_below_zero() {
        assert_eq!(clamp_seek(-250, 3_000), 0);
    }

    #[test]
    fn seek_inside_range_is_unchanged() {
        assert_eq!(clamp_seek(1_500, 3_000), 1_500);
    }

    #[test]
    fn end_of_media_stops_without_resetting_position() {
        let mut state = PlaybackState {
            position_millis: 2_900,
            duration_millis: 3_000,
            is_playing: true,
        };
        state.advance(2_950, true);
        assert!(!state.is_playing);
        assert_eq!(state.position_millis, 3_000);

        // A later tick keeps the parked position.
        state.advance(0, true);
        assert_eq!(state.position_millis, 3_000);
    }

    #[test]
    fn ticks_track_engine_position_while_playing() {
        let mut state = PlaybackState {
            position_millis: 0,
            duration_millis: 3_000,
            is_playing: true,
        };
        state.advance(420, false);
        assert_eq!(state.position_millis, 420);
        assert!(state.is_playing);
    }

    #[test]
    fn paused_state_ignores_engine_position() {
        let mut state = PlaybackState {
            position_millis: 1_000,
            duration_millis: 3_000,
            is_playing: false,
        };
        state.advance(1_200, false);
        assert_eq!(state.position_millis, 1_000);
    }

    #[test]
    fn subscribers_observe_published_state() {
        let mut player = Player::new();
        let rx = player.positions();
        assert_eq!(*rx.borrow(), PlaybackState::default());

        player.state = PlaybackState {
            position_millis: 1_234,
            duration_millis: 3_000,
            is_playing: true,
        };
        player.publish();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow(), player.state());
    }

    #[test]
    fn unload_publishes_the_reset_state() {
        let mut player = Player::new();
        let rx = player.positions();

        player.state.position_millis = 500;
        player.publish();
        player.unload();

        assert_eq!(*rx.borrow(), PlaybackState::default());
    }

    #[test]
    fn play_without_artifact_is_a_no_op_error() {
        let mut player = Player::new();
        assert!(matches!(
            player.play(),
            Err(ScreenError::NoArtifactLoaded)
        ));
    }
}
