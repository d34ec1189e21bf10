//! Playback of the recorded artifact.
//!
//! Decoupled from scoring: both read the same immutable artifact, but the
//! player never waits on the uploader. Position updates are republished on a
//! watch channel so the UI consumes a stream of states instead of device
//! callbacks.

pub mod player;

pub use player::{PlaybackState, Player};
