//! Audio recording feature for prate.
//!
//! Owns the lifecycle of a single recording session: one-time audio subsystem
//! initialization, capture from the input device, and finalization into an
//! immutable [`AudioArtifact`] handed to the scoring and playback layers.

pub mod audio;
pub mod ffmpeg;
pub mod session;

pub use audio::{init_audio, Recorder};
pub use session::AudioArtifact;
