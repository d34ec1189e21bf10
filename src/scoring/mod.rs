//! Pronunciation scoring client for the ETRI WiseASR API.
//!
//! Converts a recorded artifact to a base64 JSON payload, performs one
//! cancellable POST against the scoring endpoint, and decodes the
//! result/reason response contract into a [`ScoreOutcome`].

pub mod api;
pub mod cancel;
pub mod slot;

pub use api::{score_file, ScoreOutcome, ScoreResult, ScoringConfig, ScoringError};
pub use cancel::CancellationToken;
pub use slot::UploadSlot;
