//! Application command handlers for prate.
//!
//! # Commands
//! - `record`: record an utterance, score it, present the result (default)
//! - `score`: score a pre-recorded audio file
//! - `list_devices`: list available audio input devices
//! - `logs`: display recent log entries

pub mod list_devices;
pub mod logs;
pub mod record;
pub mod score;

pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
pub use score::handle_score;
