//! Configuration management for prate.
//!
//! Two sources, loaded at startup:
//! - a TOML file in the user's config directory for audio and endpoint
//!   settings (created with defaults on first run),
//! - environment variables for the scoring API credential and language code,
//!   which fail fast with a clear error rather than a cryptic auth failure
//!   downstream.

pub mod env;
pub mod file;

pub use env::Credentials;
pub use file::PrateConfig;
