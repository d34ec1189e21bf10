//! Terminal user interface for the practice screen.

pub mod error;
pub mod screen;

pub use error::ErrorScreen;
pub use screen::{Phase, PracticeTui, ScreenCommand, ScreenView};
