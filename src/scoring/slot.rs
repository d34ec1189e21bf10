//! Single-in-flight policy for scoring submissions.

use super::cancel::CancellationToken;

/// Guards the one allowed in-flight scoring request.
///
/// Policy: a new submission REPLACES the previous one. `begin()` cancels any
/// outstanding token and issues a fresh one, so two requests can never race
/// each other for the loading state.
#[derive(Debug, Default)]
pub struct UploadSlot {
    current: Option<CancellationToken>,
}

impl UploadSlot {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Issues the token for a new submission, cancelling the previous one if
    /// it has not resolved yet.
    pub fn begin(&mut self) -> CancellationToken {
        if let Some(previous) = self.current.take() {
            tracing::debug!("Replacing in-flight scoring request");
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        token
    }

    /// Cancels the in-flight submission, if any, and frees the slot.
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    /// Frees the slot once the submission has resolved.
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_replaces_and_cancels_the_previous_token() {
        let mut slot = UploadSlot::new();
        let first = slot.begin();
        assert!(slot.is_busy());
        assert!(!first.is_cancelled());

        let second = slot.begin();
        assert!(first.is_cancelled(), "previous request must be cancelled");
        assert!(!second.is_cancelled());
    }

    #[test]
    fn cancel_triggers_the_token_and_frees_the_slot() {
        let mut slot = UploadSlot::new();
        let token = slot.begin();
        slot.cancel();
        assert!(token.is_cancelled());
        assert!(!slot.is_busy());
    }

    #[test]
    fn clear_does_not_cancel_a_resolved_request() {
        let mut slot = UploadSlot::new();
        let token = slot.begin();
        slot.clear();
        assert!(!token.is_cancelled());
        assert!(!slot.is_busy());
    }
}
