//! Result panel state machine with declarative transition descriptors.
//!
//! The panel holds the decoded score/transcript and decides WHEN the entrance,
//! spring-back and dismissal happen; HOW they look is up to whatever rendering
//! layer consumes the returned [`Transition`].

use crate::scoring::ScoreResult;

/// Downward drag displacement (in layout units) beyond which a release
/// dismisses the panel.
pub const DISMISS_THRESHOLD: f32 = 100.0;

/// Nominal duration of each entrance phase. Fade and slide run concurrently.
pub const ENTRANCE_MS: u64 = 500;

/// Slide offset of the panel at rest, before an entrance replays.
pub const REST_OFFSET: f32 = 100.0;

/// Declarative description of the animation the rendering layer should run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Two-phase reveal: fade-in and slide-in, independently parameterized,
    /// run in parallel.
    Entrance {
        fade_ms: u64,
        slide_ms: u64,
        from_offset: f32,
    },
    /// Release below the threshold: animate back to the rest position.
    SpringBack { to_offset: f32 },
    /// Release beyond the threshold: the panel is gone and its state cleared.
    Dismissed,
    /// Nothing to animate.
    None,
}

/// Holds the presented [`ScoreResult`] and its reveal/dismiss lifecycle.
#[derive(Debug, Default)]
pub struct ResultPanel {
    result: Option<ScoreResult>,
    /// Current slide offset; `REST_OFFSET` when hidden, 0 when fully shown,
    /// follows the finger during a drag.
    offset: f32,
}

impl ResultPanel {
    pub fn new() -> Self {
        Self {
            result: None,
            offset: REST_OFFSET,
        }
    }

    pub fn is_shown(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&ScoreResult> {
        self.result.as_ref()
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Stores the result and yields the entrance descriptor. A previous
    /// dismissal reset the offset, so every entrance replays from rest.
    pub fn present(&mut self, result: ScoreResult) -> Transition {
        let from_offset = self.offset;
        self.result = Some(result);
        self.offset = 0.0;
        Transition::Entrance {
            fade_ms: ENTRANCE_MS,
            slide_ms: ENTRANCE_MS,
            from_offset,
        }
    }

    /// Tracks a downward drag while the panel is shown. Upward movement does
    /// not lift the panel above its shown position.
    pub fn drag_move(&mut self, displacement: f32) {
        if self.is_shown() {
            self.offset = displacement.max(0.0);
        }
    }

    /// Resolves a drag release: past the threshold the panel dismisses,
    /// otherwise it springs back with the shown state untouched.
    pub fn drag_release(&mut self, displacement: f32) -> Transition {
        if !self.is_shown() {
            return Transition::None;
        }
        if displacement > DISMISS_THRESHOLD {
            self.dismiss();
            Transition::Dismissed
        } else {
            self.offset = 0.0;
            Transition::SpringBack { to_offset: 0.0 }
        }
    }

    /// Clears the result and resets the slide offset to its pre-entrance
    /// value so a subsequent `present()` replays the entrance correctly.
    pub fn dismiss(&mut self) {
        self.result = None;
        self.offset = REST_OFFSET;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> ScoreResult {
        ScoreResult {
            recognized_text: "안녕하세요".to_string(),
            raw_score: 4.0,
        }
    }

    #[test]
    fn present_yields_parallel_entrance_from_rest() {
        let mut panel = ResultPanel::new();
        let transition = panel.present(sample_result());
        assert_eq!(
            transition,
            Transition::Entrance {
                fade_ms: 500,
                slide_ms: 500,
                from_offset: REST_OFFSET,
            }
        );
        assert!(panel.is_shown());
        assert_eq!(panel.offset(), 0.0);
    }

    #[test]
    fn release_beyond_threshold_dismisses_and_resets_offset() {
        let mut panel = ResultPanel::new();
        panel.present(sample_result());
        panel.drag_move(150.0);

        assert_eq!(panel.drag_release(150.0), Transition::Dismissed);
        assert!(!panel.is_shown());
        assert!(panel.result().is_none());
        assert_eq!(panel.offset(), REST_OFFSET);
    }

    #[test]
    fn release_below_threshold_springs_back_with_result_untouched() {
        let mut panel = ResultPanel::new();
        panel.present(sample_result());
        panel.drag_move(50.0);

        assert_eq!(
            panel.drag_release(50.0),
            Transition::SpringBack { to_offset: 0.0 }
        );
        assert!(panel.is_shown());
        assert_eq!(panel.result().unwrap().raw_score, 4.0);
        assert_eq!(panel.offset(), 0.0);
    }

    #[test]
    fn threshold_itself_springs_back() {
        let mut panel = ResultPanel::new();
        panel.present(sample_result());
        assert_eq!(
            panel.drag_release(DISMISS_THRESHOLD),
            Transition::SpringBack { to_offset: 0.0 }
        );
    }

    #[test]
    fn entrance_replays_after_dismiss() {
        let mut panel = ResultPanel::new();
        panel.present(sample_result());
        panel.dismiss();

        let transition = panel.present(sample_result());
        assert_eq!(
            transition,
            Transition::Entrance {
                fade_ms: 500,
                slide_ms: 500,
                from_offset: REST_OFFSET,
            }
        );
    }

    #[test]
    fn dragging_a_hidden_panel_does_nothing() {
        let mut panel = ResultPanel::new();
        panel.drag_move(60.0);
        assert_eq!(panel.offset(), REST_OFFSET);
        assert_eq!(panel.drag_release(150.0), Transition::None);
    }
}
