//! Score feedback mapping and the result panel state machine.
//!
//! The scoring API rates on a 0-5 scale; everything user-facing works on the
//! 0-100 scaled score. A scaled score outside `[0, 100]` (or NaN) is not
//! clamped into a tier: it surfaces as an explicit analysis failure.

pub mod panel;

pub use panel::ResultPanel;

/// Factor between the API's raw 0-5 score and the displayed 0-100 score.
pub const SCORE_SCALE: f64 = 20.0;

/// Five discrete feedback levels derived from the scaled score, plus the
/// explicit failure state for scores outside the displayable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTier {
    /// scaled < 25
    NeedsWork,
    /// 25 <= scaled < 40
    NotBad,
    /// 40 <= scaled < 60
    Good,
    /// 60 <= scaled < 80
    Great,
    /// 80 <= scaled <= 100
    Perfect,
    /// NaN or outside [0, 100]
    AnalysisFailed,
}

impl FeedbackTier {
    /// Maps a 0-100 scaled score to its tier. Boundary values belong to the
    /// higher tier (strict `<` on each upper bound).
    pub fn from_scaled(scaled: f64) -> Self {
        if !scaled.is_finite() || !(0.0..=100.0).contains(&scaled) {
            return Self::AnalysisFailed;
        }
        if scaled < 25.0 {
            Self::NeedsWork
        } else if scaled < 40.0 {
            Self::NotBad
        } else if scaled < 60.0 {
            Self::Good
        } else if scaled < 80.0 {
            Self::Great
        } else {
            Self::Perfect
        }
    }

    /// Maps a raw 0-5 API score to its tier.
    pub fn from_raw(raw: f64) -> Self {
        Self::from_scaled(raw * SCORE_SCALE)
    }

    pub fn stars(&self) -> &'static str {
        match self {
            Self::NeedsWork => "★",
            Self::NotBad => "★★",
            Self::Good => "★★★",
            Self::Great => "★★★★",
            Self::Perfect => "★★★★★",
            Self::AnalysisFailed => "",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NeedsWork => "Needs work",
            Self::NotBad => "Not bad",
            Self::Good => "Good!",
            Self::Great => "Great!",
            Self::Perfect => "Perfect!",
            Self::AnalysisFailed => "Analysis failed",
        }
    }
}

/// Fill ratio for the circular/linear score gauge. Non-finite scores render
/// an empty gauge instead of poisoning the widget.
pub fn gauge_ratio(scaled: f64) -> f64 {
    if !scaled.is_finite() {
        return 0.0;
    }
    (scaled / 100.0).clamp(0.0, 1.0)
}

/// Rounded 0-100 gauge value shown next to the ring.
pub fn gauge_value(scaled: f64) -> u64 {
    if !scaled.is_finite() {
        return 0;
    }
    scaled.clamp(0.0, 100.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_cover_the_documented_ranges() {
        assert_eq!(FeedbackTier::from_scaled(0.0), FeedbackTier::NeedsWork);
        assert_eq!(FeedbackTier::from_scaled(24.9), FeedbackTier::NeedsWork);
        assert_eq!(FeedbackTier::from_scaled(25.0), FeedbackTier::NotBad);
        assert_eq!(FeedbackTier::from_scaled(39.9), FeedbackTier::NotBad);
        assert_eq!(FeedbackTier::from_scaled(40.0), FeedbackTier::Good);
        assert_eq!(FeedbackTier::from_scaled(59.9), FeedbackTier::Good);
        assert_eq!(FeedbackTier::from_scaled(60.0), FeedbackTier::Great);
        assert_eq!(FeedbackTier::from_scaled(79.9), FeedbackTier::Great);
        assert_eq!(FeedbackTier::from_scaled(80.0), FeedbackTier::Perfect);
        assert_eq!(FeedbackTier::from_scaled(100.0), FeedbackTier::Perfect);
    }

    #[test]
    fn boundary_values_belong_to_the_higher_tier() {
        for (boundary, expected) in [
            (25.0, FeedbackTier::NotBad),
            (40.0, FeedbackTier::Good),
            (60.0, FeedbackTier::Great),
            (80.0, FeedbackTier::Perfect),
        ] {
            assert_eq!(FeedbackTier::from_scaled(boundary), expected);
        }
    }

    #[test]
    fn out_of_range_scores_fail_analysis_instead_of_clamping() {
        assert_eq!(FeedbackTier::from_scaled(-0.1), FeedbackTier::AnalysisFailed);
        assert_eq!(FeedbackTier::from_scaled(100.1), FeedbackTier::AnalysisFailed);
        assert_eq!(FeedbackTier::from_scaled(f64::NAN), FeedbackTier::AnalysisFailed);
        assert_eq!(
            FeedbackTier::from_raw(-1.0),
            FeedbackTier::AnalysisFailed
        );
        assert_eq!(FeedbackTier::from_raw(6.0), FeedbackTier::AnalysisFailed);
    }

    #[test]
    fn raw_score_four_point_five_is_tier_five() {
        assert_eq!(FeedbackTier::from_raw(4.5), FeedbackTier::Perfect);
        assert_eq!(FeedbackTier::from_raw(4.5).stars(), "★★★★★");
    }

    #[test]
    fn gauge_reflects_the_scaled_score() {
        assert_eq!(gauge_ratio(80.0), 0.8);
        assert_eq!(gauge_value(80.0), 80);
        // raw 4.0 -> scaled 80 -> gauge 80, the end-to-end example
        assert_eq!(gauge_value(4.0 * SCORE_SCALE), 80);
    }

    #[test]
    fn gauge_guards_against_nan() {
        assert_eq!(gauge_ratio(f64::NAN), 0.0);
        assert_eq!(gauge_value(f64::NAN), 0);
    }
}
