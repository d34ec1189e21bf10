//! Score a pre-recorded audio file without the TUI.
//!
//! Useful for checking credentials and for scoring takes recorded elsewhere.
//! Ctrl-C cancels the in-flight request; cancellation settles the command
//! with a notice, not an error.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Credentials, PrateConfig};
use crate::feedback::{self, FeedbackTier};
use crate::scoring::{self, CancellationToken, ScoreOutcome, ScoringConfig};

/// Submits an existing audio file for pronunciation scoring and prints the
/// tiered result.
///
/// # Errors
/// - If configuration or credentials are missing
/// - If the scoring request fails (transport or application)
pub async fn handle_score(file: PathBuf) -> Result<(), anyhow::Error> {
    let config = PrateConfig::load()?;
    let credentials = Credentials::from_env()?;

    let scoring_config = ScoringConfig {
        endpoint: config.scoring.endpoint,
        access_key: credentials.access_key,
        language_code: credentials.language_code,
        timeout: Duration::from_secs(config.scoring.timeout_secs),
    };

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, cancelling scoring request");
            interrupt.cancel();
        }
    });

    println!("Scoring {} ...", file.display());

    match scoring::score_file(&scoring_config, &file, token).await? {
        ScoreOutcome::Scored(result) => {
            let scaled = result.scaled_score();
            let tier = FeedbackTier::from_scaled(scaled);
            println!();
            println!("  {}  {}", tier.stars(), tier.label());
            println!("  Score:      {} / 100", feedback::gauge_value(scaled));
            println!("  Recognized: {}", result.recognized_text);
            Ok(())
        }
        ScoreOutcome::Cancelled => {
            println!("Cancelled.");
            Ok(())
        }
    }
}
