//! The practice workflow: record, score, present, replay.
//!
//! Drives the recording -> upload -> cancellable-request -> result-display
//! state machine from the UI event loop. Exactly one recording session and
//! one scoring request exist at a time; playback is independent of scoring
//! and may overlap with it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::{Credentials, PrateConfig};
use crate::error::ScreenError;
use crate::recording::{self, AudioArtifact, Recorder};
use crate::scoring::{self, ScoreOutcome, ScoringConfig, ScoringError, UploadSlot};
use crate::playback::Player;
use crate::feedback::ResultPanel;
use crate::ui::{ErrorScreen, Phase, PracticeTui, ScreenCommand, ScreenView};

type ScoringHandle = JoinHandle<Result<ScoreOutcome, ScoringError>>;

/// Runs the practice screen until the user quits.
pub async fn handle_record() -> Result<(), anyhow::Error> {
    tracing::info!("=== prate practice screen started ===");

    let config = match PrateConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            show_fatal(&format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/prate/prate.toml file and try again."
            ))?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(err) => {
            tracing::error!("Missing credentials: {err}");
            show_fatal(&format!("Configuration Error:\n\n{err}"))?;
            return Err(err.into());
        }
    };

    let scoring_config = ScoringConfig {
        endpoint: config.scoring.endpoint.clone(),
        access_key: credentials.access_key,
        language_code: credentials.language_code,
        timeout: Duration::from_secs(config.scoring.timeout_secs),
    };

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, endpoint={}, language={}",
        config.audio.device,
        config.audio.sample_rate,
        scoring_config.endpoint,
        scoring_config.language_code
    );

    recording::init_audio();

    let mut recorder = Recorder::new(config.audio.sample_rate, config.audio.device.clone());
    let mut tui = PracticeTui::new().map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    let run_result = run_screen(&mut tui, &mut recorder, scoring_config).await;

    tui.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;

    tracing::info!("=== prate practice screen exited ===");
    run_result
}

/// The event loop proper, separated so the TUI is restored on every exit path.
async fn run_screen(
    tui: &mut PracticeTui,
    recorder: &mut Recorder,
    scoring_config: ScoringConfig,
) -> Result<(), anyhow::Error> {
    let mut slot = UploadSlot::new();
    let mut player = Player::new();
    // The UI reads playback state through the subscription, not the player.
    let positions = player.positions();
    let mut panel = ResultPanel::new();
    let mut phase = Phase::Idle;
    let mut pending: Option<ScoringHandle> = None;
    let mut artifact: Option<Arc<AudioArtifact>> = None;
    let mut notice: Option<String> = None;

    loop {
        player.tick();

        match tui.handle_input()? {
            ScreenCommand::Continue => {}

            ScreenCommand::Quit => {
                if recorder.is_recording() {
                    recorder.cancel();
                }
                slot.cancel();
                break;
            }

            ScreenCommand::ToggleRecord => match phase {
                Phase::Idle | Phase::Result => {
                    panel.dismiss();
                    player.unload();
                    notice = None;
                    match recorder.start() {
                        Ok(()) => phase = Phase::Recording,
                        Err(e) => {
                            tracing::error!("Failed to start recording: {e}");
                            notice = Some(e.to_string());
                            phase = Phase::Idle;
                        }
                    }
                }
                Phase::Recording => match recorder.stop() {
                    Ok(new_artifact) => {
                        let shared = Arc::new(new_artifact);
                        if let Err(e) = player.load(&shared.path, Some(shared.as_ref())) {
                            // Playback is optional; scoring continues.
                            tracing::warn!("Failed to load playback: {e}");
                            notice = Some(e.to_string());
                        }
                        let token = slot.begin();
                        let task_config = scoring_config.clone();
                        let task_artifact = Arc::clone(&shared);
                        pending = Some(tokio::spawn(async move {
                            scoring::score_file(&task_config, &task_artifact.path, token).await
                        }));
                        artifact = Some(shared);
                        phase = Phase::Scoring;
                    }
                    Err(e) => {
                        tracing::error!("Failed to stop recording: {e}");
                        notice = Some(e.to_string());
                        phase = Phase::Idle;
                    }
                },
                // The record control is re-purposed as a cancel hint while
                // scoring; ignore it here.
                Phase::Scoring => {}
            },

            ScreenCommand::CancelScoring => {
                if phase == Phase::Scoring {
                    slot.cancel();
                }
            }

            ScreenCommand::PlayPause => {
                if artifact.is_some() {
                    if let Err(e) = player.toggle() {
                        notice = Some(e.to_string());
                    }
                } else {
                    notice = Some(ScreenError::NoArtifactLoaded.to_string());
                }
            }

            command @ (ScreenCommand::SeekBack | ScreenCommand::SeekForward) => {
                if player.is_loaded() {
                    let delta: i64 = if command == ScreenCommand::SeekForward {
                        1000
                    } else {
                        -1000
                    };
                    let target = player.state().position_millis as i64 + delta;
                    if let Err(e) = player.seek(target) {
                        notice = Some(e.to_string());
                    }
                }
            }

            ScreenCommand::Dismiss => {
                if phase == Phase::Result {
                    panel.dismiss();
                    phase = Phase::Idle;
                }
            }
        }

        // Resolve the in-flight scoring request, if it finished.
        if let Some(handle) = pending.take_if(|handle| handle.is_finished()) {
            slot.clear();
            let resolution = handle.await;

            // A request replaced or cancelled after the user already moved on
            // (e.g. started a new recording) must not stomp the current phase.
            if phase != Phase::Scoring {
                tracing::debug!("Stale scoring request resolved, ignoring");
                continue;
            }

            match resolution {
                Ok(Ok(ScoreOutcome::Scored(result))) => {
                    // The transition descriptor is consumed by the TUI's next
                    // render; the terminal renders it as an immediate reveal.
                    let _transition = panel.present(result);
                    notice = None;
                    phase = Phase::Result;
                }
                Ok(Ok(ScoreOutcome::Cancelled)) => {
                    notice = Some("Scoring cancelled".to_string());
                    phase = Phase::Idle;
                }
                Ok(Err(e)) => {
                    tracing::error!("Scoring failed: {e}");
                    notice = Some(e.to_string());
                    phase = Phase::Idle;
                }
                Err(e) => {
                    tracing::error!("Scoring task failed: {e}");
                    notice = Some(format!("Scoring task failed: {e}"));
                    phase = Phase::Idle;
                }
            }
        }

        let view = ScreenView {
            phase,
            elapsed_seconds: recorder.elapsed_seconds(),
            panel: &panel,
            playback: *positions.borrow(),
            notice: notice.as_deref(),
        };
        tui.render(&view)
            .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
    }

    Ok(())
}

/// Shows a fatal startup error on the dedicated error screen.
fn show_fatal(message: &str) -> Result<(), anyhow::Error> {
    let mut error_screen = ErrorScreen::new()?;
    error_screen.show_error(message)?;
    error_screen.cleanup()?;
    Ok(())
}
