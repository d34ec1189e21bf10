//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to the appropriate
//! command handlers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands;
use crate::logging;

/// Record a spoken utterance and rate its pronunciation
#[derive(Parser)]
#[command(name = "prate")]
#[command(version)]
#[command(about = "Record a spoken utterance and rate its pronunciation")]
#[command(
    long_about = "Records a spoken utterance from the default input device, submits it to the\nETRI WiseASR pronunciation-scoring API, and presents the returned score and\ntranscript with tiered feedback and a playback scrubber.\n\nDEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n\nREQUIRED ENVIRONMENT:\n    ETRI_ACCESS_KEY       API access key for the scoring service\n    ETRI_LANGUAGE_CODE    Language code of the utterance (e.g. korean)"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/prate/prate.toml\n    Logs:               ~/.local/state/prate/prate.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an utterance and score its pronunciation (default)
    ///
    /// Space starts and stops recording; stopping submits the take for
    /// scoring. 'c' cancels an in-flight request, 'p' replays the take.
    #[command(visible_alias = "r")]
    Record,

    /// Score a pre-recorded audio file
    ///
    /// Submits an existing audio file (AAC/M4A recommended) and prints the
    /// tiered result. Ctrl-C cancels the request.
    #[command(visible_alias = "s")]
    Score {
        /// Path to the audio file to score
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in prate.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,
}

/// Runs the application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging setup
    match &cli.command {
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None | Some(Commands::Record) => {
            commands::handle_record().await?;
        }
        Some(Commands::Score { file }) => {
            commands::handle_score(file).await?;
        }
        Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
