//! Command-line interface for audioscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Chunked audio transcription via hosted speech-to-text providers
#[derive(Parser, Debug)]
#[command(
    name = "audioscribe",
    version,
    about = "Chunked audio transcription via hosted speech-to-text providers"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a whole audio file
    Transcribe {
        /// Audio file (mp3, wav, webm, m4a, ogg)
        file: PathBuf,

        /// Chunk duration in seconds (10-300)
        #[arg(long, short = 'c', value_name = "SECONDS")]
        chunk_size: Option<u32>,

        /// Overlap between consecutive chunks in seconds
        #[arg(long, value_name = "SECONDS")]
        overlap: Option<u32>,

        /// Language code (default: auto-detect). Examples: auto, en, de, es, fr
        #[arg(long, value_name = "LANG", default_value = "auto")]
        language: String,

        /// Task to run: transcribe or translate
        #[arg(long, value_name = "TASK", default_value = "transcribe")]
        task: String,

        /// Provider tried first (groq, openai)
        #[arg(long, value_name = "PROVIDER")]
        provider: Option<String>,

        /// Always chunk, even for short clips
        #[arg(long)]
        no_fast: bool,

        /// Per-call provider timeout (default: 60s). Examples: 90s, 2m
        #[arg(long, value_name = "DURATION", value_parser = parse_timeout_secs)]
        timeout: Option<u64>,

        /// Print the full result as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Transcribe the audio around a playback position
    Window {
        /// Audio file (mp3, wav, webm, m4a, ogg)
        file: PathBuf,

        /// Playback position in seconds
        #[arg(long, value_name = "SECONDS")]
        at: f64,

        /// Half-window in seconds (default: 120)
        #[arg(long, value_name = "SECONDS")]
        half_window: Option<f64>,

        /// Language code (default: auto-detect)
        #[arg(long, value_name = "LANG", default_value = "auto")]
        language: String,

        /// Provider tried first (groq, openai)
        #[arg(long, value_name = "PROVIDER")]
        provider: Option<String>,

        /// Print the full result as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Show provider availability
    Providers,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration inspection actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML (API keys redacted)
    Show,
    /// Print the configuration file path in use
    Path,
}

/// Parse a timeout duration string into seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`90s`, `2m`), and compound (`1m30s`).
fn parse_timeout_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}
