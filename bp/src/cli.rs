//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::{FALLBACK_API_KEY_ENV, LlmConfig};

/// Hackathon Architect - problem statement in, illustrated blueprint out
#[derive(Parser)]
#[command(
    name = "bp",
    about = "Turns a problem statement into a nine-section illustrated project blueprint",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute; none opens the TUI
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a blueprint without the TUI (batch mode)
    Generate {
        /// Problem statement, or "-" to read it from stdin
        problem: String,

        /// Also generate every visual, one section at a time
        #[arg(short, long)]
        images: bool,

        /// Export the blueprint (and visuals) under this directory
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// List the nine blueprint sections
    Sections,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blueprint")
        .join("logs")
        .join("blueprint.log")
}

/// Generate the after_help text with credential status and log location
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let defaults = LlmConfig::default();
    let mut help = String::new();

    help.push_str("Credentials:\n");
    for name in [defaults.api_key_env.as_str(), FALLBACK_API_KEY_ENV] {
        let set = std::env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false);
        let icon = if set { "\u{2705}" } else { "\u{274C}" };
        let status = if set { "set" } else { "not set" };
        help.push_str(&format!("  {} {:<16} {}\n", icon, name, status));
    }

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}
