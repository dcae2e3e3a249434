//! Command-line argument parsing for the replay tool
//!
//! Supports:
//! - Replaying notation strings given as arguments or read from stdin
//! - Feeding keys one at a time as if typed
//! - Loading an extra mappings file, or ignoring user mappings
//! - JSON-lines output

use clap::Parser;
use std::path::PathBuf;

/// Resolve Vim key sequences into editor commands
#[derive(Parser, Debug)]
#[command(
    name = "vimkeys",
    version,
    about = "Resolve Vim key sequences into editor commands"
)]
pub struct CliArgs {
    /// Key notation strings to run, e.g. `3dw` or `ifoo<esc>`
    #[arg(value_name = "KEYS")]
    pub keys: Vec<String>,

    /// Feed keys one at a time as if typed, instead of replaying
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Read one notation string per line from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Load an extra mappings file on top of the usual layers
    #[arg(short = 'm', long, value_name = "PATH")]
    pub mappings: Option<PathBuf>,

    /// Resolve against built-in bindings only
    #[arg(long)]
    pub no_user_mappings: bool,

    /// Print each host event as a JSON line
    #[arg(long)]
    pub json: bool,
}

/// How keys reach the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// Through the notation processor (non-interactive)
    Replay,
    /// One key at a time through the interactive path
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Where notation strings come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Args(Vec<String>),
    Stdin,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: InputSource,
    pub feed_mode: FeedMode,
    pub output: OutputFormat,
    pub extra_mappings: Option<PathBuf>,
    pub check_user_mappings: bool,
}

impl CliArgs {
    /// Convert parsed CLI args into a run configuration
    pub fn into_config(self) -> Result<RunConfig, String> {
        let input = match (self.stdin, self.keys.is_empty()) {
            (true, false) => return Err("Cannot combine --stdin with KEYS".to_string()),
            (true, true) => InputSource::Stdin,
            (false, false) => InputSource::Args(self.keys),
            (false, true) => return Err("No keys given (pass KEYS or --stdin)".to_string()),
        };

        let feed_mode = if self.interactive {
            FeedMode::Interactive
        } else {
            FeedMode::Replay
        };

        let output = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        Ok(RunConfig {
            input,
            feed_mode,
            output,
            extra_mappings: self.mappings,
            check_user_mappings: !self.no_user_mappings,
        })
    }
}
