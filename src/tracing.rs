//! Tracing setup and session-state diagnostics
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=vimkeys::engine=trace` - per-key state transitions
//!
//! # Log Files
//!
//! Logs are written to `~/.config/vimkeys/logs/vimkeys.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::engine::Session;
use crate::keymap::Mode;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`). If the log directory
/// cannot be created only the console layer is installed.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "vimkeys.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of session state for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub sequence: String,
    pub action_count: Option<usize>,
    pub motion_count: Option<usize>,
    pub register: Option<char>,
    pub collecting_input: bool,
    pub capturing_register: bool,
}

impl SessionSnapshot {
    pub fn from_session(session: &Session) -> Self {
        Self {
            mode: session.mode(),
            sequence: session.sequence().to_string(),
            action_count: session.action_count(),
            motion_count: session.motion_count(),
            register: session.register(),
            collecting_input: session.must_collect_input(),
            capturing_register: session.must_capture_register_name(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &SessionSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        if self.mode != other.mode {
            changes.push(format!("mode: {:?} → {:?}", self.mode, other.mode));
        }
        if self.sequence != other.sequence {
            changes.push(format!("sequence: {:?} → {:?}", self.sequence, other.sequence));
        }
        if self.action_count != other.action_count || self.motion_count != other.motion_count {
            changes.push(format!(
                "counts: {:?}/{:?} → {:?}/{:?}",
                self.action_count, self.motion_count, other.action_count, other.motion_count
            ));
        }
        if self.register != other.register {
            changes.push(format!("register: {:?} → {:?}", self.register, other.register));
        }
        if self.collecting_input != other.collecting_input {
            let status = if other.collecting_input { "started" } else { "ended" };
            changes.push(format!("input {}", status));
        }
        if self.capturing_register != other.capturing_register {
            let status = if other.capturing_register {
                "started"
            } else {
                "ended"
            };
            changes.push(format!("register capture {}", status));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
