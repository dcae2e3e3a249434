//! vimkeys - Vim-style key-sequence interpretation
//!
//! Turns a stream of key presses into fully resolved, parameterized editing
//! commands: counts, registers, operator+motion composition, namespaces,
//! user remappings and dot-repeat. The buffer itself belongs to a [`Host`].

pub mod cmdline;
pub mod config;
pub mod config_paths;
pub mod engine;
pub mod host;
pub mod keymap;
pub mod tracing;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::{Engine, EngineError, FeedOptions, Invocation, KeyOutcome, ReplayOutcome};
pub use host::{ExecError, Host, HostEvent, Recorder};
pub use keymap::{KeySeq, KeyToken, Keymap, Mode};
