//! Mode-scoped key mapping system
//!
//! This module provides:
//! - Key notation parsing (`d3w`, `<C-w>v`, `<leader>f`)
//! - The built-in Vim command table, one per mode
//! - A user remapping layer that takes precedence over built-ins
//! - YAML loading of user mappings
//!
//! # Architecture
//!
//! ```text
//! "3d<C-w>" → tokenize() → KeySeq → Keymap::lookup(mode, seq) → Lookup
//!                                                    ↓
//!                                   Exact(CommandDef) | Prefix | None
//! ```
//!
//! # Loading Mappings
//!
//! ```ignore
//! let mut keymap = Keymap::with_builtins();
//! for mapping in load_mappings_file(Path::new("mappings.yaml"), "\\")? {
//!     keymap.add_user_mapping(mapping);
//! }
//! ```

mod binding;
mod command;
mod config;
mod defaults;
#[allow(clippy::module_inception)]
mod keymap;
mod notation;
mod types;

pub use binding::UserMapping;
pub use command::{
    Action, ActionDef, CommandDef, InputParser, ModeEffect, Motion, MotionDef, PromptKind,
    TextObjectKind,
};
pub use config::{load_mappings_file, parse_mappings_yaml, parse_modes, KeymapError};
pub use defaults::{get_user_mappings_path, load_default_mappings, merge_mappings};
pub use keymap::{Keymap, Lookup, SharedKeymap};
pub use notation::{expand_leader, tokenize, KeySeq, Tokens};
pub use types::{KeyCode, KeyToken, Mode, Modifiers};
