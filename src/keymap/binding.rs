//! User-defined remappings: a key sequence replaced by another

use super::notation::KeySeq;
use super::types::Mode;

/// A user remapping, active in a single mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMapping {
    pub mode: Mode,
    /// Keys the user types
    pub lhs: KeySeq,
    /// Keys replayed in their place
    pub rhs: KeySeq,
}

impl UserMapping {
    pub fn new(mode: Mode, lhs: impl Into<KeySeq>, rhs: impl Into<KeySeq>) -> Self {
        Self {
            mode,
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    /// Right-hand sides starting with `:` run an ex command line
    pub fn is_cmdline(&self) -> bool {
        self.rhs.first().and_then(|t| t.as_char()) == Some(':')
    }

    /// Get display string for this mapping, e.g. `jk → <esc>`
    pub fn display_string(&self) -> String {
        format!("{} → {}", self.lhs, self.rhs)
    }
}
