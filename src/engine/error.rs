//! Errors raised while resolving and running key sequences

use crate::host::ExecError;

/// Why a key (or a replayed sequence) could not be carried out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No binding and no fallback recomposition for this sequence
    Unresolved { sequence: String },
    /// The host failed to run a resolved command
    Exec(ExecError),
    /// A command rejected its collected input (e.g. `diz`)
    InvalidInput { command: String, input: String },
    /// `"` followed by a key that is not a register name
    InvalidRegister { key: String },
}

impl EngineError {
    /// Whether recovery returns the session to Normal mode
    pub fn resets_mode(&self) -> bool {
        matches!(self, EngineError::Unresolved { .. } | EngineError::Exec(_))
    }

    /// Whether the user gets a message in addition to the blink
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            EngineError::Exec(_) | EngineError::InvalidInput { .. }
        )
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Unresolved { sequence } => write!(f, "No such command: {}", sequence),
            EngineError::Exec(e) => write!(f, "{}", e),
            EngineError::InvalidInput { command, input } => {
                write!(f, "Invalid input for {}: {:?}", command, input)
            }
            EngineError::InvalidRegister { key } => write!(f, "Invalid register: {}", key),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Exec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ExecError> for EngineError {
    fn from(e: ExecError) -> Self {
        EngineError::Exec(e)
    }
}
