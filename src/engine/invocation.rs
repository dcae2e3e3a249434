//! Composed command handed to the host

use std::fmt;

use serde::Serialize;

use crate::keymap::{Action, Mode, Motion, TextObjectKind};

/// The action half of an invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCall {
    pub action: Action,
    /// Collected input, e.g. the replacement char of `r` or the text of `:`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

/// The motion half of an invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MotionCall {
    pub motion: Motion,
    /// Target char of `f`/`t`, pattern of `/`, mark name...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// Set for `i{char}` / `a{char}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_object: Option<TextObjectKind>,
    pub inclusive: bool,
    pub linewise: bool,
}

/// A fully identified, parameterized command
///
/// An action and a motion evaluated together from Normal mode run in
/// [`Mode::InternalNormal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub mode: Mode,
    pub register: Option<char>,
    pub action_count: Option<usize>,
    pub motion_count: Option<usize>,
    pub action: Option<ActionCall>,
    pub motion: Option<MotionCall>,
}

impl Invocation {
    /// Effective count: action count times motion count
    pub fn count(&self) -> usize {
        self.action_count
            .unwrap_or(1)
            .saturating_mul(self.motion_count.unwrap_or(1))
    }

    pub fn action(&self) -> Option<Action> {
        self.action.as_ref().map(|a| a.action)
    }

    pub fn motion(&self) -> Option<Motion> {
        self.motion.as_ref().map(|m| m.motion)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.mode)?;
        if let Some(register) = self.register {
            write!(f, " \"{}", register)?;
        }
        if let Some(action) = &self.action {
            write!(f, " {:?}", action.action)?;
            if let Some(input) = &action.input {
                write!(f, "({:?})", input)?;
            }
        }
        if let Some(motion) = &self.motion {
            write!(f, " {:?}", motion.motion)?;
            if let Some(object) = motion.text_object {
                write!(f, "({:?})", object)?;
            } else if let Some(input) = &motion.input {
                write!(f, "({:?})", input)?;
            }
        }
        if self.count() != 1 {
            write!(f, " ×{}", self.count())?;
        }
        Ok(())
    }
}
