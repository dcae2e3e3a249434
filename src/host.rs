//! Host editor interface
//!
//! The engine decides which command runs and with which parameters; the
//! [`Host`] owns the buffer and actually performs it. Everything except
//! [`Host::execute`] has a no-op default so simple hosts only implement
//! what they care about.

use serde::Serialize;

use crate::engine::Invocation;
use crate::keymap::{Action, Mode, PromptKind};

/// Failure reported by the host while running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecError {
    pub message: String,
}

impl ExecError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Execution failed: {}", self.message)
    }
}

impl std::error::Error for ExecError {}

/// Request to show an interactive prompt seeded with partial input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptRequest {
    pub kind: PromptKind,
    /// Text already typed after the prompt character
    pub seed: String,
}

/// The editing surface the engine drives
pub trait Host {
    /// Run a fully resolved command
    fn execute(&mut self, invocation: &Invocation) -> Result<(), ExecError>;

    /// Type text at the cursor (Insert/Replace mode)
    fn insert_text(&mut self, _text: &str) -> Result<(), ExecError> {
        Ok(())
    }

    /// Run an ex command line (without the leading `:`)
    fn run_cmdline(&mut self, _cmdline: &str) -> Result<(), ExecError> {
        Ok(())
    }

    /// Called on every mode transition so selections can be reconciled
    fn mode_changed(&mut self, _from: Mode, _to: Mode) {}

    /// Edits until the matching `end_undo_group` undo as one unit
    fn begin_undo_group(&mut self) {}

    fn end_undo_group(&mut self) {}

    fn open_prompt(&mut self, _request: &PromptRequest) {}

    /// Audible/visual "no such command" feedback
    fn blink(&mut self) {}

    fn message(&mut self, _text: &str) {}
}

/// Everything a [`Recorder`] saw, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Execute { invocation: Invocation },
    Insert { text: String },
    Cmdline { line: String },
    ModeChanged { from: Mode, to: Mode },
    BeginUndoGroup,
    EndUndoGroup,
    Prompt { request: PromptRequest },
    Blink,
    Message { text: String },
}

impl std::fmt::Display for HostEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostEvent::Execute { invocation } => write!(f, "execute  {}", invocation),
            HostEvent::Insert { text } => write!(f, "insert   {:?}", text),
            HostEvent::Cmdline { line } => write!(f, "cmdline  :{}", line),
            HostEvent::ModeChanged { from, to } => write!(f, "mode     {} → {}", from, to),
            HostEvent::BeginUndoGroup => write!(f, "undo     begin group"),
            HostEvent::EndUndoGroup => write!(f, "undo     end group"),
            HostEvent::Prompt { request } => {
                write!(f, "prompt   {}{}", request.kind.firstc(), request.seed)
            }
            HostEvent::Blink => write!(f, "blink"),
            HostEvent::Message { text } => write!(f, "message  {}", text),
        }
    }
}

/// Host that records events instead of editing a buffer
///
/// Used by the CLI to print what a key sequence resolves to, and by tests.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub events: Vec<HostEvent>,
    /// Fail `execute` for this action
    pub fail_on: Option<Action>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `execute` fail whenever it runs `action`
    pub fn failing_on(action: Action) -> Self {
        Self {
            events: Vec::new(),
            fail_on: Some(action),
        }
    }

    /// Executed invocations, in order
    pub fn invocations(&self) -> Vec<&Invocation> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Execute { invocation } => Some(invocation),
                _ => None,
            })
            .collect()
    }

    /// Concatenation of all inserted text
    pub fn inserted_text(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Insert { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn blinks(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HostEvent::Blink))
            .count()
    }

    /// Take the recorded events, leaving the recorder empty
    pub fn drain(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Host for Recorder {
    fn execute(&mut self, invocation: &Invocation) -> Result<(), ExecError> {
        if let (Some(fail), Some(call)) = (self.fail_on, &invocation.action) {
            if call.action == fail {
                return Err(ExecError::new(format!("{:?} failed", fail)));
            }
        }
        self.events.push(HostEvent::Execute {
            invocation: invocation.clone(),
        });
        Ok(())
    }

    fn insert_text(&mut self, text: &str) -> Result<(), ExecError> {
        self.events.push(HostEvent::Insert {
            text: text.to_string(),
        });
        Ok(())
    }

    fn run_cmdline(&mut self, cmdline: &str) -> Result<(), ExecError> {
        self.events.push(HostEvent::Cmdline {
            line: cmdline.to_string(),
        });
        Ok(())
    }

    fn mode_changed(&mut self, from: Mode, to: Mode) {
        self.events.push(HostEvent::ModeChanged { from, to });
    }

    fn begin_undo_group(&mut self) {
        self.events.push(HostEvent::BeginUndoGroup);
    }

    fn end_undo_group(&mut self) {
        self.events.push(HostEvent::EndUndoGroup);
    }

    fn open_prompt(&mut self, request: &PromptRequest) {
        self.events.push(HostEvent::Prompt {
            request: request.clone(),
        });
    }

    fn blink(&mut self) {
        self.events.push(HostEvent::Blink);
    }

    fn message(&mut self, text: &str) {
        self.events.push(HostEvent::Message {
            text: text.to_string(),
        });
    }
}
