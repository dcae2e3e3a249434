//! Per-surface session state
//!
//! A [`Session`] records everything typed since the last completed command:
//! the key sequence, counts, register, the action and motion chosen so far,
//! and which sub-state (register capture or input collection) the next key
//! goes to. It is mutated only by the engine.

use crate::keymap::{
    ActionDef, CommandDef, InputParser, KeySeq, KeyToken, Mode, MotionDef, Motion,
    TextObjectKind,
};

use super::error::EngineError;
use super::input::{InputCollector, InputTarget};
use super::invocation::{ActionCall, Invocation, MotionCall};

/// Largest count we accumulate; further digits are dropped
const MAX_COUNT: usize = 999_999;

/// Last repeatable change, replayed by `.`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatData {
    pub keys: KeySeq,
    /// Mode the sequence started in
    pub initial_mode: Mode,
}

/// Sub-state the next key is diverted to
///
/// A single enum so register capture and input collection can never be
/// active at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(super) enum Pending {
    #[default]
    None,
    RegisterName,
    Input {
        target: InputTarget,
        collector: InputCollector,
    },
}

/// Register names accepted after `"`
pub fn is_valid_register(c: char) -> bool {
    c.is_ascii_alphanumeric() || "\"-*+_/:.%#".contains(c)
}

/// Mutable per-surface state
#[derive(Debug, Clone)]
pub struct Session {
    pub(super) mode: Mode,
    pub(super) sequence: KeySeq,
    pub(super) partial_sequence: KeySeq,
    /// Mode when the current sequence began
    pub(super) sequence_mode: Mode,
    pub(super) action_count: Option<usize>,
    pub(super) motion_count: Option<usize>,
    pub(super) register: Option<char>,
    pub(super) pending: Pending,
    pub(super) action: Option<ActionDef>,
    pub(super) motion: Option<MotionDef>,
    pub(super) action_input: Option<String>,
    pub(super) motion_input: Option<String>,
    pub(super) non_interactive: bool,
    pub(super) repeat: Option<RepeatData>,
    /// Keys of the insert session in progress, for dot-repeat
    pub(super) insert_recording: Option<RepeatData>,
    /// A user mapping matched while evaluation was deferred
    pub(super) mapping_primed: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            sequence: KeySeq::new(),
            partial_sequence: KeySeq::new(),
            sequence_mode: Mode::Normal,
            action_count: None,
            motion_count: None,
            register: None,
            pending: Pending::None,
            action: None,
            motion: None,
            action_input: None,
            motion_input: None,
            non_interactive: false,
            repeat: None,
            insert_recording: None,
            mapping_primed: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Every key since the last reset
    pub fn sequence(&self) -> &KeySeq {
        &self.sequence
    }

    /// Keys still being resolved against the keymap
    pub fn partial_sequence(&self) -> &KeySeq {
        &self.partial_sequence
    }

    pub fn action_count(&self) -> Option<usize> {
        self.action_count
    }

    pub fn motion_count(&self) -> Option<usize> {
        self.motion_count
    }

    pub fn register(&self) -> Option<char> {
        self.register
    }

    pub fn action(&self) -> Option<&ActionDef> {
        self.action.as_ref()
    }

    pub fn motion(&self) -> Option<&MotionDef> {
        self.motion.as_ref()
    }

    pub fn must_capture_register_name(&self) -> bool {
        matches!(self.pending, Pending::RegisterName)
    }

    pub fn must_collect_input(&self) -> bool {
        matches!(self.pending, Pending::Input { .. })
    }

    pub fn non_interactive(&self) -> bool {
        self.non_interactive
    }

    pub fn repeat_data(&self) -> Option<&RepeatData> {
        self.repeat.as_ref()
    }

    pub fn set_repeat_data(&mut self, repeat: Option<RepeatData>) {
        self.repeat = repeat;
    }

    /// Text typed so far into a pending input collector
    pub fn pending_input(&self) -> Option<&str> {
        match &self.pending {
            Pending::Input { collector, .. } => Some(collector.partial()),
            _ => None,
        }
    }

    /// Status-bar text for the keys typed so far
    pub fn display_sequence(&self) -> String {
        match &self.pending {
            Pending::Input {
                collector: InputCollector::Line(session),
                ..
            } => session.display(),
            _ => self.sequence.to_string(),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Append a key to the full sequence
    pub(super) fn push_key(&mut self, key: KeyToken) {
        if self.sequence.is_empty() {
            self.sequence_mode = self.mode;
        }
        self.sequence.push(key);
    }

    /// Clear everything about the command in progress
    ///
    /// Mode and repeat data survive; callers that need the register or
    /// counts re-apply them afterwards.
    pub fn reset_command_data(&mut self) {
        self.sequence.clear();
        self.partial_sequence.clear();
        self.action_count = None;
        self.motion_count = None;
        self.register = None;
        self.pending = Pending::None;
        self.action = None;
        self.motion = None;
        self.action_input = None;
        self.motion_input = None;
        self.mapping_primed = false;
    }

    pub(super) fn reset_partial_sequence(&mut self) {
        self.partial_sequence.clear();
    }

    pub(super) fn push_action_digit(&mut self, digit: u32) {
        self.action_count = Some(accumulate(self.action_count, digit));
    }

    pub(super) fn push_motion_digit(&mut self, digit: u32) {
        self.motion_count = Some(accumulate(self.motion_count, digit));
    }

    pub(super) fn enter_register_capture(&mut self) {
        debug_assert!(
            !self.must_collect_input(),
            "register capture requested while collecting input"
        );
        self.pending = Pending::RegisterName;
    }

    pub(super) fn begin_input(&mut self, target: InputTarget, collector: InputCollector) {
        debug_assert!(
            !self.must_capture_register_name(),
            "input collection requested while capturing a register name"
        );
        self.pending = Pending::Input { target, collector };
    }

    /// Store collected input for whichever half asked for it
    pub(super) fn complete_input(&mut self, target: InputTarget, value: String) {
        self.pending = Pending::None;
        match target {
            InputTarget::Action => self.action_input = Some(value),
            InputTarget::Motion => self.motion_input = Some(value),
        }
    }

    /// Record a resolved command as the pending action or motion
    ///
    /// Motions leave OperatorPending; operators that need a motion enter it.
    pub(super) fn set_command(&mut self, command: &CommandDef) {
        match command {
            CommandDef::Motion(def) => {
                if self.mode == Mode::OperatorPending {
                    self.mode = Mode::Normal;
                }
                self.motion = Some(*def);
                if let Some(parser) = def.input {
                    self.begin_input(InputTarget::Motion, InputCollector::new(parser));
                }
            }
            CommandDef::Action(def) | CommandDef::Operator(def) => {
                self.action = Some(*def);
                if def.motion_required && self.mode == Mode::Normal {
                    self.mode = Mode::OperatorPending;
                }
                if let Some(parser) = def.input {
                    self.begin_input(InputTarget::Action, InputCollector::new(parser));
                }
            }
            other => debug_assert!(false, "set_command called with {:?}", other),
        }
    }

    /// Whether the pending command has everything it needs to run
    pub fn runnable(&self) -> bool {
        if !matches!(self.pending, Pending::None) {
            return false;
        }
        match (&self.action, &self.motion) {
            (Some(_), Some(_)) => true,
            (Some(action), None) => !action.motion_required,
            (None, Some(_)) => true,
            (None, None) => false,
        }
    }

    /// Build the invocation for the pending command
    pub(super) fn invocation(&self) -> Result<Invocation, EngineError> {
        let mode = match (&self.action, &self.motion) {
            (Some(_), Some(_)) if self.mode == Mode::Normal => Mode::InternalNormal,
            _ => self.mode,
        };

        let action = self.action.map(|def| ActionCall {
            action: def.action,
            input: self.action_input.clone(),
        });

        let motion = match self.motion {
            Some(def) => Some(self.motion_call(def)?),
            None => None,
        };

        Ok(Invocation {
            mode,
            register: self.register,
            action_count: self.action_count,
            motion_count: self.motion_count,
            action,
            motion,
        })
    }

    fn motion_call(&self, def: MotionDef) -> Result<MotionCall, EngineError> {
        let text_object = match def.motion {
            Motion::InnerObject | Motion::AroundObject => {
                let input = self.motion_input.as_deref().unwrap_or_default();
                let mut chars = input.chars();
                let kind = match (chars.next(), chars.next()) {
                    (Some(c), None) => TextObjectKind::from_char(c),
                    _ => None,
                };
                match kind {
                    Some(kind) => Some(kind),
                    None => {
                        return Err(EngineError::InvalidInput {
                            command: format!("{:?}", def.motion),
                            input: input.to_string(),
                        })
                    }
                }
            }
            _ => None,
        };

        Ok(MotionCall {
            motion: def.motion,
            input: self.motion_input.clone(),
            text_object,
            inclusive: def.inclusive,
            linewise: def.linewise,
        })
    }

    /// Parser of the pending input collector, if any
    pub(super) fn pending_parser(&self) -> Option<InputParser> {
        let Pending::Input { target, .. } = &self.pending else {
            return None;
        };
        match target {
            InputTarget::Action => self.action.and_then(|a| a.input),
            InputTarget::Motion => self.motion.and_then(|m| m.input),
        }
    }
}

fn accumulate(count: Option<usize>, digit: u32) -> usize {
    let value = count.unwrap_or(0).saturating_mul(10) + digit as usize;
    value.min(MAX_COUNT)
}
