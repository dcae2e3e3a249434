//! Key-sequence interpretation engine
//!
//! The [`Engine`] turns a stream of keys into resolved command invocations
//! for a [`Host`]. It owns one [`Session`] (per editing surface), shares the
//! [`Keymap`](crate::keymap::Keymap) with whoever manages user mappings, and
//! owns the command-line history used by `:`/`/`/`?` input.
//!
//! # Architecture
//!
//! ```text
//! key → Engine::feed() → resolver (session state machine + keymap)
//!                            ↓
//!              Pending | Executed(Invocation) | Failed(..)
//!                            ↓
//!                    Host::execute(&Invocation)
//!
//! "llx" → Engine::process_notation() → leading motions, then the rest
//!                                      inside one undo group
//! ```
//!
//! Interactive entry points never return `Err`: failures reset the session,
//! notify the host and come back as [`KeyOutcome::Failed`] or
//! [`ReplayOutcome::Aborted`].

mod error;
mod input;
mod invocation;
mod replay;
mod resolver;
mod state;

pub use error::EngineError;
pub use input::{Feed, InputCollector, InputTarget};
pub use invocation::{ActionCall, Invocation, MotionCall};
pub use replay::{Continuation, ReplayOutcome};
pub use state::{is_valid_register, RepeatData, Session};

use crate::cmdline::{History, MemoryHistory};
use crate::config::EngineConfig;
use crate::host::Host;
use crate::keymap::{KeySeq, KeyToken, Mode, SharedKeymap};
use crate::tracing::SessionSnapshot;

/// What happened to a single fed key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Waiting for more keys
    Pending,
    /// The cancel key returned the session to Normal
    Cancelled,
    /// A command was resolved and ran
    Executed(Invocation),
    /// Text typed into the buffer (Insert/Replace)
    Inserted(String),
    /// A user mapping or dot-repeat was replayed
    Replayed,
    /// Replay stopped to wait for interactive input
    Suspended(Continuation),
    /// Key had no effect
    Ignored,
    /// Resolution or execution failed; the session has been reset
    Failed(EngineError),
}

/// Per-key knobs of the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOptions {
    /// Count forced by dot-repeat; typed counts are ignored while set
    pub repeat_count: Option<usize>,
    /// Run the command as soon as it is runnable
    pub do_eval: bool,
    pub check_user_mappings: bool,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            repeat_count: None,
            do_eval: true,
            check_user_mappings: true,
        }
    }
}

/// Engine behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineOptions {
    /// Suppress blinks (messages still go out)
    pub belloff: bool,
}

/// Resolves keys against a keymap and drives a host
pub struct Engine {
    pub(crate) keymap: SharedKeymap,
    pub(crate) session: Session,
    pub(crate) history: Box<dyn History>,
    pub(crate) options: EngineOptions,
}

impl Engine {
    pub fn new(keymap: SharedKeymap) -> Self {
        Self {
            keymap,
            session: Session::new(),
            history: Box::new(MemoryHistory::new()),
            options: EngineOptions::default(),
        }
    }

    pub fn with_config(keymap: SharedKeymap, config: &EngineConfig) -> Self {
        let mut engine = Self::new(keymap)
            .with_history(Box::new(MemoryHistory::with_capacity(config.history_size)));
        engine.options.belloff = config.belloff;
        engine
    }

    /// Use a different history store
    pub fn with_history(mut self, history: Box<dyn History>) -> Self {
        self.history = history;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn keymap(&self) -> &SharedKeymap {
        &self.keymap
    }

    pub fn history(&self) -> &dyn History {
        self.history.as_ref()
    }

    pub fn history_mut(&mut self) -> &mut dyn History {
        self.history.as_mut()
    }

    pub fn options_mut(&mut self) -> &mut EngineOptions {
        &mut self.options
    }

    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Feed one interactively typed key
    pub fn feed(&mut self, host: &mut dyn Host, key: KeyToken) -> KeyOutcome {
        self.feed_with(host, key, FeedOptions::default())
    }

    /// Feed one key with explicit options
    pub fn feed_with(
        &mut self,
        host: &mut dyn Host,
        key: KeyToken,
        options: FeedOptions,
    ) -> KeyOutcome {
        let before = tracing::enabled!(tracing::Level::TRACE)
            .then(|| SessionSnapshot::from_session(&self.session));

        let outcome = match self.feed_key(host, key, options) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.recover(host, &e);
                KeyOutcome::Failed(e)
            }
        };

        if let Some(before) = before {
            if let Some(diff) = before.diff(&SessionSnapshot::from_session(&self.session)) {
                tracing::trace!("{}: {}", key, diff);
            }
        }
        outcome
    }

    /// Feed every key of `notation` interactively, one at a time
    pub fn feed_keys(&mut self, host: &mut dyn Host, notation: &str) -> Vec<KeyOutcome> {
        let mut outcomes = Vec::new();
        for key in crate::keymap::tokenize(notation) {
            outcomes.push(self.feed(host, key));
        }
        outcomes
    }

    /// Replay `keys` non-interactively
    ///
    /// Motions before the first action run on their own; the rest runs
    /// inside one undo group. The whole string becomes the new dot-repeat
    /// unless it is `.`, `u` or `<C-r>`.
    pub fn process_notation(
        &mut self,
        host: &mut dyn Host,
        keys: &str,
        repeat_count: Option<usize>,
        check_user_mappings: bool,
    ) -> ReplayOutcome {
        let keys = KeySeq::parse(keys);
        match self.replay(host, &keys, repeat_count, check_user_mappings, Carried::default()) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.recover(host, &e);
                ReplayOutcome::Aborted(e)
            }
        }
    }

    /// Complete pending input with text collected by the host's own prompt
    pub fn submit_input(&mut self, host: &mut dyn Host, text: &str) -> KeyOutcome {
        match self.submit(host, text) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.recover(host, &e);
                KeyOutcome::Failed(e)
            }
        }
    }

    /// Drop any command in progress and return to Normal
    pub fn reset(&mut self, host: &mut dyn Host) {
        self.session.reset_command_data();
        self.session.insert_recording = None;
        self.session.non_interactive = false;
        self.set_mode(host, Mode::Normal);
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    /// Switch mode, notifying the host if it changed
    pub(crate) fn set_mode(&mut self, host: &mut dyn Host, mode: Mode) {
        let from = self.session.mode;
        self.session.mode = mode;
        self.notify_mode(host, from);
    }

    /// Notify the host if the mode differs from `from`
    pub(crate) fn notify_mode(&mut self, host: &mut dyn Host, from: Mode) {
        let to = self.session.mode;
        if from != to {
            tracing::debug!("Mode {:?} → {:?}", from, to);
            if from.is_insert_like() && !to.is_insert_like() {
                self.session.insert_recording = None;
            }
            host.mode_changed(from, to);
        }
    }

    pub(crate) fn blink(&self, host: &mut dyn Host) {
        if !self.options.belloff {
            host.blink();
        }
    }

    /// Top-level error recovery: reset, notify, never propagate
    fn recover(&mut self, host: &mut dyn Host, error: &EngineError) {
        match error {
            EngineError::Unresolved { .. } => tracing::debug!("{}", error),
            _ => tracing::warn!("{}", error),
        }

        self.session.reset_command_data();
        self.session.non_interactive = false;
        if error.resets_mode() || self.session.mode == Mode::OperatorPending {
            self.set_mode(host, Mode::Normal);
        }

        if error.is_reported() {
            host.message(&error.to_string());
        }
        self.blink(host);
    }
}

/// Register and counts carried into a replay from the key that triggered it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Carried {
    pub register: Option<char>,
    pub action_count: Option<usize>,
    pub motion_count: Option<usize>,
}

impl Carried {
    pub fn apply(self, session: &mut Session) {
        if self.register.is_some() {
            session.register = self.register;
        }
        if self.action_count.is_some() {
            session.action_count = self.action_count;
        }
        if self.motion_count.is_some() {
            session.motion_count = self.motion_count;
        }
    }
}
