//! Non-interactive replay of key notation
//!
//! Used for user-mapping expansion, dot-repeat and programmatic macros.
//! Motions before the first action are evaluated one at a time outside any
//! undo group; everything from the first action on runs inside a single
//! group. The whole string is then recorded for dot-repeat.

use crate::host::{Host, PromptRequest};
use crate::keymap::{KeySeq, Mode, PromptKind};

use super::error::EngineError;
use super::input::InputTarget;
use super::state::{Pending, RepeatData};
use super::{Carried, Engine, FeedOptions, KeyOutcome};

/// Replays of exactly these never become the dot-repeat
const NON_RECORDABLE: [&str; 3] = [".", "u", "<C-r>"];

/// Replay stopped at a command that needs interactive input
///
/// The session keeps the pending collector; the next fed keys resume it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    /// Which half of the command is waiting
    pub target: InputTarget,
    /// Prompt opened for line input; None for single-char input
    pub prompt: Option<PromptKind>,
    /// Input already supplied by the replayed keys
    pub seed: String,
}

/// Result of replaying a notation string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    Completed,
    Suspended(Continuation),
    /// Replay stopped at an error; earlier edits are kept
    Aborted(EngineError),
}

impl Engine {
    /// Replay `keys`, restoring the interactive flag afterwards even on error
    pub(super) fn replay(
        &mut self,
        host: &mut dyn Host,
        keys: &KeySeq,
        repeat_count: Option<usize>,
        check_user_mappings: bool,
        carried: Carried,
    ) -> Result<ReplayOutcome, EngineError> {
        let outermost = !self.session.non_interactive;
        self.session.non_interactive = true;

        let result = self.replay_keys(host, keys, repeat_count, check_user_mappings, carried, outermost);

        self.session.non_interactive = !outermost;
        if let Err(e) = &result {
            tracing::warn!("Replay of {} aborted: {}", keys, e);
        }
        result
    }

    fn replay_keys(
        &mut self,
        host: &mut dyn Host,
        keys: &KeySeq,
        repeat_count: Option<usize>,
        check_user_mappings: bool,
        carried: Carried,
        outermost: bool,
    ) -> Result<ReplayOutcome, EngineError> {
        let initial_mode = self.session.mode;
        tracing::debug!("Replaying {} from {:?}", keys, initial_mode);

        if keys.is_empty() {
            return Ok(ReplayOutcome::Completed);
        }

        let tokens = keys.tokens();
        carried.apply(&mut self.session);

        // Leading motions: evaluate each as soon as it is runnable, stop at
        // the first primed action
        let deferred = FeedOptions {
            repeat_count,
            do_eval: false,
            check_user_mappings,
        };
        let mut consumed = 0;
        let mut found_action = false;
        for (i, &key) in tokens.iter().enumerate() {
            self.feed_key(host, key, deferred)?;

            if self.session.action.is_some() || self.session.mapping_primed {
                tracing::debug!("First action found in {}", self.session.sequence);
                found_action = true;
                break;
            }

            if self.session.runnable() {
                tracing::debug!("Leading motion {}", self.session.sequence);
                self.eval(host)?;
            }

            if self.session.sequence.is_empty() {
                consumed = i + 1;
            }
        }

        // Motions only: whatever is still pending waits for the next key
        if !found_action {
            if self.session.must_collect_input() {
                return Ok(ReplayOutcome::Suspended(self.collect_input(host)));
            }
            return Ok(ReplayOutcome::Completed);
        }

        // Start the rest over from the first unconsumed key
        self.session.reset_command_data();
        if consumed == 0 {
            carried.apply(&mut self.session);
        }
        // The deferred pass never told the host about OperatorPending
        if self.session.mode == Mode::OperatorPending {
            self.session.mode = Mode::Normal;
        }

        host.begin_undo_group();
        let result = self.replay_rest(host, &tokens[consumed..], repeat_count, check_user_mappings);
        host.end_undo_group();

        if let Some(continuation) = result? {
            return Ok(ReplayOutcome::Suspended(continuation));
        }

        if self.session.must_collect_input() {
            return Ok(ReplayOutcome::Suspended(self.collect_input(host)));
        }

        if NON_RECORDABLE.iter().any(|s| KeySeq::parse(s) == *keys) {
            tracing::debug!("Not recording {} for repeat", keys);
        } else {
            self.session.repeat = Some(RepeatData {
                keys: keys.clone(),
                initial_mode,
            });
        }

        // Replay left us typing: the rest of this insert session belongs to
        // the same change
        if outermost && self.session.mode.is_insert_like() {
            self.session.insert_recording = Some(RepeatData {
                keys: keys.clone(),
                initial_mode,
            });
        }

        Ok(ReplayOutcome::Completed)
    }

    fn replay_rest(
        &mut self,
        host: &mut dyn Host,
        tokens: &[crate::keymap::KeyToken],
        repeat_count: Option<usize>,
        check_user_mappings: bool,
    ) -> Result<Option<Continuation>, EngineError> {
        let options = FeedOptions {
            repeat_count,
            do_eval: true,
            check_user_mappings,
        };
        for &key in tokens {
            if let KeyOutcome::Suspended(continuation) = self.feed_key(host, key, options)? {
                return Ok(Some(continuation));
            }
        }
        Ok(None)
    }

    /// Hand the pending input over to an interactive prompt
    pub(super) fn collect_input(&mut self, host: &mut dyn Host) -> Continuation {
        let (target, prompt, seed) = match &self.session.pending {
            Pending::Input { target, collector } => {
                (*target, collector.prompt(), collector.partial().to_string())
            }
            _ => (InputTarget::Action, None, String::new()),
        };

        tracing::debug!("Collecting input for {:?} (seed {:?})", target, seed);
        if let Some(kind) = prompt {
            host.open_prompt(&PromptRequest {
                kind,
                seed: seed.clone(),
            });
        }

        Continuation {
            target,
            prompt,
            seed,
        }
    }

    /// `.`: replay the last change, the typed count replacing its own
    pub(super) fn repeat_last_change(
        &mut self,
        host: &mut dyn Host,
        count: Option<usize>,
    ) -> Result<KeyOutcome, EngineError> {
        let Some(repeat) = self.session.repeat.clone() else {
            tracing::debug!("Nothing to repeat");
            self.blink(host);
            return Ok(KeyOutcome::Ignored);
        };

        tracing::info!("Repeating {} (count {:?})", repeat.keys, count);

        // A change made on a selection replays on a selection; the host
        // restores it when told about the mode switch
        if repeat.initial_mode.is_visual() && self.session.mode != repeat.initial_mode {
            self.set_mode(host, repeat.initial_mode);
        }

        let outcome = self.replay(host, &repeat.keys, count, false, Carried::default())?;
        if let ReplayOutcome::Suspended(continuation) = outcome {
            return Ok(KeyOutcome::Suspended(continuation));
        }

        // The recorded keys did not form a complete change here
        if self.session.mode == Mode::OperatorPending || self.session.action.is_some() {
            tracing::debug!("Repeat of {} left {} pending", repeat.keys, self.session.sequence);
            let sequence = repeat.keys.to_string();
            self.session.repeat = Some(repeat);
            return Err(EngineError::Unresolved { sequence });
        }

        Ok(KeyOutcome::Replayed)
    }
}
