//! Per-key resolution: the session state machine
//!
//! Each key is handled in a fixed order: cancel, register capture, input
//! collection, counts, then keymap resolution of the partial sequence.

use crate::host::{Host, PromptRequest};
use crate::keymap::{
    Action, ActionDef, CommandDef, InputParser, KeyCode, KeySeq, KeyToken, Mode, PromptKind,
    UserMapping,
};

use super::error::EngineError;
use super::input::{Feed, InputCollector, InputTarget};
use super::replay::ReplayOutcome;
use super::state::{is_valid_register, Pending, RepeatData};
use super::{Carried, Engine, FeedOptions, KeyOutcome};

impl Engine {
    pub(super) fn feed_key(
        &mut self,
        host: &mut dyn Host,
        key: KeyToken,
        options: FeedOptions,
    ) -> Result<KeyOutcome, EngineError> {
        tracing::debug!(
            "Key {} in {:?} (repeat_count={:?} do_eval={} check_user_mappings={})",
            key,
            self.session.mode,
            options.repeat_count,
            options.do_eval,
            options.check_user_mappings
        );

        if key.is_cancel() {
            return self.cancel(host, key);
        }

        self.session.push_key(key);

        if self.session.must_capture_register_name() {
            return self.capture_register(key);
        }

        if self.session.must_collect_input() {
            return self.feed_input(host, key, options);
        }

        if self.handle_count(&key, options.repeat_count) {
            tracing::trace!("Count digit {}", key);
            return Ok(KeyOutcome::Pending);
        }

        self.resolve_key(host, key, options)
    }

    /// Escape: back to Normal from anywhere
    fn cancel(&mut self, host: &mut dyn Host, key: KeyToken) -> Result<KeyOutcome, EngineError> {
        let from = self.session.mode;

        // A key held back for a possible insert mapping is typed after all
        if from.is_insert_like() && !self.session.partial_sequence.is_empty() {
            self.insert_partial(host)?;
        }

        if let Some(mut recording) = self.session.insert_recording.take() {
            if from.is_insert_like() {
                recording.keys.push(key);
                tracing::debug!("Insert session recorded: {}", recording.keys);
                self.session.repeat = Some(recording);
            }
        }

        self.session.reset_command_data();
        self.session.mode = Mode::Normal;
        host.mode_changed(from, Mode::Normal);
        Ok(KeyOutcome::Cancelled)
    }

    fn capture_register(&mut self, key: KeyToken) -> Result<KeyOutcome, EngineError> {
        match key.as_char().filter(|&c| is_valid_register(c)) {
            Some(name) => {
                tracing::debug!("Register {}", name);
                self.session.register = Some(name);
                self.session.pending = Pending::None;
                self.session.reset_partial_sequence();
                Ok(KeyOutcome::Pending)
            }
            None => Err(EngineError::InvalidRegister {
                key: key.to_string(),
            }),
        }
    }

    fn feed_input(
        &mut self,
        host: &mut dyn Host,
        key: KeyToken,
        options: FeedOptions,
    ) -> Result<KeyOutcome, EngineError> {
        let feed = match &mut self.session.pending {
            Pending::Input { collector, .. } => collector.feed(&key, self.history.as_ref()),
            _ => return Ok(KeyOutcome::Pending),
        };

        match feed {
            Feed::More => Ok(KeyOutcome::Pending),
            Feed::Blink => {
                self.blink(host);
                Ok(KeyOutcome::Pending)
            }
            Feed::Cancelled => {
                tracing::debug!("Input cancelled");
                self.session.reset_command_data();
                if self.session.mode == Mode::OperatorPending {
                    self.set_mode(host, Mode::Normal);
                }
                Ok(KeyOutcome::Cancelled)
            }
            Feed::Done(value) => self.finish_input(host, value, options.do_eval),
        }
    }

    /// Complete pending input with text typed into a host-owned prompt
    pub(super) fn submit(
        &mut self,
        host: &mut dyn Host,
        text: &str,
    ) -> Result<KeyOutcome, EngineError> {
        if !self.session.must_collect_input() {
            return Ok(KeyOutcome::Ignored);
        }

        // Keep the sequence complete so dot-repeat sees the typed text
        let line = matches!(self.session.pending_parser(), Some(InputParser::Line(_)));
        for c in text.chars() {
            self.session.push_key(KeyToken::char(c));
        }
        if line {
            self.session.push_key(KeyToken::key(KeyCode::Enter));
        }

        self.finish_input(host, text.to_string(), true)
    }

    fn finish_input(
        &mut self,
        host: &mut dyn Host,
        value: String,
        do_eval: bool,
    ) -> Result<KeyOutcome, EngineError> {
        let (target, prompt) = match &self.session.pending {
            Pending::Input { target, collector } => (*target, collector.prompt()),
            _ => return Ok(KeyOutcome::Ignored),
        };

        if let Some(kind) = prompt {
            if !self.session.non_interactive {
                self.history.append(kind.into(), &value);
            }
        }

        tracing::debug!("Input for {:?}: {:?}", target, value);
        self.session.complete_input(target, value);

        if do_eval && self.session.runnable() {
            self.eval(host)
        } else {
            Ok(KeyOutcome::Pending)
        }
    }

    /// Returns true if the key was taken as a count digit
    ///
    /// With a forced repeat count, digits that would start or extend a count
    /// are swallowed; the forced count wins.
    fn handle_count(&mut self, key: &KeyToken, repeat_count: Option<usize>) -> bool {
        if let Some(count) = repeat_count {
            self.session.action_count = Some(count);
        }

        if self.session.mode.is_insert_like() || !self.session.partial_sequence.is_empty() {
            return false;
        }
        let Some(digit) = key.as_digit() else {
            return false;
        };

        let for_action = self.session.action.is_none();
        if !for_action && self.session.mode != Mode::OperatorPending {
            return false;
        }

        let started = match repeat_count {
            Some(_) => self.previous_key_was_digit(),
            None if for_action => self.session.action_count.is_some(),
            None => self.session.motion_count.is_some(),
        };
        // A leading 0 is the line-start motion
        if digit == 0 && !started {
            return false;
        }

        if repeat_count.is_none() {
            if for_action {
                self.session.push_action_digit(digit);
            } else {
                self.session.push_motion_digit(digit);
            }
        }
        true
    }

    fn previous_key_was_digit(&self) -> bool {
        let tokens = self.session.sequence.tokens();
        tokens.len() >= 2 && tokens[tokens.len() - 2].as_digit().is_some()
    }

    fn resolve_key(
        &mut self,
        host: &mut dyn Host,
        key: KeyToken,
        options: FeedOptions,
    ) -> Result<KeyOutcome, EngineError> {
        let before = self.session.mode;
        let check = options.check_user_mappings;
        self.session.partial_sequence.push(key);

        let command = {
            let keymap = self.keymap.borrow();
            if check && keymap.is_user_prefix(before, &self.session.partial_sequence) {
                tracing::debug!(
                    "Incomplete user mapping: {}",
                    self.session.partial_sequence
                );
                return Ok(KeyOutcome::Pending);
            }
            keymap.resolve(before, &self.session.partial_sequence, check)
        };

        let command = match command {
            CommandDef::OpenRegister => {
                self.session.enter_register_capture();
                return Ok(KeyOutcome::Pending);
            }
            CommandDef::OpenNamespace => {
                tracing::debug!("Namespace {}", self.session.partial_sequence);
                return Ok(KeyOutcome::Pending);
            }
            CommandDef::UserMapping(mapping) => {
                if !options.do_eval {
                    self.session.mapping_primed = true;
                    return Ok(KeyOutcome::Pending);
                }
                return self.expand_user_mapping(host, mapping);
            }
            CommandDef::Missing if before.is_insert_like() => return self.insert_partial(host),
            CommandDef::Missing => self.recompose()?,
            command if before == Mode::OperatorPending => {
                self.doubled_operator().unwrap_or(command)
            }
            command => command,
        };

        // Doubled operators (`cc`, `g~~`) come back as plain actions
        if self.session.mode == Mode::OperatorPending {
            if let Some(def) = command.as_action() {
                if !def.motion_required {
                    self.session.mode = Mode::Normal;
                }
            }
        }

        tracing::debug!("Resolved {} to {:?}", self.session.sequence, command);
        self.session.set_command(&command);
        // Deferred resolution only primes; its mode is put back by the replayer
        if options.do_eval {
            self.notify_mode(host, before);
        }

        if self.session.mode == Mode::OperatorPending {
            self.session.reset_partial_sequence();
        }

        if !self.session.non_interactive {
            if let Some(InputParser::Line(kind)) = self.session.pending_parser() {
                host.open_prompt(&PromptRequest {
                    kind,
                    seed: String::new(),
                });
            }
        }

        if options.do_eval && self.session.runnable() {
            self.eval(host)
        } else {
            Ok(KeyOutcome::Pending)
        }
    }

    /// Rebuild a missed sequence from its bare form
    ///
    /// In OperatorPending the whole `d2d` is re-read as Normal `dd`.
    fn recompose(&mut self) -> Result<CommandDef, EngineError> {
        let mode = match self.session.mode {
            Mode::OperatorPending => Mode::Normal,
            mode => mode,
        };
        let bare = self.session.sequence.bare();
        let command = self.keymap.borrow().fallback(mode, &bare);

        if !command.is_command() {
            return Err(EngineError::Unresolved {
                sequence: self.session.sequence.to_string(),
            });
        }

        tracing::debug!("Recomposed {} as {} in {:?}", self.session.sequence, bare, mode);
        Ok(command)
    }

    /// Linewise form of the pending operator when the whole sequence is one
    ///
    /// Checked before OperatorPending bindings so `g??` is not read as `g?`
    /// plus a backward search.
    fn doubled_operator(&self) -> Option<CommandDef> {
        let bare = self.session.sequence.bare();
        let def = self.keymap.borrow().compound_action(&bare)?;
        tracing::debug!("Doubled operator {} as {}", self.session.sequence, bare);
        Some(def.into())
    }

    /// Type unmapped keys in Insert/Replace mode
    fn insert_partial(&mut self, host: &mut dyn Host) -> Result<KeyOutcome, EngineError> {
        let keys = std::mem::take(&mut self.session.partial_sequence);
        self.session.reset_command_data();

        let text: String = keys.tokens().iter().filter_map(KeyToken::translate).collect();
        if text.is_empty() {
            tracing::debug!("Nothing to insert for {}", keys);
            self.blink(host);
            return Ok(KeyOutcome::Ignored);
        }

        if let Some(recording) = &mut self.session.insert_recording {
            recording.keys.extend_from(&keys);
        }
        host.insert_text(&text)?;
        Ok(KeyOutcome::Inserted(text))
    }

    fn expand_user_mapping(
        &mut self,
        host: &mut dyn Host,
        mapping: UserMapping,
    ) -> Result<KeyOutcome, EngineError> {
        let session = &self.session;
        let operator_pending = session.mode == Mode::OperatorPending;

        // In OperatorPending the operator (and its counts) are replayed in
        // front of the mapping, so nothing needs carrying over
        let (keys, carried) = if operator_pending {
            let consumed = session.sequence.len() - session.partial_sequence.len();
            let mut keys = session.sequence.slice(0..consumed);
            keys.extend_from(&mapping.rhs);
            (keys, Carried::default())
        } else {
            let carried = Carried {
                register: session.register,
                action_count: session.action_count,
                motion_count: session.motion_count,
            };
            (mapping.rhs.clone(), carried)
        };

        tracing::info!("User mapping {} → {}", mapping.lhs, keys);
        self.session.reset_command_data();
        if operator_pending {
            self.set_mode(host, Mode::Normal);
        }

        if mapping.is_cmdline() {
            return self.run_user_cmdline(host, &mapping.rhs, carried);
        }

        match self.replay(host, &keys, None, false, carried)? {
            ReplayOutcome::Suspended(continuation) => Ok(KeyOutcome::Suspended(continuation)),
            _ => Ok(KeyOutcome::Replayed),
        }
    }

    /// Run `:cmd<cr>` directly, or open the command line seeded with `cmd`
    fn run_user_cmdline(
        &mut self,
        host: &mut dyn Host,
        rhs: &KeySeq,
        carried: Carried,
    ) -> Result<KeyOutcome, EngineError> {
        let body = &rhs.tokens()[1..];
        let submit = body.last().is_some_and(|t| t.key == KeyCode::Enter && t.mods.is_empty());

        if submit {
            let line = notation_text(&body[..body.len() - 1]);
            tracing::info!("Running command line :{}", line);
            host.run_cmdline(&line)?;
            return Ok(KeyOutcome::Replayed);
        }

        let seed = notation_text(body);
        carried.apply(&mut self.session);
        self.session.action = Some(
            ActionDef::command(Action::Cmdline).with_input(InputParser::Line(PromptKind::Cmdline)),
        );
        self.session.begin_input(
            InputTarget::Action,
            InputCollector::line_with_text(PromptKind::Cmdline, &seed),
        );
        Ok(KeyOutcome::Suspended(self.collect_input(host)))
    }

    /// Run the pending command and settle the session
    pub(super) fn eval(&mut self, host: &mut dyn Host) -> Result<KeyOutcome, EngineError> {
        let invocation = self.session.invocation()?;
        let action = self.session.action;
        let sequence = self.session.sequence.clone();
        let sequence_mode = self.session.sequence_mode;
        let mode = self.session.mode;
        let interactive = !self.session.non_interactive;
        self.session.reset_command_data();

        if action.map(|def| def.action) == Some(Action::RepeatLastChange) {
            return self.repeat_last_change(host, invocation.action_count);
        }

        tracing::info!("Executing {}", invocation);
        host.execute(&invocation)?;

        let next = match action {
            Some(def) => def.then.apply(mode),
            None => mode,
        };
        self.set_mode(host, next);

        if let Some(def) = action {
            if interactive && def.repeatable {
                self.session.repeat = Some(RepeatData {
                    keys: sequence.clone(),
                    initial_mode: sequence_mode,
                });
            }

            if mode.is_insert_like() {
                if let Some(recording) = &mut self.session.insert_recording {
                    recording.keys.extend_from(&sequence);
                }
            } else if interactive && next.is_insert_like() {
                self.session.insert_recording = Some(RepeatData {
                    keys: sequence,
                    initial_mode: sequence_mode,
                });
            }
        }

        Ok(KeyOutcome::Executed(invocation))
    }
}

/// Literal text of a run of keys, for command lines
fn notation_text(tokens: &[KeyToken]) -> String {
    tokens
        .iter()
        .map(|t| t.translate().unwrap_or_else(|| t.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Recorder;
    use crate::keymap::{tokenize, Keymap, Motion};

    fn engine() -> Engine {
        Engine::new(Keymap::with_builtins().shared())
    }

    fn feed(engine: &mut Engine, host: &mut Recorder, keys: &str) -> Vec<KeyOutcome> {
        tokenize(keys).map(|k| engine.feed(&mut *host, k)).collect()
    }

    #[test]
    fn test_count_then_motion() {
        let mut engine = engine();
        let mut host = Recorder::new();
        let outcomes = feed(&mut engine, &mut host, "34w");
        assert_eq!(outcomes[0], KeyOutcome::Pending);
        assert_eq!(outcomes[1], KeyOutcome::Pending);
        match &outcomes[2] {
            KeyOutcome::Executed(inv) => {
                assert_eq!(inv.motion(), Some(Motion::WordForward));
                assert_eq!(inv.count(), 34);
            }
            other => panic!("expected execution, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_is_a_motion() {
        let mut engine = engine();
        let mut host = Recorder::new();
        feed(&mut engine, &mut host, "0");
        assert_eq!(host.invocations()[0].motion(), Some(Motion::LineStart));
    }

    #[test]
    fn test_ten_is_a_count() {
        let mut engine = engine();
        let mut host = Recorder::new();
        feed(&mut engine, &mut host, "10j");
        assert_eq!(host.invocations()[0].count(), 10);
    }

    #[test]
    fn test_forced_count_swallows_typed_digits() {
        let mut engine = engine();
        let mut host = Recorder::new();
        let options = FeedOptions {
            repeat_count: Some(3),
            ..FeedOptions::default()
        };
        for key in tokenize("2x") {
            engine.feed_with(&mut host, key, options);
        }
        let invocations = host.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].action_count, Some(3));
    }

    #[test]
    fn test_previous_digit_detection() {
        let mut engine = engine();
        let mut host = Recorder::new();
        let options = FeedOptions {
            repeat_count: Some(2),
            ..FeedOptions::default()
        };
        // "10x" repeated: both digits are swallowed
        for key in tokenize("10x") {
            engine.feed_with(&mut host, key, options);
        }
        assert_eq!(host.invocations()[0].action(), Some(Action::DeleteChar));
    }

    #[test]
    fn test_unmapped_insert_key_blinks() {
        let mut engine = engine();
        let mut host = Recorder::new();
        feed(&mut engine, &mut host, "i");
        let outcome = engine.feed(&mut host, KeyToken::key(KeyCode::F(5)));
        assert_eq!(outcome, KeyOutcome::Ignored);
        assert_eq!(host.blinks(), 1);
        assert_eq!(engine.mode(), Mode::Insert);
    }

    #[test]
    fn test_notation_text() {
        let tokens: Vec<KeyToken> = tokenize("w<space>a<C-r>").collect();
        assert_eq!(notation_text(&tokens), "w a<C-r>");
    }
}
