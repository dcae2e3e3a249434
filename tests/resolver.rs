//! Key resolution tests
//!
//! Counts, operator+motion composition, doubled operators, registers,
//! namespaces, cancellation, text objects and Insert-mode typing.

mod common;

use common::{assert_idle, engine_with_mappings, mode_changes, single_invocation, test_engine, type_keys};

use vimkeys::engine::{EngineError, FeedOptions};
use vimkeys::host::{HostEvent, Recorder};
use vimkeys::keymap::{Action, KeyToken, Mode, Motion, PromptKind, TextObjectKind};
use vimkeys::KeyOutcome;

// ========================================================================
// Counts
// ========================================================================

#[test]
fn test_count_accumulates_across_digits() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "34w");
    assert_eq!(inv.motion(), Some(Motion::WordForward));
    assert_eq!(inv.action_count, Some(34));
    assert_eq!(inv.count(), 34);
}

#[test]
fn test_zero_alone_is_line_start() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "0");
    assert_eq!(inv.motion(), Some(Motion::LineStart));
    assert_eq!(inv.action_count, None);
}

#[test]
fn test_counts_multiply() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "2d3w");
    assert_eq!(inv.action(), Some(Action::Delete));
    assert_eq!(inv.action_count, Some(2));
    assert_eq!(inv.motion_count, Some(3));
    assert_eq!(inv.count(), 6);
}

#[test]
fn test_zero_after_operator_is_a_motion() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "d0");
    assert_eq!(inv.motion(), Some(Motion::LineStart));
    assert_eq!(inv.motion_count, None);
}

// ========================================================================
// Operator + motion composition
// ========================================================================

#[test]
fn test_delete_word_runs_in_internal_normal() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    let outcomes = type_keys(&mut engine, &mut host, "dw");

    assert_eq!(outcomes[0], KeyOutcome::Pending);
    assert_eq!(engine.mode(), Mode::Normal);
    let inv = host.invocations()[0].clone();
    assert_eq!(inv.mode, Mode::InternalNormal);
    assert_eq!(inv.action(), Some(Action::Delete));
    assert_eq!(inv.motion(), Some(Motion::WordForward));
    assert_eq!(
        mode_changes(&host),
        vec![
            (Mode::Normal, Mode::OperatorPending),
            (Mode::OperatorPending, Mode::Normal)
        ]
    );
    assert_idle(&engine);
}

#[test]
fn test_operator_waits_in_operator_pending() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "3d");
    assert_eq!(engine.mode(), Mode::OperatorPending);
    assert_eq!(engine.session().action().map(|a| a.action), Some(Action::Delete));
    assert_eq!(engine.session().action_count(), Some(3));
    assert!(engine.session().partial_sequence().is_empty());
    assert_eq!(engine.session().sequence().to_string(), "3d");
    assert!(host.invocations().is_empty());
}

#[test]
fn test_doubled_operator_recomposes_to_line_action() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "dd");
    assert_eq!(inv.action(), Some(Action::DeleteLine));
    assert_eq!(inv.motion, None);
    assert_eq!(inv.mode, Mode::Normal);
}

#[test]
fn test_doubled_operator_with_counts() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "3dd");
    assert_eq!(inv.action(), Some(Action::DeleteLine));
    assert_eq!(inv.count(), 3);

    let inv = single_invocation(&mut engine, "d2d");
    assert_eq!(inv.action(), Some(Action::DeleteLine));
    assert_eq!(inv.motion_count, Some(2));
    assert_eq!(inv.count(), 2);
}

#[test]
fn test_two_key_operator_doubling() {
    let mut engine = test_engine();
    assert_eq!(
        single_invocation(&mut engine, "g~~").action(),
        Some(Action::SwapCaseLine)
    );
    assert_eq!(
        single_invocation(&mut engine, "gUgU").action(),
        Some(Action::UppercaseLine)
    );
    assert_eq!(
        single_invocation(&mut engine, "guu").action(),
        Some(Action::LowercaseLine)
    );
}

#[test]
fn test_doubled_operator_wins_over_pending_motion() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "g??");

    let invocations = host.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].action(), Some(Action::Rot13Line));
    assert_eq!(invocations[0].motion, None);
    assert!(!host.events.iter().any(|e| matches!(e, HostEvent::Prompt { .. })));
    assert_eq!(engine.mode(), Mode::Normal);
    assert_idle(&engine);

    let inv = single_invocation(&mut engine, "2g?g?");
    assert_eq!(inv.action(), Some(Action::Rot13Line));
    assert_eq!(inv.count(), 2);
}

#[test]
fn test_change_line_enters_insert() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "cc");
    assert_eq!(inv.action(), Some(Action::ChangeLine));
    assert_eq!(engine.mode(), Mode::Insert);
}

#[test]
fn test_operator_with_unknown_key_is_unresolved() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    let outcomes = type_keys(&mut engine, &mut host, "dx");
    assert_eq!(
        outcomes[1],
        KeyOutcome::Failed(EngineError::Unresolved {
            sequence: "dx".to_string()
        })
    );
    assert_eq!(engine.mode(), Mode::Normal);
    assert_eq!(host.blinks(), 1);
    assert_idle(&engine);
}

// ========================================================================
// Namespaces
// ========================================================================

#[test]
fn test_namespace_waits_for_more_keys() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    let outcomes = type_keys(&mut engine, &mut host, "gg");
    assert_eq!(outcomes[0], KeyOutcome::Pending);
    assert_eq!(host.invocations()[0].motion(), Some(Motion::DocumentStart));
}

#[test]
fn test_window_namespace() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "<C-w>v");
    assert_eq!(inv.action(), Some(Action::WindowSplitVertical));
}

#[test]
fn test_unknown_namespace_member_blinks() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    let outcomes = type_keys(&mut engine, &mut host, "gx");
    assert!(matches!(
        outcomes[1],
        KeyOutcome::Failed(EngineError::Unresolved { .. })
    ));
    assert_eq!(host.blinks(), 1);
    // Unresolved sequences blink but are not reported as messages
    assert!(!host
        .events
        .iter()
        .any(|e| matches!(e, HostEvent::Message { .. })));
}

// ========================================================================
// Registers
// ========================================================================

#[test]
fn test_register_prefix() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "\"ayy");
    assert_eq!(inv.register, Some('a'));
    assert_eq!(inv.action(), Some(Action::YankLine));
}

#[test]
fn test_register_then_count() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "\"+3p");
    assert_eq!(inv.register, Some('+'));
    assert_eq!(inv.action_count, Some(3));
    assert_eq!(inv.action(), Some(Action::PutAfter));
}

#[test]
fn test_invalid_register_blinks_and_clears() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    let outcomes = type_keys(&mut engine, &mut host, "\"!");
    assert_eq!(
        outcomes[1],
        KeyOutcome::Failed(EngineError::InvalidRegister {
            key: "!".to_string()
        })
    );
    assert_eq!(host.blinks(), 1);
    assert_idle(&engine);
}

// ========================================================================
// Cancellation
// ========================================================================

#[test]
fn test_escape_from_register_capture() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "2\"");
    assert!(engine.session().must_capture_register_name());

    assert_eq!(
        engine.feed(&mut host, KeyToken::key(vimkeys::keymap::KeyCode::Escape)),
        KeyOutcome::Cancelled
    );
    assert_eq!(engine.mode(), Mode::Normal);
    assert_idle(&engine);
}

#[test]
fn test_escape_from_operator_pending() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "\"a3d2<esc>");
    assert_eq!(engine.mode(), Mode::Normal);
    assert_idle(&engine);
    assert!(host.invocations().is_empty());
    assert_eq!(
        mode_changes(&host).last(),
        Some(&(Mode::OperatorPending, Mode::Normal))
    );
}

#[test]
fn test_escape_from_input_collection() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "d/fo");
    assert!(engine.session().must_collect_input());
    assert_eq!(engine.session().pending_input(), Some("fo"));

    type_keys(&mut engine, &mut host, "<C-[>");
    assert_eq!(engine.mode(), Mode::Normal);
    assert_idle(&engine);
}

#[test]
fn test_escape_in_normal_still_notifies() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    assert_eq!(
        type_keys(&mut engine, &mut host, "<esc>"),
        vec![KeyOutcome::Cancelled]
    );
    assert_eq!(mode_changes(&host), vec![(Mode::Normal, Mode::Normal)]);
}

// ========================================================================
// Input collection
// ========================================================================

#[test]
fn test_find_char_collects_one_key() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "dtx");
    assert_eq!(inv.action(), Some(Action::Delete));
    let motion = inv.motion.unwrap();
    assert_eq!(motion.motion, Motion::TillChar);
    assert_eq!(motion.input.as_deref(), Some("x"));
    assert!(motion.inclusive);
}

#[test]
fn test_find_char_takes_special_keys_literally() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "f<space>");
    assert_eq!(inv.motion.unwrap().input.as_deref(), Some(" "));
}

#[test]
fn test_search_opens_prompt_and_collects_line() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "/");
    assert!(host.events.contains(&HostEvent::Prompt {
        request: vimkeys::host::PromptRequest {
            kind: PromptKind::SearchForward,
            seed: String::new(),
        }
    }));

    type_keys(&mut engine, &mut host, "foo<bs>x<cr>");
    let inv = host.invocations()[0].clone();
    assert_eq!(inv.motion(), Some(Motion::SearchForward));
    assert_eq!(inv.motion.unwrap().input.as_deref(), Some("fox"));
}

#[test]
fn test_submit_input_from_host_prompt() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "?");
    let outcome = engine.submit_input(&mut host, "needle");
    match outcome {
        KeyOutcome::Executed(inv) => {
            assert_eq!(inv.motion(), Some(Motion::SearchBackward));
            assert_eq!(inv.motion.unwrap().input.as_deref(), Some("needle"));
        }
        other => panic!("expected execution, got {:?}", other),
    }
    assert_eq!(engine.submit_input(&mut host, "ignored"), KeyOutcome::Ignored);
}

#[test]
fn test_replace_char() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "3rx");
    assert_eq!(inv.action(), Some(Action::ReplaceChar));
    assert_eq!(inv.action.unwrap().input.as_deref(), Some("x"));
    assert_eq!(inv.action_count, Some(3));
}

// ========================================================================
// Text objects
// ========================================================================

#[test]
fn test_text_object_after_operator() {
    let mut engine = test_engine();
    let inv = single_invocation(&mut engine, "ci(");
    assert_eq!(inv.action(), Some(Action::Change));
    let motion = inv.motion.unwrap();
    assert_eq!(motion.motion, Motion::InnerObject);
    assert_eq!(motion.text_object, Some(TextObjectKind::Parens));
    assert_eq!(engine.mode(), Mode::Insert);
}

#[test]
fn test_text_object_in_visual() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "vaw");
    assert_eq!(engine.mode(), Mode::Visual);
    let inv = host.invocations()[1].clone();
    assert_eq!(inv.mode, Mode::Visual);
    assert_eq!(inv.motion.unwrap().text_object, Some(TextObjectKind::Word));
}

#[test]
fn test_unknown_text_object_is_reported() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    let outcomes = type_keys(&mut engine, &mut host, "diz");
    assert!(matches!(
        outcomes[2],
        KeyOutcome::Failed(EngineError::InvalidInput { .. })
    ));
    assert!(host.invocations().is_empty());
    assert!(host
        .events
        .iter()
        .any(|e| matches!(e, HostEvent::Message { .. })));
    assert_eq!(engine.mode(), Mode::Normal);
}

// ========================================================================
// Visual mode
// ========================================================================

#[test]
fn test_visual_operator_applies_to_selection() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "vjd");

    let invocations = host.invocations();
    assert_eq!(invocations.len(), 3);
    assert_eq!(invocations[1].mode, Mode::Visual);
    assert_eq!(invocations[2].action(), Some(Action::Delete));
    assert_eq!(invocations[2].mode, Mode::Visual);
    assert_eq!(engine.mode(), Mode::Normal);
}

#[test]
fn test_visual_toggle() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "vV");
    assert_eq!(engine.mode(), Mode::VisualLine);
    type_keys(&mut engine, &mut host, "V");
    assert_eq!(engine.mode(), Mode::Normal);
}

// ========================================================================
// Insert mode
// ========================================================================

#[test]
fn test_typing_in_insert_mode() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    let outcomes = type_keys(&mut engine, &mut host, "ihi<space>2<esc>");
    assert_eq!(outcomes[1], KeyOutcome::Inserted("h".to_string()));
    assert_eq!(host.inserted_text(), "hi 2");
    assert_eq!(engine.mode(), Mode::Normal);
}

#[test]
fn test_insert_mode_actions() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "ab<C-w><C-r>a");
    let actions: Vec<_> = host.invocations().iter().map(|i| i.action()).collect();
    assert_eq!(
        actions,
        vec![
            Some(Action::Append),
            Some(Action::DeleteWordBefore),
            Some(Action::InsertRegister)
        ]
    );
    assert_eq!(engine.mode(), Mode::Insert);
}

#[test]
fn test_replace_mode_types_text() {
    let mut engine = test_engine();
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "Rab");
    assert_eq!(engine.mode(), Mode::Replace);
    assert_eq!(host.inserted_text(), "ab");
}

// ========================================================================
// User mappings
// ========================================================================

#[test]
fn test_user_mapping_wins_over_builtin() {
    let mut engine = engine_with_mappings(&[(Mode::Normal, "x", "dd")]);
    let inv = single_invocation(&mut engine, "x");
    assert_eq!(inv.action(), Some(Action::DeleteLine));
}

#[test]
fn test_builtin_when_mappings_disabled() {
    let mut engine = engine_with_mappings(&[(Mode::Normal, "x", "dd")]);
    let mut host = Recorder::new();
    let options = FeedOptions {
        check_user_mappings: false,
        ..FeedOptions::default()
    };
    engine.feed_with(&mut host, KeyToken::char('x'), options);
    assert_eq!(host.invocations()[0].action(), Some(Action::DeleteChar));
}

#[test]
fn test_self_referential_mapping_does_not_recurse() {
    let mut engine = engine_with_mappings(&[(Mode::Normal, "j", "gj")]);
    let inv = single_invocation(&mut engine, "j");
    assert_eq!(inv.motion(), Some(Motion::DisplayLineDown));
}

#[test]
fn test_mapping_carries_count_and_register() {
    let mut engine = engine_with_mappings(&[(Mode::Normal, "Y", "y$")]);
    let inv = single_invocation(&mut engine, "\"b2Y");
    assert_eq!(inv.action(), Some(Action::Yank));
    assert_eq!(inv.motion(), Some(Motion::LineEnd));
    assert_eq!(inv.register, Some('b'));
    assert_eq!(inv.action_count, Some(2));
}

#[test]
fn test_operator_pending_mapping_keeps_operator() {
    let mut engine = engine_with_mappings(&[(Mode::OperatorPending, "L", "$")]);
    let inv = single_invocation(&mut engine, "2dL");
    assert_eq!(inv.action(), Some(Action::Delete));
    assert_eq!(inv.motion(), Some(Motion::LineEnd));
    assert_eq!(inv.count(), 2);
}

#[test]
fn test_insert_mapping_prefix_waits() {
    let mut engine = engine_with_mappings(&[(Mode::Insert, "jk", "<esc>")]);
    let mut host = Recorder::new();
    let outcomes = type_keys(&mut engine, &mut host, "iaj");
    assert_eq!(outcomes[2], KeyOutcome::Pending);
    assert_eq!(host.inserted_text(), "a");

    type_keys(&mut engine, &mut host, "k");
    assert_eq!(engine.mode(), Mode::Normal);
    assert_eq!(host.inserted_text(), "a");
}

#[test]
fn test_insert_mapping_prefix_falls_back_to_text() {
    let mut engine = engine_with_mappings(&[(Mode::Insert, "jk", "<esc>")]);
    let mut host = Recorder::new();
    let outcomes = type_keys(&mut engine, &mut host, "ijx");
    assert_eq!(outcomes[2], KeyOutcome::Inserted("jx".to_string()));
    assert_eq!(engine.mode(), Mode::Insert);
}

#[test]
fn test_held_prefix_is_typed_on_escape() {
    let mut engine = engine_with_mappings(&[(Mode::Insert, "jk", "<esc>")]);
    let mut host = Recorder::new();
    type_keys(&mut engine, &mut host, "ij<esc>");
    assert_eq!(host.inserted_text(), "j");
    assert_eq!(engine.mode(), Mode::Normal);
}

#[test]
fn test_cmdline_mapping_runs_host_cmdline() {
    let mut engine = engine_with_mappings(&[(Mode::Normal, "\\w", ":w<cr>")]);
    let mut host = Recorder::new();
    let outcomes = type_keys(&mut engine, &mut host, "\\w");
    assert_eq!(outcomes, vec![KeyOutcome::Pending, KeyOutcome::Replayed]);
    assert_eq!(
        host.events,
        vec![HostEvent::Cmdline {
            line: "w".to_string()
        }]
    );
}

#[test]
fn test_partial_cmdline_mapping_opens_prompt() {
    let mut engine = engine_with_mappings(&[(Mode::Normal, "\\s", ":%s/")]);
    let mut host = Recorder::new();
    let outcomes = type_keys(&mut engine, &mut host, "\\s");
    match &outcomes[1] {
        KeyOutcome::Suspended(continuation) => {
            assert_eq!(continuation.prompt, Some(PromptKind::Cmdline));
            assert_eq!(continuation.seed, "%s/");
        }
        other => panic!("expected suspension, got {:?}", other),
    }

    type_keys(&mut engine, &mut host, "a/b/<cr>");
    let inv = host.invocations()[0].clone();
    assert_eq!(inv.action(), Some(Action::Cmdline));
    assert_eq!(inv.action.unwrap().input.as_deref(), Some("%s/a/b/"));
}
