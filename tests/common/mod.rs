//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use vimkeys::engine::Engine;
use vimkeys::host::{HostEvent, Recorder};
use vimkeys::keymap::{tokenize, Keymap, Mode, UserMapping};
use vimkeys::{Invocation, KeyOutcome};

/// Engine over the built-in table, no user mappings
pub fn test_engine() -> Engine {
    Engine::new(Keymap::with_builtins().shared())
}

/// Engine with user mappings `(mode, lhs, rhs)` layered on the built-ins
pub fn engine_with_mappings(mappings: &[(Mode, &str, &str)]) -> Engine {
    let mut keymap = Keymap::with_builtins();
    for &(mode, lhs, rhs) in mappings {
        keymap.add_user_mapping(UserMapping::new(mode, lhs, rhs));
    }
    Engine::new(keymap.shared())
}

/// Type `keys` one at a time, returning the outcome of each key
pub fn type_keys(engine: &mut Engine, host: &mut Recorder, keys: &str) -> Vec<KeyOutcome> {
    tokenize(keys).map(|key| engine.feed(&mut *host, key)).collect()
}

/// Type `keys` and return the single invocation they produced
pub fn single_invocation(engine: &mut Engine, keys: &str) -> Invocation {
    let mut host = Recorder::new();
    type_keys(engine, &mut host, keys);
    let invocations = host.invocations();
    assert_eq!(
        invocations.len(),
        1,
        "expected one invocation for {:?}, got {:?}",
        keys,
        invocations
    );
    invocations[0].clone()
}

/// Mode transitions reported to the host, in order
pub fn mode_changes(host: &Recorder) -> Vec<(Mode, Mode)> {
    host.events
        .iter()
        .filter_map(|e| match e {
            HostEvent::ModeChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

/// Assert the session holds no command in progress
pub fn assert_idle(engine: &Engine) {
    let session = engine.session();
    assert!(session.sequence().is_empty(), "sequence: {}", session.sequence());
    assert!(session.partial_sequence().is_empty());
    assert!(session.action().is_none());
    assert!(session.motion().is_none());
    assert_eq!(session.action_count(), None);
    assert_eq!(session.motion_count(), None);
    assert_eq!(session.register(), None);
    assert!(!session.must_capture_register_name());
    assert!(!session.must_collect_input());
}
