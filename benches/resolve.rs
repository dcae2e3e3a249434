//! Benchmarks for key resolution and replay
//!
//! Run with: cargo bench resolve

use vimkeys::host::{ExecError, Host};
use vimkeys::keymap::{tokenize, KeySeq, Keymap, Mode, UserMapping};
use vimkeys::{Engine, Invocation};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

/// Host that only counts executions
#[derive(Default)]
struct CountingHost {
    executed: usize,
}

impl Host for CountingHost {
    fn execute(&mut self, _invocation: &Invocation) -> Result<(), ExecError> {
        self.executed += 1;
        Ok(())
    }
}

const SEQUENCES: &[&str] = &[
    "3dw",
    "\"ayy",
    "g~iw",
    "d2d",
    "ci(",
    "dtx",
    "10j",
    "gUgU",
    "<C-w>v",
    "ifoo bar<esc>",
];

fn engine() -> Engine {
    let mut keymap = Keymap::with_builtins();
    keymap.add_user_mapping(UserMapping::new(Mode::Insert, "jk", "<esc>"));
    keymap.add_user_mapping(UserMapping::new(Mode::Normal, "Q", "gqap"));
    Engine::new(keymap.shared())
}

// ============================================================================
// Notation
// ============================================================================

#[divan::bench]
fn tokenize_sequences() -> usize {
    SEQUENCES
        .iter()
        .map(|s| tokenize(divan::black_box(s)).count())
        .sum()
}

#[divan::bench]
fn parse_and_strip_counts() -> usize {
    SEQUENCES
        .iter()
        .map(|s| KeySeq::parse(divan::black_box(s)).bare().len())
        .sum()
}

// ============================================================================
// Interactive feeding
// ============================================================================

#[divan::bench(args = [10, 100, 1_000])]
fn feed_typed_sequences(bencher: divan::Bencher, rounds: usize) {
    bencher.with_inputs(engine).bench_local_values(|mut engine| {
        let mut host = CountingHost::default();
        for _ in 0..rounds {
            for s in SEQUENCES {
                engine.feed_keys(&mut host, s);
            }
        }
        divan::black_box(host.executed)
    });
}

#[divan::bench]
fn keymap_build() -> Keymap {
    Keymap::with_builtins()
}

// ============================================================================
// Replay
// ============================================================================

#[divan::bench(args = [10, 100, 1_000])]
fn replay_notation(bencher: divan::Bencher, rounds: usize) {
    bencher.with_inputs(engine).bench_local_values(|mut engine| {
        let mut host = CountingHost::default();
        for _ in 0..rounds {
            for s in SEQUENCES {
                engine.process_notation(&mut host, s, None, true);
            }
        }
        divan::black_box(host.executed)
    });
}

#[divan::bench(args = [10, 100])]
fn dot_repeat(bencher: divan::Bencher, count: usize) {
    bencher
        .with_inputs(|| {
            let mut engine = engine();
            let mut host = CountingHost::default();
            engine.feed_keys(&mut host, "cwnew<esc>");
            engine
        })
        .bench_local_values(|mut engine| {
            let mut host = CountingHost::default();
            for _ in 0..count {
                engine.feed_keys(&mut host, ".");
            }
            divan::black_box(host.executed)
        });
}
