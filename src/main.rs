//! vimkeys - replay Vim key sequences and print what they resolve to

mod cli;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;

use vimkeys::keymap::{load_default_mappings, load_mappings_file, merge_mappings, tokenize, Keymap};
use vimkeys::{Engine, EngineConfig, FeedOptions, HostEvent, KeyOutcome, Recorder, ReplayOutcome};

use cli::{CliArgs, FeedMode, InputSource, OutputFormat, RunConfig};

fn main() -> Result<()> {
    vimkeys::tracing::init();

    let config = CliArgs::parse()
        .into_config()
        .map_err(anyhow::Error::msg)?;
    let engine_config = EngineConfig::load();
    let keymap = build_keymap(&config, &engine_config)?;

    let mut engine = Engine::with_config(keymap.shared(), &engine_config);
    let mut host = Recorder::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &config.input {
        InputSource::Args(keys) => {
            for notation in keys {
                run(&mut engine, &mut host, &config, notation, &mut out)?;
            }
        }
        InputSource::Stdin => {
            for line in io::stdin().lock().lines() {
                let line = line.context("Failed to read stdin")?;
                let notation = line.trim_end_matches('\r');
                if notation.is_empty() {
                    continue;
                }
                run(&mut engine, &mut host, &config, notation, &mut out)?;
            }
        }
    }

    if config.output == OutputFormat::Text {
        writeln!(out, "mode     {}", engine.mode())?;
    }
    Ok(())
}

/// Built-ins plus the mapping layers, with `--mappings` on top
fn build_keymap(config: &RunConfig, engine_config: &EngineConfig) -> Result<Keymap> {
    let mut mappings = load_default_mappings(&engine_config.leader);

    if let Some(path) = &config.extra_mappings {
        let extra = load_mappings_file(path, &engine_config.leader)
            .with_context(|| format!("Failed to load mappings from {}", path.display()))?;
        mappings = merge_mappings(mappings, extra);
    }

    let mut keymap = Keymap::with_builtins();
    for mapping in mappings {
        keymap.add_user_mapping(mapping);
    }
    Ok(keymap)
}

fn run(
    engine: &mut Engine,
    host: &mut Recorder,
    config: &RunConfig,
    notation: &str,
    out: &mut impl Write,
) -> Result<()> {
    if config.output == OutputFormat::Text {
        writeln!(out, "> {}", notation)?;
    }

    match config.feed_mode {
        FeedMode::Replay => {
            let outcome =
                engine.process_notation(host, notation, None, config.check_user_mappings);
            print_events(out, host.drain(), config.output)?;
            print_replay_outcome(out, notation, &outcome, config.output)?;
        }
        FeedMode::Interactive => {
            let options = FeedOptions {
                check_user_mappings: config.check_user_mappings,
                ..FeedOptions::default()
            };
            for key in tokenize(notation) {
                let outcome = engine.feed_with(host, key, options);
                print_events(out, host.drain(), config.output)?;
                if let KeyOutcome::Failed(e) = outcome {
                    print_error(out, &key.to_string(), &e.to_string(), config.output)?;
                }
            }
        }
    }
    Ok(())
}

fn print_events(out: &mut impl Write, events: Vec<HostEvent>, format: OutputFormat) -> Result<()> {
    for event in events {
        match format {
            OutputFormat::Text => writeln!(out, "{}", event)?,
            OutputFormat::Json => {
                let line = serde_json::to_string(&event).context("Failed to serialize event")?;
                writeln!(out, "{}", line)?;
            }
        }
    }
    Ok(())
}

fn print_replay_outcome(
    out: &mut impl Write,
    notation: &str,
    outcome: &ReplayOutcome,
    format: OutputFormat,
) -> Result<()> {
    match outcome {
        ReplayOutcome::Completed => Ok(()),
        ReplayOutcome::Suspended(continuation) => {
            match format {
                OutputFormat::Text => writeln!(
                    out,
                    "waiting  for {:?} input (seed {:?})",
                    continuation.target, continuation.seed
                )?,
                OutputFormat::Json => {
                    let line = serde_json::json!({
                        "event": "suspended",
                        "keys": notation,
                        "target": continuation.target,
                        "prompt": continuation.prompt,
                        "seed": continuation.seed,
                    });
                    writeln!(out, "{}", line)?;
                }
            }
            Ok(())
        }
        ReplayOutcome::Aborted(e) => print_error(out, notation, &e.to_string(), format),
    }
}

fn print_error(out: &mut impl Write, keys: &str, error: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "error    {}", error)?,
        OutputFormat::Json => {
            let line = serde_json::json!({ "event": "error", "keys": keys, "error": error });
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}
