//! Input collectors for commands that take extra keys (`f{char}`, `/text<cr>`)

use crate::cmdline::{CmdlineEvent, CmdlineSession, History};
use crate::keymap::{InputParser, KeyToken, PromptKind};

/// Which half of the pending command asked for input
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputTarget {
    Action,
    Motion,
}

/// Result of feeding one key to a collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// Keep collecting
    More,
    /// Key rejected but collection continues (typed text is kept)
    Blink,
    /// Input complete
    Done(String),
    /// Collection abandoned
    Cancelled,
}

/// Collector state for one pending input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCollector {
    Char,
    Line(CmdlineSession),
}

impl InputCollector {
    pub fn new(parser: InputParser) -> Self {
        match parser {
            InputParser::Char => InputCollector::Char,
            InputParser::Line(kind) => InputCollector::Line(CmdlineSession::new(kind)),
        }
    }

    /// Line collector seeded with already-typed text
    pub fn line_with_text(kind: PromptKind, text: &str) -> Self {
        InputCollector::Line(CmdlineSession::with_text(kind, text))
    }

    pub fn feed(&mut self, key: &KeyToken, history: &dyn History) -> Feed {
        match self {
            InputCollector::Char => Feed::Done(char_input(key)),
            InputCollector::Line(session) => match session.feed_key(key, history) {
                CmdlineEvent::Edited | CmdlineEvent::Ignored => Feed::More,
                CmdlineEvent::Blink => Feed::Blink,
                CmdlineEvent::Cancel => Feed::Cancelled,
                CmdlineEvent::Submit(text) => Feed::Done(text),
            },
        }
    }

    /// Prompt this collector is shown in, if any
    pub fn prompt(&self) -> Option<PromptKind> {
        match self {
            InputCollector::Char => None,
            InputCollector::Line(session) => Some(session.kind()),
        }
    }

    /// Input typed so far
    pub fn partial(&self) -> &str {
        match self {
            InputCollector::Char => "",
            InputCollector::Line(session) => session.text(),
        }
    }
}

/// Value of a single-key input: the text it types, or its notation
fn char_input(key: &KeyToken) -> String {
    key.translate().unwrap_or_else(|| key.to_string())
}
