//! Command-line editing and history recall for `:`, `/` and `?` prompts
//!
//! A [`CmdlineSession`] holds the text typed after the prompt character and
//! applies the command-line editing keys to it. History recall walks a
//! [`History`] store; the position of the walk is owned by the session and
//! cleared by [`CmdlineSession::invalidate`].

use std::collections::HashMap;

use crate::keymap::{KeyCode, KeyToken, PromptKind};

/// Default number of entries kept per history kind
pub const DEFAULT_HISTORY_SIZE: usize = 50;

/// Which history list a prompt reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryKind {
    Cmdline,
    Search,
}

impl From<PromptKind> for HistoryKind {
    fn from(kind: PromptKind) -> Self {
        match kind {
            PromptKind::Cmdline => HistoryKind::Cmdline,
            PromptKind::SearchForward | PromptKind::SearchBackward => HistoryKind::Search,
        }
    }
}

/// Ordinal history storage
///
/// Negative indices count back from the most recent entry (`-1` is the
/// newest), non-negative ones count from the oldest.
pub trait History {
    fn get(&self, kind: HistoryKind, index: isize) -> Option<String>;

    fn len(&self, kind: HistoryKind) -> usize;

    fn is_empty(&self, kind: HistoryKind) -> bool {
        self.len(kind) == 0
    }

    /// Record a committed line
    fn append(&mut self, kind: HistoryKind, item: &str);
}

/// In-memory history, one bounded list per kind
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    lists: HashMap<HistoryKind, Vec<String>>,
    capacity: usize,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lists: HashMap::new(),
            capacity: capacity.max(1),
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl History for MemoryHistory {
    fn get(&self, kind: HistoryKind, index: isize) -> Option<String> {
        let list = self.lists.get(&kind)?;
        let idx = if index < 0 {
            list.len().checked_sub(index.unsigned_abs())?
        } else {
            index.unsigned_abs()
        };
        list.get(idx).cloned()
    }

    fn len(&self, kind: HistoryKind) -> usize {
        self.lists.get(&kind).map_or(0, Vec::len)
    }

    fn append(&mut self, kind: HistoryKind, item: &str) {
        if item.is_empty() {
            return;
        }
        let list = self.lists.entry(kind).or_default();
        // Re-entering a line moves it to the newest slot
        list.retain(|existing| existing != item);
        list.push(item.to_string());
        if list.len() > self.capacity {
            let excess = list.len() - self.capacity;
            list.drain(..excess);
        }
    }
}

/// Result of feeding one key to a command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdlineEvent {
    /// Text or cursor changed
    Edited,
    /// Key had no effect here
    Ignored,
    /// Nothing to recall; the UI should blink
    Blink,
    /// Prompt dismissed without running
    Cancel,
    /// `<cr>` pressed; carries the text after the prompt character
    Submit(String),
}

/// Editable command-line text after a prompt character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdlineSession {
    kind: PromptKind,
    text: String,
    /// Cursor position in chars, `0..=text.chars().count()`
    cursor: usize,
    last_history_index: Option<isize>,
}

impl CmdlineSession {
    pub fn new(kind: PromptKind) -> Self {
        Self::with_text(kind, "")
    }

    /// Start with `text` already typed (cursor at the end)
    pub fn with_text(kind: PromptKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            cursor: text.chars().count(),
            last_history_index: None,
        }
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text as displayed, prompt character included
    pub fn display(&self) -> String {
        format!("{}{}", self.kind.firstc(), self.text)
    }

    /// Forget the history walk position
    pub fn invalidate(&mut self) {
        self.last_history_index = None;
    }

    /// Apply one key
    pub fn feed_key(&mut self, key: &KeyToken, history: &dyn History) -> CmdlineEvent {
        let ctrl = key.mods == crate::keymap::Modifiers::CTRL;
        match (key.key, ctrl) {
            (KeyCode::Up, false) | (KeyCode::Char('p'), true) => {
                return self.next_history(history, true);
            }
            (KeyCode::Down, false) | (KeyCode::Char('n'), true) => {
                return self.next_history(history, false);
            }
            (KeyCode::Char('c'), true) => {
                self.invalidate();
                return CmdlineEvent::Cancel;
            }
            (KeyCode::Enter, false) => {
                self.invalidate();
                return CmdlineEvent::Submit(self.text.clone());
            }
            _ => {}
        }

        if let Some(c) = key.as_char() {
            self.insert(c);
            return CmdlineEvent::Edited;
        }

        // The remaining keys edit existing text
        if self.text.is_empty() {
            return CmdlineEvent::Ignored;
        }

        match (key.key, ctrl) {
            (KeyCode::Char('b'), true) | (KeyCode::Home, false) => self.cursor = 0,
            (KeyCode::Char('e'), true) | (KeyCode::End, false) => self.cursor = self.len(),
            (KeyCode::Left, false) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, false) => self.cursor = (self.cursor + 1).min(self.len()),
            (KeyCode::Char('h'), true) | (KeyCode::Backspace, false) => {
                if self.cursor == 0 {
                    return CmdlineEvent::Ignored;
                }
                self.remove_range(self.cursor - 1, self.cursor);
            }
            (KeyCode::Char('u'), true) => self.remove_range(0, self.cursor),
            (KeyCode::Char('w'), true) => {
                let start = self.word_start_before_cursor();
                self.remove_range(start, self.cursor);
            }
            (KeyCode::Tab, false) => self.insert('\t'),
            _ => return CmdlineEvent::Ignored,
        }
        CmdlineEvent::Edited
    }

    /// Walk the history list: older when `backwards`, newer otherwise
    fn next_history(&mut self, history: &dyn History, backwards: bool) -> CmdlineEvent {
        let step = if backwards { -1 } else { 1 };
        let index = match self.last_history_index {
            None if backwards => -1,
            None => 0,
            Some(idx) => idx + step,
        };

        let kind = HistoryKind::from(self.kind);
        let count = history.len(kind) as isize;
        if count == 0 {
            self.last_history_index = None;
            return CmdlineEvent::Blink;
        }

        if index.abs() > count {
            self.last_history_index = Some(-count);
            return CmdlineEvent::Blink;
        }

        // Walked forward past the newest entry: back to an empty line
        if index >= 0 {
            self.last_history_index = Some(0);
            if self.text.is_empty() {
                return CmdlineEvent::Blink;
            }
            self.set_text("");
            return CmdlineEvent::Edited;
        }

        self.last_history_index = Some(index);
        let item = history.get(kind, index).unwrap_or_default();
        tracing::debug!("History recall {:?}[{}] = {:?}", kind, index, item);
        self.set_text(&item);
        CmdlineEvent::Edited
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(offset, _)| offset)
    }

    fn insert(&mut self, c: char) {
        let offset = self.byte_offset(self.cursor);
        self.text.insert(offset, c);
        self.cursor += 1;
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.len();
    }

    fn remove_range(&mut self, start: usize, end: usize) {
        let (start_byte, end_byte) = (self.byte_offset(start), self.byte_offset(end));
        self.text.replace_range(start_byte..end_byte, "");
        self.cursor = start;
    }

    /// Start of the word before the cursor, skipping trailing blanks
    fn word_start_before_cursor(&self) -> usize {
        let chars: Vec<char> = self.text.chars().take(self.cursor).collect();
        let mut idx = chars.len();
        while idx > 0 && chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        if idx > 0 && is_word(chars[idx - 1]) {
            while idx > 0 && is_word(chars[idx - 1]) {
                idx -= 1;
            }
        } else {
            while idx > 0 && !is_word(chars[idx - 1]) && !chars[idx - 1].is_whitespace() {
                idx -= 1;
            }
        }
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(notation: &str) -> KeyToken {
        crate::keymap::KeySeq::parse(notation).tokens()[0]
    }

    fn type_text(session: &mut CmdlineSession, text: &str, history: &dyn History) {
        for token in crate::keymap::tokenize(text) {
            session.feed_key(&token, history);
        }
    }

    fn history_with(items: &[&str]) -> MemoryHistory {
        let mut history = MemoryHistory::new();
        for item in items {
            history.append(HistoryKind::Cmdline, item);
        }
        history
    }

    // ========================================================================
    // History store
    // ========================================================================

    #[test]
    fn test_history_negative_index_is_most_recent() {
        let history = history_with(&["one", "two", "three"]);
        assert_eq!(history.get(HistoryKind::Cmdline, -1).as_deref(), Some("three"));
        assert_eq!(history.get(HistoryKind::Cmdline, -3).as_deref(), Some("one"));
        assert_eq!(history.get(HistoryKind::Cmdline, 0).as_deref(), Some("one"));
        assert_eq!(history.get(HistoryKind::Cmdline, -4), None);
        assert_eq!(history.get(HistoryKind::Search, -1), None);
    }

    #[test]
    fn test_history_dedup_and_capacity() {
        let mut history = MemoryHistory::with_capacity(2);
        history.append(HistoryKind::Search, "a");
        history.append(HistoryKind::Search, "b");
        history.append(HistoryKind::Search, "a");
        assert_eq!(history.len(HistoryKind::Search), 2);
        assert_eq!(history.get(HistoryKind::Search, -1).as_deref(), Some("a"));

        history.append(HistoryKind::Search, "c");
        assert_eq!(history.len(HistoryKind::Search), 2);
        assert_eq!(history.get(HistoryKind::Search, 0).as_deref(), Some("a"));
        history.append(HistoryKind::Search, "");
        assert_eq!(history.len(HistoryKind::Search), 2);
    }

    // ========================================================================
    // Recall
    // ========================================================================

    #[test]
    fn test_recall_walks_backwards_then_blinks() {
        let history = history_with(&["one", "two"]);
        let mut session = CmdlineSession::new(PromptKind::Cmdline);

        assert_eq!(session.feed_key(&key("<up>"), &history), CmdlineEvent::Edited);
        assert_eq!(session.text(), "two");
        assert_eq!(session.feed_key(&key("<C-p>"), &history), CmdlineEvent::Edited);
        assert_eq!(session.text(), "one");
        assert_eq!(session.feed_key(&key("<up>"), &history), CmdlineEvent::Blink);
        assert_eq!(session.text(), "one");
    }

    #[test]
    fn test_recall_forward_past_newest_clears() {
        let history = history_with(&["one", "two"]);
        let mut session = CmdlineSession::new(PromptKind::Cmdline);

        session.feed_key(&key("<up>"), &history);
        session.feed_key(&key("<up>"), &history);
        assert_eq!(session.feed_key(&key("<down>"), &history), CmdlineEvent::Edited);
        assert_eq!(session.text(), "two");
        assert_eq!(session.feed_key(&key("<C-n>"), &history), CmdlineEvent::Edited);
        assert_eq!(session.text(), "");
        assert_eq!(session.feed_key(&key("<down>"), &history), CmdlineEvent::Blink);
    }

    #[test]
    fn test_recall_empty_history_blinks() {
        let history = MemoryHistory::new();
        let mut session = CmdlineSession::new(PromptKind::SearchForward);
        assert_eq!(session.feed_key(&key("<up>"), &history), CmdlineEvent::Blink);
    }

    #[test]
    fn test_invalidate_restarts_walk() {
        let history = history_with(&["one", "two"]);
        let mut session = CmdlineSession::new(PromptKind::Cmdline);
        session.feed_key(&key("<up>"), &history);
        session.feed_key(&key("<up>"), &history);
        session.invalidate();
        session.feed_key(&key("<up>"), &history);
        assert_eq!(session.text(), "two");
    }

    #[test]
    fn test_search_prompts_share_history() {
        let mut history = MemoryHistory::new();
        history.append(HistoryKind::Search, "needle");
        let mut session = CmdlineSession::new(PromptKind::SearchBackward);
        session.feed_key(&key("<up>"), &history);
        assert_eq!(session.display(), "?needle");
    }

    // ========================================================================
    // Editing
    // ========================================================================

    #[test]
    fn test_typing_and_submit() {
        let history = MemoryHistory::new();
        let mut session = CmdlineSession::new(PromptKind::Cmdline);
        type_text(&mut session, "w foo", &history);
        assert_eq!(session.display(), ":w foo");
        assert_eq!(
            session.feed_key(&key("<cr>"), &history),
            CmdlineEvent::Submit("w foo".to_string())
        );
    }

    #[test]
    fn test_cursor_keys_and_backspace() {
        let history = MemoryHistory::new();
        let mut session = CmdlineSession::with_text(PromptKind::Cmdline, "abc");
        session.feed_key(&key("<C-b>"), &history);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.feed_key(&key("<C-h>"), &history), CmdlineEvent::Ignored);
        session.feed_key(&key("x"), &history);
        assert_eq!(session.text(), "xabc");
        session.feed_key(&key("<end>"), &history);
        session.feed_key(&key("<bs>"), &history);
        assert_eq!(session.text(), "xab");
    }

    #[test]
    fn test_delete_to_start_and_word() {
        let history = MemoryHistory::new();
        let mut session = CmdlineSession::with_text(PromptKind::Cmdline, "s/foo bar  ");
        session.feed_key(&key("<C-w>"), &history);
        assert_eq!(session.text(), "s/foo ");
        session.feed_key(&key("<C-w>"), &history);
        assert_eq!(session.text(), "s/");
        session.feed_key(&key("<C-w>"), &history);
        assert_eq!(session.text(), "s");
        session.feed_key(&key("<C-u>"), &history);
        assert_eq!(session.text(), "");
    }

    #[test]
    fn test_editing_keys_ignored_on_empty_line() {
        let history = MemoryHistory::new();
        let mut session = CmdlineSession::new(PromptKind::Cmdline);
        assert_eq!(session.feed_key(&key("<C-u>"), &history), CmdlineEvent::Ignored);
        assert_eq!(session.feed_key(&key("<home>"), &history), CmdlineEvent::Ignored);
        assert_eq!(session.feed_key(&key("<C-c>"), &history), CmdlineEvent::Cancel);
    }

    #[test]
    fn test_multibyte_editing() {
        let history = MemoryHistory::new();
        let mut session = CmdlineSession::with_text(PromptKind::SearchForward, "héllo");
        session.feed_key(&key("<left>"), &history);
        session.feed_key(&key("<bs>"), &history);
        assert_eq!(session.text(), "hélo");
        assert_eq!(session.cursor(), 3);
    }
}
