//! Key notation tokenizer
//!
//! Splits a flat key string such as `"3d<C-w>w"` into [`KeyToken`]s.
//!
//! ```text
//! notation  = ( bracketed | char )*
//! bracketed = "<" modifier* name ">"
//! modifier  = ("C" | "S" | "A" | "M" | "D") "-"      (case-insensitive)
//! name      = named-key | fn-key | char
//! ```
//!
//! Bracket names are case-normalized (`<ESC>`, `<Esc>` and `<esc>` are the
//! same key). A `<` that does not open a recognized bracket is the literal
//! `<` key, so malformed input never aborts tokenization.

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::types::{KeyCode, KeyToken, Modifiers};

/// Longest bracket body we try to interpret, e.g. `C-S-A-pagedown`
const MAX_BRACKET_LEN: usize = 16;

/// Iterator over the key tokens of a notation string
///
/// Cloning the iterator restarts tokenization from the clone point.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    pub fn new(notation: &'a str) -> Self {
        Self { rest: notation }
    }

    /// Try to read `<...>` at the start of `rest`; returns the token and the
    /// number of bytes consumed
    fn bracketed(&self) -> Option<(KeyToken, usize)> {
        let body_and_more = self.rest.strip_prefix('<')?;
        let close = body_and_more.find('>')?;
        if let Some(token) = parse_bounded(&body_and_more[..close]) {
            return Some((token, close + 2));
        }

        // `<C->>`: the first `>` is the key itself
        let next = body_and_more[close + 1..].find('>')?;
        let close = close + 1 + next;
        parse_bounded(&body_and_more[..close]).map(|token| (token, close + 2))
    }
}

impl Iterator for Tokens<'_> {
    type Item = KeyToken;

    fn next(&mut self) -> Option<KeyToken> {
        let ch = self.rest.chars().next()?;
        if ch == '<' {
            if let Some((token, consumed)) = self.bracketed() {
                self.rest = &self.rest[consumed..];
                return Some(token);
            }
        }
        self.rest = &self.rest[ch.len_utf8()..];
        Some(KeyToken::char(ch))
    }
}

impl FusedIterator for Tokens<'_> {}

/// Tokenize a notation string
pub fn tokenize(notation: &str) -> Tokens<'_> {
    Tokens::new(notation)
}

fn parse_bounded(body: &str) -> Option<KeyToken> {
    if body.is_empty() || body.len() > MAX_BRACKET_LEN {
        return None;
    }
    parse_bracket_body(body)
}

/// Parse `C-w`, `esc`, `S-tab`, `f12`... (the part between the brackets)
fn parse_bracket_body(body: &str) -> Option<KeyToken> {
    let mut mods = Modifiers::NONE;
    let mut name = body;

    loop {
        let mut chars = name.chars();
        let (Some(m), Some('-')) = (chars.next(), chars.next()) else {
            break;
        };
        if chars.as_str().is_empty() {
            break;
        }
        let modifier = match m.to_ascii_lowercase() {
            'c' => Modifiers::CTRL,
            's' => Modifiers::SHIFT,
            'a' | 'm' => Modifiers::ALT,
            'd' => Modifiers::META,
            _ => break,
        };
        mods = mods | modifier;
        name = chars.as_str();
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        // A bare single character only makes sense with modifiers
        if mods.is_empty() {
            return None;
        }
        return Some(normalize_char(c, mods));
    }

    let key = parse_key_name(&name.to_ascii_lowercase())?;
    match key {
        KeyCode::Char(c) => Some(normalize_char(c, mods)),
        key => Some(KeyToken::new(key, mods)),
    }
}

/// Fold SHIFT into the character when it is the only modifier, lowercase
/// chords otherwise
fn normalize_char(c: char, mods: Modifiers) -> KeyToken {
    if mods == Modifiers::SHIFT && c.is_alphabetic() {
        let upper = c.to_uppercase().next().unwrap_or(c);
        return KeyToken::char(upper);
    }
    if mods.is_empty() {
        return KeyToken::char(c);
    }
    KeyToken::new(KeyCode::Char(c.to_ascii_lowercase()), mods)
}

/// Named keys recognized inside brackets (already lowercased)
fn parse_key_name(name: &str) -> Option<KeyCode> {
    let key = match name {
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "bar" => KeyCode::Char('|'),
        "bslash" => KeyCode::Char('\\'),
        "esc" | "escape" => KeyCode::Escape,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "bs" | "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "insert" => KeyCode::Insert,
        _ => {
            let n: u8 = name.strip_prefix('f')?.parse().ok()?;
            if !(1..=24).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
    };
    Some(key)
}

/// Replace every `<leader>` (any case) with the configured leader notation
pub fn expand_leader(notation: &str, leader: &str) -> String {
    const NEEDLE: &str = "<leader>";
    let lower = notation.to_ascii_lowercase();
    let mut out = String::with_capacity(notation.len());
    let mut last = 0;
    for (idx, _) in lower.match_indices(NEEDLE) {
        out.push_str(&notation[last..idx]);
        out.push_str(leader);
        last = idx + NEEDLE.len();
    }
    out.push_str(&notation[last..]);
    out
}

/// An ordered sequence of key tokens
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeySeq(Vec<KeyToken>);

impl KeySeq {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Tokenize a notation string into a sequence
    pub fn parse(notation: &str) -> Self {
        Self(tokenize(notation).collect())
    }

    pub fn push(&mut self, token: KeyToken) {
        self.0.push(token);
    }

    pub fn extend_from(&mut self, other: &KeySeq) {
        self.0.extend_from_slice(&other.0);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> &[KeyToken] {
        &self.0
    }

    pub fn first(&self) -> Option<&KeyToken> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&KeyToken> {
        self.0.last()
    }

    pub fn starts_with(&self, prefix: &KeySeq) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// True when `self` is a prefix of `other` and shorter than it
    pub fn is_strict_prefix_of(&self, other: &KeySeq) -> bool {
        self.len() < other.len() && other.starts_with(self)
    }

    /// Sub-sequence of tokens in `range`
    pub fn slice(&self, range: std::ops::Range<usize>) -> KeySeq {
        KeySeq(self.0[range].to_vec())
    }

    /// All strict prefixes, shortest first
    pub fn prefixes(&self) -> impl Iterator<Item = KeySeq> + '_ {
        (1..self.len()).map(move |n| self.slice(0..n))
    }

    /// The sequence with register selection and counts removed
    ///
    /// `"a2dd` and `d2d` both become `dd`. A lone `0` is the line-start
    /// motion and is kept.
    pub fn bare(&self) -> KeySeq {
        if self.0.len() == 1 && self.0[0].as_char() == Some('0') {
            return self.clone();
        }

        let mut rest = self.0.as_slice();
        let strip_register = |rest: &mut &[KeyToken]| {
            if rest.len() >= 2 && rest[0].as_char() == Some('"') {
                *rest = &rest[2..];
            }
        };
        let strip_count = |rest: &mut &[KeyToken]| {
            if rest.first().and_then(KeyToken::as_digit).is_some_and(|d| d != 0) {
                let digits = rest.iter().take_while(|t| t.as_digit().is_some()).count();
                *rest = &rest[digits..];
            }
        };

        strip_register(&mut rest);
        strip_count(&mut rest);
        strip_register(&mut rest);
        strip_count(&mut rest);

        KeySeq(
            rest.iter()
                .filter(|t| t.as_digit().is_none())
                .copied()
                .collect(),
        )
    }
}

impl fmt::Display for KeySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl FromStr for KeySeq {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for KeySeq {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<Vec<KeyToken>> for KeySeq {
    fn from(tokens: Vec<KeyToken>) -> Self {
        Self(tokens)
    }
}

impl FromIterator<KeyToken> for KeySeq {
    fn from_iter<I: IntoIterator<Item = KeyToken>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a KeySeq {
    type Item = &'a KeyToken;
    type IntoIter = std::slice::Iter<'a, KeyToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for KeySeq {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
