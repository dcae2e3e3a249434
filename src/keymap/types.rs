//! Core types for the keymap system: Mode, KeyToken, Modifiers, KeyCode

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Editing mode of a session. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Normal,
    Insert,
    Replace,
    Visual,
    VisualLine,
    VisualBlock,
    Select,
    OperatorPending,
    /// Synthetic mode used to apply a normal-mode operation over a motion range
    InternalNormal,
}

impl Mode {
    pub const ALL: [Mode; 9] = [
        Mode::Normal,
        Mode::Insert,
        Mode::Replace,
        Mode::Visual,
        Mode::VisualLine,
        Mode::VisualBlock,
        Mode::Select,
        Mode::OperatorPending,
        Mode::InternalNormal,
    ];

    /// Visual, VisualLine or VisualBlock
    pub const fn is_visual(self) -> bool {
        matches!(self, Mode::Visual | Mode::VisualLine | Mode::VisualBlock)
    }

    /// Modes where unmapped keys become buffer text
    pub const fn is_insert_like(self) -> bool {
        matches!(self, Mode::Insert | Mode::Replace)
    }

    /// Name shown in the status bar
    pub fn display_name(self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
            Mode::Replace => "REPLACE",
            Mode::Visual => "VISUAL",
            Mode::VisualLine => "VISUAL LINE",
            Mode::VisualBlock => "VISUAL BLOCK",
            Mode::Select => "SELECT",
            Mode::OperatorPending => "OPERATOR PENDING",
            Mode::InternalNormal => "INTERNAL NORMAL",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Mode::Normal),
            "insert" => Ok(Mode::Insert),
            "replace" => Ok(Mode::Replace),
            "visual" => Ok(Mode::Visual),
            "visual_line" | "visualline" => Ok(Mode::VisualLine),
            "visual_block" | "visualblock" => Ok(Mode::VisualBlock),
            "select" => Ok(Mode::Select),
            "operator_pending" | "operatorpending" => Ok(Mode::OperatorPending),
            "internal_normal" | "internalnormal" => Ok(Mode::InternalNormal),
            _ => Err(()),
        }
    }
}

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win on Windows

    /// Check if ctrl is held
    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    /// Check if shift is held
    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    /// Check if alt/option is held
    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    /// Check if meta (cmd/win) is held
    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    /// Check if no modifiers are held
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Check if this contains all modifiers in other
    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// A key code: a literal character or a named special key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    /// A literal character, case preserved (`a` and `A` are different keys)
    Char(char),

    // Named keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,

    // Arrow keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,
    Insert,

    // Function keys
    F(u8), // F1-F24
}

impl KeyCode {
    /// Notation name used inside `<...>`, or None for plain characters
    pub fn notation_name(self) -> Option<&'static str> {
        let name = match self {
            KeyCode::Char(' ') => "space",
            KeyCode::Char('<') => "lt",
            KeyCode::Char(_) => return None,
            KeyCode::Escape => "esc",
            KeyCode::Enter => "cr",
            KeyCode::Tab => "tab",
            KeyCode::Backspace => "bs",
            KeyCode::Delete => "del",
            KeyCode::Up => "up",
            KeyCode::Down => "down",
            KeyCode::Left => "left",
            KeyCode::Right => "right",
            KeyCode::Home => "home",
            KeyCode::End => "end",
            KeyCode::PageUp => "pageup",
            KeyCode::PageDown => "pagedown",
            KeyCode::Insert => "insert",
            KeyCode::F(_) => "f",
        };
        Some(name)
    }
}

/// A single abstract key: a key code plus modifiers
///
/// Plain characters never carry SHIFT; the case of the character already
/// encodes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyToken {
    pub key: KeyCode,
    pub mods: Modifiers,
}

impl KeyToken {
    /// Create a new key token
    pub const fn new(key: KeyCode, mods: Modifiers) -> Self {
        Self { key, mods }
    }

    /// Create a key token with no modifiers
    pub const fn key(key: KeyCode) -> Self {
        Self {
            key,
            mods: Modifiers::NONE,
        }
    }

    /// Create a literal character token
    pub const fn char(c: char) -> Self {
        Self::key(KeyCode::Char(c))
    }

    /// Create a control chord, e.g. `<C-w>`
    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c.to_ascii_lowercase()), Modifiers::CTRL)
    }

    /// The unmodified character, if this is a plain character key
    pub fn as_char(&self) -> Option<char> {
        match self.key {
            KeyCode::Char(c) if self.mods.is_empty() => Some(c),
            _ => None,
        }
    }

    /// Plain ASCII digit (count candidates)
    pub fn as_digit(&self) -> Option<u32> {
        self.as_char().and_then(|c| c.to_digit(10))
    }

    /// Escape or its control-chord alias `<C-[>`
    pub fn is_cancel(&self) -> bool {
        match (self.key, self.mods) {
            (KeyCode::Escape, mods) => mods.is_empty(),
            (KeyCode::Char('['), mods) => mods == Modifiers::CTRL,
            _ => false,
        }
    }

    /// Text this key produces when typed into a buffer
    pub fn translate(&self) -> Option<String> {
        if !self.mods.is_empty() {
            return None;
        }
        match self.key {
            KeyCode::Char(c) => Some(c.to_string()),
            KeyCode::Enter => Some("\n".to_string()),
            KeyCode::Tab => Some("\t".to_string()),
            _ => None,
        }
    }

    /// Display the key for the status bar, e.g. `Ctrl+W`
    pub fn display_string(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.ctrl() {
            parts.push("Ctrl+");
        }
        if self.mods.alt() {
            parts.push("Alt+");
        }
        if self.mods.shift() {
            parts.push("Shift+");
        }
        if self.mods.meta() {
            parts.push("Meta+");
        }
        let key_str = match self.key {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) if self.mods.is_empty() => c.to_string(),
            KeyCode::Char(c) => c.to_uppercase().to_string(),
            KeyCode::Escape => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::Insert => "Insert".to_string(),
            KeyCode::F(n) => format!("F{}", n),
        };
        format!("{}{}", parts.join(""), key_str)
    }
}

/// Canonical key notation, e.g. `w`, `<lt>`, `<esc>`, `<C-w>`, `<S-f5>`
impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.key {
            KeyCode::F(n) => Some(format!("f{}", n)),
            other => other.notation_name().map(str::to_string),
        };

        if self.mods.is_empty() {
            return match (self.key, name) {
                (_, Some(name)) => write!(f, "<{}>", name),
                (KeyCode::Char(c), None) => write!(f, "{}", c),
                (_, None) => Ok(()),
            };
        }

        f.write_str("<")?;
        if self.mods.ctrl() {
            f.write_str("C-")?;
        }
        if self.mods.shift() {
            f.write_str("S-")?;
        }
        if self.mods.alt() {
            f.write_str("A-")?;
        }
        if self.mods.meta() {
            f.write_str("D-")?;
        }
        match (self.key, name) {
            (_, Some(name)) => f.write_str(&name)?,
            (KeyCode::Char(c), None) => write!(f, "{}", c)?,
            (_, None) => {}
        }
        f.write_str(">")
    }
}
