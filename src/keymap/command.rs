//! Command descriptors: what a fully resolved key sequence means
//!
//! The built-in table maps key sequences to [`CommandDef`]s. A definition
//! says which action or motion runs, whether it needs a following motion,
//! whether it collects extra input (the char after `f`, the text after `/`)
//! and how the mode changes once it has run.

use serde::Serialize;

use super::binding::UserMapping;
use super::types::Mode;

/// Buffer-changing or mode-changing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    // ========================================================================
    // Operators (take a motion in Normal mode, the selection in Visual)
    // ========================================================================
    Delete,
    Change,
    Yank,
    Indent,
    Unindent,
    Reindent,
    SwapCase,
    Lowercase,
    Uppercase,
    Format,
    Rot13,

    // ========================================================================
    // Linewise forms of operators (dd, cc, yy, >>...)
    // ========================================================================
    DeleteLine,
    ChangeLine,
    YankLine,
    IndentLine,
    UnindentLine,
    ReindentLine,
    SwapCaseLine,
    LowercaseLine,
    UppercaseLine,
    FormatLine,
    Rot13Line,

    // ========================================================================
    // Editing
    // ========================================================================
    DeleteChar,
    DeleteCharBefore,
    DeleteToEol,
    ChangeToEol,
    Substitute,
    ReplaceChar,
    ToggleCaseChar,
    PutAfter,
    PutBefore,
    JoinLines,
    JoinLinesNoSpace,
    Increment,
    Decrement,

    // ========================================================================
    // Entering insert/replace
    // ========================================================================
    InsertBefore,
    InsertAtLineStart,
    Append,
    AppendAtEol,
    OpenBelow,
    OpenAbove,
    InsertAtLastInsert,
    EnterReplace,

    // ========================================================================
    // History
    // ========================================================================
    Undo,
    Redo,
    RepeatLastChange,

    // ========================================================================
    // Visual / select
    // ========================================================================
    ToggleVisual,
    ToggleVisualLine,
    ToggleVisualBlock,
    ToggleSelect,
    Reselect,
    EnterSelect,
    SwapSelectionEnds,

    // ========================================================================
    // Misc normal mode
    // ========================================================================
    SetMark,
    Cmdline,
    ScrollCursorCenter,
    ScrollCursorTop,
    ScrollCursorBottom,
    WriteQuit,
    QuitDiscard,
    WindowFocusLeft,
    WindowFocusDown,
    WindowFocusUp,
    WindowFocusRight,
    WindowFocusNext,
    WindowSplitHorizontal,
    WindowSplitVertical,
    WindowClose,
    WindowOnly,

    // ========================================================================
    // Insert mode
    // ========================================================================
    Backspace,
    DeleteWordBefore,
    DeleteToLineStart,
    InsertIndent,
    InsertUnindent,
    InsertRegister,
}

/// Cursor-positioning commands (also used as operator ranges)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Motion {
    Left,
    Down,
    Up,
    Right,
    WordForward,
    BigWordForward,
    WordBackward,
    BigWordBackward,
    WordEnd,
    BigWordEnd,
    WordEndBackward,
    BigWordEndBackward,
    LineStart,
    FirstNonBlank,
    LineEnd,
    LastNonBlank,
    Column,
    DocumentStart,
    GotoLine,
    FindChar,
    TillChar,
    FindCharBackward,
    TillCharBackward,
    RepeatFind,
    RepeatFindReverse,
    MatchPair,
    ParagraphForward,
    ParagraphBackward,
    SentenceForward,
    SentenceBackward,
    ScreenTop,
    ScreenMiddle,
    ScreenBottom,
    SearchNext,
    SearchPrevious,
    SearchWordForward,
    SearchWordBackward,
    SearchForward,
    SearchBackward,
    NextLineStart,
    PreviousLineStart,
    CurrentLineStart,
    DisplayLineDown,
    DisplayLineUp,
    Mark,
    MarkLine,
    HalfPageDown,
    HalfPageUp,
    PageDown,
    PageUp,
    InnerObject,
    AroundObject,
}

/// Range kinds selected by `i{char}` / `a{char}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TextObjectKind {
    Word,
    BigWord,
    Sentence,
    Paragraph,
    Parens,
    Brackets,
    Braces,
    AngleBrackets,
    DoubleQuote,
    SingleQuote,
    Backtick,
    Tag,
}

impl TextObjectKind {
    /// Map the key typed after `i`/`a` to an object kind
    pub fn from_char(c: char) -> Option<Self> {
        let kind = match c {
            'w' => TextObjectKind::Word,
            'W' => TextObjectKind::BigWord,
            's' => TextObjectKind::Sentence,
            'p' => TextObjectKind::Paragraph,
            '(' | ')' | 'b' => TextObjectKind::Parens,
            '[' | ']' => TextObjectKind::Brackets,
            '{' | '}' | 'B' => TextObjectKind::Braces,
            '<' | '>' => TextObjectKind::AngleBrackets,
            '"' => TextObjectKind::DoubleQuote,
            '\'' => TextObjectKind::SingleQuote,
            '`' => TextObjectKind::Backtick,
            't' => TextObjectKind::Tag,
            _ => return None,
        };
        Some(kind)
    }
}

/// Which prompt a line-input command opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PromptKind {
    Cmdline,
    SearchForward,
    SearchBackward,
}

impl PromptKind {
    /// Leading character shown in the prompt
    pub const fn firstc(self) -> char {
        match self {
            PromptKind::Cmdline => ':',
            PromptKind::SearchForward => '/',
            PromptKind::SearchBackward => '?',
        }
    }
}

/// How a command collects its extra input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputParser {
    /// Exactly one key, e.g. the target of `f`
    Char,
    /// A line of text terminated by `<cr>`, e.g. `/pattern<cr>`
    Line(PromptKind),
}

/// Mode transition applied after an action has run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeEffect {
    /// Stay in the current mode
    Keep,
    /// Back to Normal
    Normal,
    /// Switch to the given mode
    Enter(Mode),
    /// Enter the given visual kind, or leave it if already there
    ToggleVisual(Mode),
}

impl ModeEffect {
    pub fn apply(self, current: Mode) -> Mode {
        match self {
            ModeEffect::Keep if current == Mode::OperatorPending => Mode::Normal,
            ModeEffect::Keep => current,
            ModeEffect::Normal => Mode::Normal,
            ModeEffect::Enter(mode) => mode,
            ModeEffect::ToggleVisual(kind) if current == kind => Mode::Normal,
            ModeEffect::ToggleVisual(kind) => kind,
        }
    }
}

/// Definition of an action (or operator, when `motion_required`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionDef {
    pub action: Action,
    pub motion_required: bool,
    pub input: Option<InputParser>,
    /// Whether running it updates the dot-repeat buffer
    pub repeatable: bool,
    pub then: ModeEffect,
}

impl ActionDef {
    /// A buffer edit: repeatable, back to Normal afterwards
    pub const fn edit(action: Action) -> Self {
        Self {
            action,
            motion_required: false,
            input: None,
            repeatable: true,
            then: ModeEffect::Normal,
        }
    }

    /// An operator that waits for a motion
    pub const fn operator(action: Action) -> Self {
        Self {
            action,
            motion_required: true,
            input: None,
            repeatable: true,
            then: ModeEffect::Normal,
        }
    }

    /// A non-editing command: not repeatable
    pub const fn command(action: Action) -> Self {
        Self {
            action,
            motion_required: false,
            input: None,
            repeatable: false,
            then: ModeEffect::Normal,
        }
    }

    pub const fn then(mut self, effect: ModeEffect) -> Self {
        self.then = effect;
        self
    }

    pub const fn with_input(mut self, parser: InputParser) -> Self {
        self.input = Some(parser);
        self
    }

    pub const fn accepts_input(&self) -> bool {
        self.input.is_some()
    }
}

/// Definition of a motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionDef {
    pub motion: Motion,
    pub input: Option<InputParser>,
    pub inclusive: bool,
    pub linewise: bool,
}

impl MotionDef {
    pub const fn new(motion: Motion) -> Self {
        Self {
            motion,
            input: None,
            inclusive: false,
            linewise: false,
        }
    }

    pub const fn inclusive(mut self) -> Self {
        self.inclusive = true;
        self
    }

    pub const fn linewise(mut self) -> Self {
        self.linewise = true;
        self
    }

    pub const fn with_input(mut self, parser: InputParser) -> Self {
        self.input = Some(parser);
        self
    }

    pub const fn accepts_input(&self) -> bool {
        self.input.is_some()
    }
}

/// Result of resolving a key sequence in a mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandDef {
    Action(ActionDef),
    Motion(MotionDef),
    Operator(ActionDef),
    /// Nothing is bound to this exact sequence
    Missing,
    /// The register-selection key (`"`)
    OpenRegister,
    /// A strict prefix of longer bindings (`g`, `z`, a leader key)
    OpenNamespace,
    UserMapping(UserMapping),
}

impl CommandDef {
    /// Action, Operator or Motion
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            CommandDef::Action(_) | CommandDef::Operator(_) | CommandDef::Motion(_)
        )
    }

    /// The action definition of an Action or Operator
    pub fn as_action(&self) -> Option<&ActionDef> {
        match self {
            CommandDef::Action(def) | CommandDef::Operator(def) => Some(def),
            _ => None,
        }
    }
}

impl From<ActionDef> for CommandDef {
    fn from(def: ActionDef) -> Self {
        if def.motion_required {
            CommandDef::Operator(def)
        } else {
            CommandDef::Action(def)
        }
    }
}

impl From<MotionDef> for CommandDef {
    fn from(def: MotionDef) -> Self {
        CommandDef::Motion(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_effect_toggle() {
        let v = ModeEffect::ToggleVisual(Mode::Visual);
        assert_eq!(v.apply(Mode::Normal), Mode::Visual);
        assert_eq!(v.apply(Mode::Visual), Mode::Normal);
        assert_eq!(v.apply(Mode::VisualLine), Mode::Visual);
    }

    #[test]
    fn test_mode_effect_keep_leaves_operator_pending() {
        assert_eq!(ModeEffect::Keep.apply(Mode::Visual), Mode::Visual);
        assert_eq!(ModeEffect::Keep.apply(Mode::OperatorPending), Mode::Normal);
    }

    #[test]
    fn test_operator_converts_to_operator_variant() {
        let def: CommandDef = ActionDef::operator(Action::Delete).into();
        assert!(matches!(def, CommandDef::Operator(_)));
        let def: CommandDef = ActionDef::edit(Action::DeleteChar).into();
        assert!(matches!(def, CommandDef::Action(_)));
    }

    #[test]
    fn test_text_object_from_char() {
        assert_eq!(TextObjectKind::from_char('w'), Some(TextObjectKind::Word));
        assert_eq!(TextObjectKind::from_char('b'), Some(TextObjectKind::Parens));
        assert_eq!(TextObjectKind::from_char('B'), Some(TextObjectKind::Braces));
        assert_eq!(TextObjectKind::from_char('z'), None);
    }
}
