//! Built-in key bindings
//!
//! The default Vim command table, installed into every [`Keymap`] created
//! with [`Keymap::with_builtins`]. User mappings are layered on top and are
//! loaded separately (see [`load_default_mappings`]).

use std::path::PathBuf;

use super::binding::UserMapping;
use super::command::{
    Action, ActionDef, CommandDef, InputParser, ModeEffect, Motion, MotionDef, PromptKind,
};
use super::config::load_mappings_file;
use super::keymap::Keymap;
use super::types::Mode;

const NORMAL: &[Mode] = &[Mode::Normal];
const VISUAL: &[Mode] = &[Mode::Visual, Mode::VisualLine, Mode::VisualBlock];
const NORMAL_VISUAL: &[Mode] = &[
    Mode::Normal,
    Mode::Visual,
    Mode::VisualLine,
    Mode::VisualBlock,
];
/// Modes where plain motions apply
const MOTION_MODES: &[Mode] = &[
    Mode::Normal,
    Mode::OperatorPending,
    Mode::Visual,
    Mode::VisualLine,
    Mode::VisualBlock,
];
/// Modes where text objects apply
const OBJECT_MODES: &[Mode] = &[
    Mode::OperatorPending,
    Mode::Visual,
    Mode::VisualLine,
    Mode::VisualBlock,
];
const INSERT_LIKE: &[Mode] = &[Mode::Insert, Mode::Replace];

const CHAR: InputParser = InputParser::Char;

/// Populate `keymap` with the built-in table
pub fn install_builtins(keymap: &mut Keymap) {
    install_motions(keymap);
    install_operators(keymap);
    install_normal_actions(keymap);
    install_visual_actions(keymap);
    install_select_actions(keymap);
    install_insert_actions(keymap);

    keymap.bind_all(NORMAL_VISUAL, "\"", CommandDef::OpenRegister);

    tracing::debug!("Installed {} built-in bindings", keymap.builtin_count());
}

fn install_motions(keymap: &mut Keymap) {
    let motions: &[(&str, MotionDef)] = &[
        ("h", MotionDef::new(Motion::Left)),
        ("<left>", MotionDef::new(Motion::Left)),
        ("<bs>", MotionDef::new(Motion::Left)),
        ("j", MotionDef::new(Motion::Down).linewise()),
        ("<down>", MotionDef::new(Motion::Down).linewise()),
        ("k", MotionDef::new(Motion::Up).linewise()),
        ("<up>", MotionDef::new(Motion::Up).linewise()),
        ("l", MotionDef::new(Motion::Right)),
        ("<right>", MotionDef::new(Motion::Right)),
        ("<space>", MotionDef::new(Motion::Right)),
        ("w", MotionDef::new(Motion::WordForward)),
        ("W", MotionDef::new(Motion::BigWordForward)),
        ("b", MotionDef::new(Motion::WordBackward)),
        ("B", MotionDef::new(Motion::BigWordBackward)),
        ("e", MotionDef::new(Motion::WordEnd).inclusive()),
        ("E", MotionDef::new(Motion::BigWordEnd).inclusive()),
        ("ge", MotionDef::new(Motion::WordEndBackward).inclusive()),
        ("gE", MotionDef::new(Motion::BigWordEndBackward).inclusive()),
        ("0", MotionDef::new(Motion::LineStart)),
        ("<home>", MotionDef::new(Motion::LineStart)),
        ("^", MotionDef::new(Motion::FirstNonBlank)),
        ("$", MotionDef::new(Motion::LineEnd).inclusive()),
        ("<end>", MotionDef::new(Motion::LineEnd).inclusive()),
        ("|", MotionDef::new(Motion::Column)),
        ("g_", MotionDef::new(Motion::LastNonBlank).inclusive()),
        ("gg", MotionDef::new(Motion::DocumentStart).linewise()),
        ("G", MotionDef::new(Motion::GotoLine).linewise()),
        ("f", MotionDef::new(Motion::FindChar).inclusive().with_input(CHAR)),
        ("t", MotionDef::new(Motion::TillChar).inclusive().with_input(CHAR)),
        ("F", MotionDef::new(Motion::FindCharBackward).with_input(CHAR)),
        ("T", MotionDef::new(Motion::TillCharBackward).with_input(CHAR)),
        (";", MotionDef::new(Motion::RepeatFind).inclusive()),
        (",", MotionDef::new(Motion::RepeatFindReverse)),
        ("%", MotionDef::new(Motion::MatchPair).inclusive()),
        ("}", MotionDef::new(Motion::ParagraphForward)),
        ("{", MotionDef::new(Motion::ParagraphBackward)),
        (")", MotionDef::new(Motion::SentenceForward)),
        ("(", MotionDef::new(Motion::SentenceBackward)),
        ("H", MotionDef::new(Motion::ScreenTop).linewise()),
        ("M", MotionDef::new(Motion::ScreenMiddle).linewise()),
        ("L", MotionDef::new(Motion::ScreenBottom).linewise()),
        ("n", MotionDef::new(Motion::SearchNext)),
        ("N", MotionDef::new(Motion::SearchPrevious)),
        ("*", MotionDef::new(Motion::SearchWordForward)),
        ("#", MotionDef::new(Motion::SearchWordBackward)),
        (
            "/",
            MotionDef::new(Motion::SearchForward)
                .with_input(InputParser::Line(PromptKind::SearchForward)),
        ),
        (
            "?",
            MotionDef::new(Motion::SearchBackward)
                .with_input(InputParser::Line(PromptKind::SearchBackward)),
        ),
        ("+", MotionDef::new(Motion::NextLineStart).linewise()),
        ("<cr>", MotionDef::new(Motion::NextLineStart).linewise()),
        ("-", MotionDef::new(Motion::PreviousLineStart).linewise()),
        ("_", MotionDef::new(Motion::CurrentLineStart).linewise()),
        ("gj", MotionDef::new(Motion::DisplayLineDown).linewise()),
        ("gk", MotionDef::new(Motion::DisplayLineUp).linewise()),
        ("`", MotionDef::new(Motion::Mark).with_input(CHAR)),
        ("'", MotionDef::new(Motion::MarkLine).linewise().with_input(CHAR)),
    ];
    for (keys, def) in motions {
        keymap.bind_all(MOTION_MODES, keys, *def);
    }

    // Scrolling moves the cursor too but is not an operator range
    for (keys, motion) in [
        ("<C-d>", Motion::HalfPageDown),
        ("<C-u>", Motion::HalfPageUp),
        ("<C-f>", Motion::PageDown),
        ("<C-b>", Motion::PageUp),
    ] {
        keymap.bind_all(NORMAL_VISUAL, keys, MotionDef::new(motion).linewise());
    }

    keymap.bind_all(
        OBJECT_MODES,
        "i",
        MotionDef::new(Motion::InnerObject).with_input(CHAR),
    );
    keymap.bind_all(
        OBJECT_MODES,
        "a",
        MotionDef::new(Motion::AroundObject).with_input(CHAR),
    );
}

/// Operator keys paired with their linewise (doubled) forms
const OPERATORS: &[(&str, Action, &[&str], Action)] = &[
    ("d", Action::Delete, &["dd"], Action::DeleteLine),
    ("c", Action::Change, &["cc"], Action::ChangeLine),
    ("y", Action::Yank, &["yy"], Action::YankLine),
    (">", Action::Indent, &[">>"], Action::IndentLine),
    ("<lt>", Action::Unindent, &["<lt><lt>"], Action::UnindentLine),
    ("=", Action::Reindent, &["=="], Action::ReindentLine),
    ("g~", Action::SwapCase, &["g~~", "g~g~"], Action::SwapCaseLine),
    ("gu", Action::Lowercase, &["guu", "gugu"], Action::LowercaseLine),
    ("gU", Action::Uppercase, &["gUU", "gUgU"], Action::UppercaseLine),
    ("gq", Action::Format, &["gqq", "gqgq"], Action::FormatLine),
    ("g?", Action::Rot13, &["g??", "g?g?"], Action::Rot13Line),
];

fn install_operators(keymap: &mut Keymap) {
    for &(keys, action, doubled, line_action) in OPERATORS {
        let mut operator = ActionDef::operator(action);
        let mut line = ActionDef::edit(line_action);
        if action == Action::Change {
            operator = operator.then(ModeEffect::Enter(Mode::Insert));
            line = line.then(ModeEffect::Enter(Mode::Insert));
        }
        if action == Action::Yank {
            operator.repeatable = false;
            line.repeatable = false;
        }

        keymap.bind(Mode::Normal, keys, operator);
        for form in doubled {
            keymap.bind_compound(form, line);
        }

        // On a selection the operator applies immediately
        let mut on_selection = operator;
        on_selection.motion_required = false;
        keymap.bind_all(VISUAL, keys, on_selection);
    }
}

fn install_normal_actions(keymap: &mut Keymap) {
    let insert = ModeEffect::Enter(Mode::Insert);
    let actions: &[(&str, ActionDef)] = &[
        ("x", ActionDef::edit(Action::DeleteChar)),
        ("<del>", ActionDef::edit(Action::DeleteChar)),
        ("X", ActionDef::edit(Action::DeleteCharBefore)),
        ("D", ActionDef::edit(Action::DeleteToEol)),
        ("C", ActionDef::edit(Action::ChangeToEol).then(insert)),
        ("Y", ActionDef::command(Action::YankLine)),
        ("s", ActionDef::edit(Action::Substitute).then(insert)),
        ("S", ActionDef::edit(Action::ChangeLine).then(insert)),
        ("i", ActionDef::edit(Action::InsertBefore).then(insert)),
        ("<insert>", ActionDef::edit(Action::InsertBefore).then(insert)),
        ("I", ActionDef::edit(Action::InsertAtLineStart).then(insert)),
        ("a", ActionDef::edit(Action::Append).then(insert)),
        ("A", ActionDef::edit(Action::AppendAtEol).then(insert)),
        ("o", ActionDef::edit(Action::OpenBelow).then(insert)),
        ("O", ActionDef::edit(Action::OpenAbove).then(insert)),
        ("gi", ActionDef::edit(Action::InsertAtLastInsert).then(insert)),
        (
            "R",
            ActionDef::edit(Action::EnterReplace).then(ModeEffect::Enter(Mode::Replace)),
        ),
        ("r", ActionDef::edit(Action::ReplaceChar).with_input(CHAR)),
        ("~", ActionDef::edit(Action::ToggleCaseChar)),
        ("p", ActionDef::edit(Action::PutAfter)),
        ("P", ActionDef::edit(Action::PutBefore)),
        ("J", ActionDef::edit(Action::JoinLines)),
        ("gJ", ActionDef::edit(Action::JoinLinesNoSpace)),
        ("<C-a>", ActionDef::edit(Action::Increment)),
        ("<C-x>", ActionDef::edit(Action::Decrement)),
        ("u", ActionDef::command(Action::Undo)),
        ("<C-r>", ActionDef::command(Action::Redo)),
        (".", ActionDef::command(Action::RepeatLastChange)),
        (
            "v",
            ActionDef::command(Action::ToggleVisual).then(ModeEffect::ToggleVisual(Mode::Visual)),
        ),
        (
            "V",
            ActionDef::command(Action::ToggleVisualLine)
                .then(ModeEffect::ToggleVisual(Mode::VisualLine)),
        ),
        (
            "<C-v>",
            ActionDef::command(Action::ToggleVisualBlock)
                .then(ModeEffect::ToggleVisual(Mode::VisualBlock)),
        ),
        (
            "gv",
            ActionDef::command(Action::Reselect).then(ModeEffect::Enter(Mode::Visual)),
        ),
        (
            "gh",
            ActionDef::command(Action::EnterSelect).then(ModeEffect::Enter(Mode::Select)),
        ),
        ("m", ActionDef::command(Action::SetMark).with_input(CHAR)),
        (
            ":",
            ActionDef::command(Action::Cmdline).with_input(InputParser::Line(PromptKind::Cmdline)),
        ),
        ("zz", ActionDef::command(Action::ScrollCursorCenter)),
        ("zt", ActionDef::command(Action::ScrollCursorTop)),
        ("zb", ActionDef::command(Action::ScrollCursorBottom)),
        ("ZZ", ActionDef::command(Action::WriteQuit)),
        ("ZQ", ActionDef::command(Action::QuitDiscard)),
        ("<C-w>h", ActionDef::command(Action::WindowFocusLeft)),
        ("<C-w>j", ActionDef::command(Action::WindowFocusDown)),
        ("<C-w>k", ActionDef::command(Action::WindowFocusUp)),
        ("<C-w>l", ActionDef::command(Action::WindowFocusRight)),
        ("<C-w>w", ActionDef::command(Action::WindowFocusNext)),
        ("<C-w>s", ActionDef::command(Action::WindowSplitHorizontal)),
        ("<C-w>v", ActionDef::command(Action::WindowSplitVertical)),
        ("<C-w>q", ActionDef::command(Action::WindowClose)),
        ("<C-w>o", ActionDef::command(Action::WindowOnly)),
    ];
    for (keys, def) in actions {
        keymap.bind_all(NORMAL, keys, *def);
    }
}

fn install_visual_actions(keymap: &mut Keymap) {
    let insert = ModeEffect::Enter(Mode::Insert);
    let keep = ModeEffect::Keep;
    // d c y < > = g~ gu gU gq g? come from install_operators
    let actions: &[(&str, ActionDef)] = &[
        ("x", ActionDef::edit(Action::Delete)),
        ("<del>", ActionDef::edit(Action::Delete)),
        ("s", ActionDef::edit(Action::Change).then(insert)),
        ("~", ActionDef::edit(Action::SwapCase)),
        ("u", ActionDef::edit(Action::Lowercase)),
        ("U", ActionDef::edit(Action::Uppercase)),
        ("J", ActionDef::edit(Action::JoinLines)),
        ("gJ", ActionDef::edit(Action::JoinLinesNoSpace)),
        ("r", ActionDef::edit(Action::ReplaceChar).with_input(CHAR)),
        ("p", ActionDef::edit(Action::PutAfter)),
        ("P", ActionDef::edit(Action::PutBefore)),
        ("I", ActionDef::edit(Action::InsertAtLineStart).then(insert)),
        ("A", ActionDef::edit(Action::AppendAtEol).then(insert)),
        ("D", ActionDef::edit(Action::DeleteLine)),
        ("X", ActionDef::edit(Action::DeleteLine)),
        ("Y", ActionDef::command(Action::YankLine)),
        ("C", ActionDef::edit(Action::ChangeLine).then(insert)),
        ("S", ActionDef::edit(Action::ChangeLine).then(insert)),
        ("R", ActionDef::edit(Action::ChangeLine).then(insert)),
        ("o", ActionDef::command(Action::SwapSelectionEnds).then(keep)),
        ("O", ActionDef::command(Action::SwapSelectionEnds).then(keep)),
        (
            ":",
            ActionDef::command(Action::Cmdline).with_input(InputParser::Line(PromptKind::Cmdline)),
        ),
        (
            "v",
            ActionDef::command(Action::ToggleVisual).then(ModeEffect::ToggleVisual(Mode::Visual)),
        ),
        (
            "V",
            ActionDef::command(Action::ToggleVisualLine)
                .then(ModeEffect::ToggleVisual(Mode::VisualLine)),
        ),
        (
            "<C-v>",
            ActionDef::command(Action::ToggleVisualBlock)
                .then(ModeEffect::ToggleVisual(Mode::VisualBlock)),
        ),
        (
            "<C-g>",
            ActionDef::command(Action::ToggleSelect).then(ModeEffect::Enter(Mode::Select)),
        ),
    ];
    for (keys, def) in actions {
        keymap.bind_all(VISUAL, keys, *def);
    }
}

fn install_select_actions(keymap: &mut Keymap) {
    keymap.bind(
        Mode::Select,
        "<C-g>",
        ActionDef::command(Action::ToggleSelect).then(ModeEffect::Enter(Mode::Visual)),
    );
    keymap.bind(Mode::Select, "<bs>", ActionDef::edit(Action::Delete));
    keymap.bind(Mode::Select, "<del>", ActionDef::edit(Action::Delete));
    for (keys, motion) in [
        ("<left>", Motion::Left),
        ("<right>", Motion::Right),
        ("<up>", Motion::Up),
        ("<down>", Motion::Down),
    ] {
        keymap.bind(Mode::Select, keys, MotionDef::new(motion));
    }
}

fn install_insert_actions(keymap: &mut Keymap) {
    let stay = |action| ActionDef::command(action).then(ModeEffect::Keep);
    let actions: &[(&str, ActionDef)] = &[
        ("<bs>", stay(Action::Backspace)),
        ("<C-h>", stay(Action::Backspace)),
        ("<C-w>", stay(Action::DeleteWordBefore)),
        ("<C-u>", stay(Action::DeleteToLineStart)),
        ("<C-t>", stay(Action::InsertIndent)),
        ("<C-d>", stay(Action::InsertUnindent)),
        ("<C-r>", stay(Action::InsertRegister).with_input(CHAR)),
    ];
    for (keys, def) in actions {
        keymap.bind_all(INSERT_LIKE, keys, *def);
    }
}

/// Get the user's mappings file path
///
/// Returns `~/.config/vimkeys/mappings.yaml` on Unix
/// Returns `%APPDATA%\vimkeys\mappings.yaml` on Windows
pub fn get_user_mappings_path() -> Option<PathBuf> {
    crate::config_paths::mappings_file()
}

/// Load user mapping layers in order
///
/// Loading order (later layers override earlier ones for the same mode and
/// lhs):
/// 1. mappings.yaml in the current directory (project-local)
/// 2. User config at ~/.config/vimkeys/mappings.yaml
pub fn load_default_mappings(leader: &str) -> Vec<UserMapping> {
    let mut mappings = Vec::new();

    let local = crate::config_paths::project_mappings_file();
    if local.exists() {
        match load_mappings_file(&local, leader) {
            Ok(local_mappings) => {
                tracing::info!(
                    "Merging project mappings.yaml ({} mappings)",
                    local_mappings.len()
                );
                mappings = merge_mappings(mappings, local_mappings);
            }
            Err(e) => tracing::warn!("Failed to load project mappings.yaml: {}", e),
        }
    }

    if let Some(user_path) = get_user_mappings_path() {
        if user_path.exists() {
            match load_mappings_file(&user_path, leader) {
                Ok(user_mappings) => {
                    tracing::info!(
                        "Merging user mappings from {} ({} mappings)",
                        user_path.display(),
                        user_mappings.len()
                    );
                    mappings = merge_mappings(mappings, user_mappings);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load user mappings from {}: {}",
                        user_path.display(),
                        e
                    );
                }
            }
        }
    }

    mappings
}

/// Merge `overrides` into `base`: same mode and lhs replaces, otherwise appends
pub fn merge_mappings(base: Vec<UserMapping>, overrides: Vec<UserMapping>) -> Vec<UserMapping> {
    let mut result = base;

    for mapping in overrides {
        let existing_idx = result
            .iter()
            .position(|m| m.mode == mapping.mode && m.lhs == mapping.lhs);

        if let Some(idx) = existing_idx {
            result[idx] = mapping;
        } else {
            result.push(mapping);
        }
    }

    result
}
