//! YAML configuration parsing for user mappings
//!
//! Parses mappings.yaml files into [`UserMapping`]s.
//!
//! ```yaml
//! mappings:
//!   - lhs: "jk"
//!     rhs: "<esc>"
//!     modes: [i]
//!   - lhs: "<leader>w"
//!     rhs: ":w<cr>"
//!     modes: [normal]
//! ```

use std::path::Path;

use serde::Deserialize;

use super::binding::UserMapping;
use super::notation::{expand_leader, KeySeq};
use super::types::Mode;

/// Root structure of a mappings YAML file
#[derive(Debug, Deserialize)]
pub struct MappingsConfig {
    #[serde(default)]
    pub mappings: Vec<MappingConfig>,
}

/// A single mapping entry from YAML
#[derive(Debug, Deserialize)]
pub struct MappingConfig {
    pub lhs: String,
    pub rhs: String,
    /// Defaults to Normal, visual and operator-pending (like `:map`)
    #[serde(default)]
    pub modes: Option<Vec<String>>,
}

/// Modes covered by `:map` when no modes are given
const MAP_MODES: &[Mode] = &[
    Mode::Normal,
    Mode::Visual,
    Mode::VisualLine,
    Mode::VisualBlock,
    Mode::Select,
    Mode::OperatorPending,
];

/// Load user mappings from a YAML file
pub fn load_mappings_file(path: &Path, leader: &str) -> Result<Vec<UserMapping>, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|e| KeymapError::Io(e.to_string()))?;

    parse_mappings_yaml(&content, leader)
}

/// Parse user mappings from a YAML string
///
/// An entry active in several modes produces one mapping per mode.
pub fn parse_mappings_yaml(yaml: &str, leader: &str) -> Result<Vec<UserMapping>, KeymapError> {
    let config: MappingsConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeymapError::Parse(e.to_string()))?;

    let mut mappings = Vec::new();
    for entry in config.mappings {
        let lhs = KeySeq::parse(&expand_leader(&entry.lhs, leader));
        if lhs.is_empty() {
            return Err(KeymapError::InvalidMapping(format!(
                "empty lhs (rhs: {:?})",
                entry.rhs
            )));
        }
        let rhs = KeySeq::parse(&expand_leader(&entry.rhs, leader));

        let modes = match &entry.modes {
            Some(names) => parse_modes(names)?,
            None => MAP_MODES.to_vec(),
        };
        for mode in modes {
            mappings.push(UserMapping::new(mode, lhs.clone(), rhs.clone()));
        }
    }

    Ok(mappings)
}

/// Parse mode names, accepting full names and Vim's one-letter codes
pub fn parse_modes(names: &[String]) -> Result<Vec<Mode>, KeymapError> {
    let mut modes = Vec::new();
    for name in names {
        for mode in parse_mode_name(name)? {
            if !modes.contains(mode) {
                modes.push(*mode);
            }
        }
    }
    Ok(modes)
}

fn parse_mode_name(name: &str) -> Result<&'static [Mode], KeymapError> {
    let modes: &'static [Mode] = match name.trim().to_lowercase().as_str() {
        "n" | "normal" => &[Mode::Normal],
        "i" | "insert" => &[Mode::Insert],
        "r" | "replace" => &[Mode::Replace],
        "v" => &[
            Mode::Visual,
            Mode::VisualLine,
            Mode::VisualBlock,
            Mode::Select,
        ],
        "x" => &[Mode::Visual, Mode::VisualLine, Mode::VisualBlock],
        "visual" => &[Mode::Visual],
        "visual_line" | "visualline" => &[Mode::VisualLine],
        "visual_block" | "visualblock" => &[Mode::VisualBlock],
        "s" | "select" => &[Mode::Select],
        "o" | "operator_pending" | "operatorpending" => &[Mode::OperatorPending],
        _ => return Err(KeymapError::InvalidMode(name.to_string())),
    };
    Ok(modes)
}

/// Errors that can occur when loading user mappings
#[derive(Debug, Clone)]
pub enum KeymapError {
    Io(String),
    Parse(String),
    InvalidMode(String),
    InvalidMapping(String),
}

impl std::fmt::Display for KeymapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeymapError::Io(e) => write!(f, "IO error: {}", e),
            KeymapError::Parse(e) => write!(f, "Parse error: {}", e),
            KeymapError::InvalidMode(m) => write!(f, "Invalid mode: {}", m),
            KeymapError::InvalidMapping(m) => write!(f, "Invalid mapping: {}", m),
        }
    }
}

impl std::error::Error for KeymapError {}
