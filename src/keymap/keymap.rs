//! Keymap struct for storing and looking up mode-scoped key sequences

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::binding::UserMapping;
use super::command::{ActionDef, CommandDef};
use super::notation::KeySeq;
use super::types::Mode;

/// Result of looking a sequence up in one mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The sequence is bound
    Exact(CommandDef),
    /// Not bound itself, but a strict prefix of something that is
    Prefix,
    /// Neither bound nor a prefix
    None,
}

/// Keymap shared between the engine and whoever edits user mappings
pub type SharedKeymap = Rc<RefCell<Keymap>>;

/// Built-in bindings plus the user remapping layer
///
/// Built-in bindings are fixed after construction. Doubled operators
/// (`dd`, `g~~`...) live in a separate compound layer that is only reached
/// through [`Keymap::fallback`]; keeping them out of the primary table means
/// no exact binding is ever also a strict prefix of another one.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    builtins: HashMap<Mode, HashMap<KeySeq, CommandDef>>,
    /// Strict prefixes of every built-in binding, per mode
    builtin_prefixes: HashMap<Mode, HashSet<KeySeq>>,
    /// Normal-mode doubled operators
    compound: HashMap<KeySeq, ActionDef>,
    user: HashMap<Mode, HashMap<KeySeq, UserMapping>>,
}

impl Keymap {
    /// Create an empty keymap (no built-ins)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a keymap populated with the built-in table
    pub fn with_builtins() -> Self {
        let mut keymap = Self::new();
        super::defaults::install_builtins(&mut keymap);
        keymap
    }

    /// Wrap for sharing with an engine
    pub fn shared(self) -> SharedKeymap {
        Rc::new(RefCell::new(self))
    }

    /// Add a built-in binding in `mode`
    pub fn bind(&mut self, mode: Mode, keys: &str, def: impl Into<CommandDef>) {
        let seq = KeySeq::parse(keys);
        if seq.is_empty() {
            return;
        }
        let prefixes = self.builtin_prefixes.entry(mode).or_default();
        prefixes.extend(seq.prefixes());
        self.builtins
            .entry(mode)
            .or_default()
            .insert(seq, def.into());
    }

    /// Add a built-in binding to several modes
    pub fn bind_all(&mut self, modes: &[Mode], keys: &str, def: impl Into<CommandDef> + Clone) {
        for &mode in modes {
            self.bind(mode, keys, def.clone());
        }
    }

    /// Add a doubled-operator form to the compound layer
    pub fn bind_compound(&mut self, keys: &str, def: ActionDef) {
        self.compound.insert(KeySeq::parse(keys), def);
    }

    /// Look `seq` up in `mode`
    ///
    /// With `check_user_mappings`, user mappings win exact matches and count
    /// towards prefixes.
    pub fn lookup(&self, mode: Mode, seq: &KeySeq, check_user_mappings: bool) -> Lookup {
        if check_user_mappings {
            if let Some(mapping) = self.user.get(&mode).and_then(|m| m.get(seq)) {
                return Lookup::Exact(CommandDef::UserMapping(mapping.clone()));
            }
        }

        if let Some(def) = self.lookup_builtin(mode, seq) {
            return Lookup::Exact(def.clone());
        }

        let builtin_prefix = self
            .builtin_prefixes
            .get(&mode)
            .is_some_and(|p| p.contains(seq));
        if builtin_prefix || (check_user_mappings && self.is_user_prefix(mode, seq)) {
            return Lookup::Prefix;
        }

        Lookup::None
    }

    /// Resolve `seq` to a descriptor: prefixes open a namespace, misses are
    /// [`CommandDef::Missing`]
    pub fn resolve(&self, mode: Mode, seq: &KeySeq, check_user_mappings: bool) -> CommandDef {
        match self.lookup(mode, seq, check_user_mappings) {
            Lookup::Exact(def) => def,
            Lookup::Prefix => CommandDef::OpenNamespace,
            Lookup::None => CommandDef::Missing,
        }
    }

    /// Re-resolve a bare (count-free) sequence after a miss
    ///
    /// Consults the primary table and, in Normal mode, the compound layer.
    /// User mappings are never consulted here.
    pub fn fallback(&self, mode: Mode, bare: &KeySeq) -> CommandDef {
        if let Some(def) = self.lookup_builtin(mode, bare) {
            return def.clone();
        }
        if mode == Mode::Normal {
            if let Some(def) = self.compound_action(bare) {
                return def.into();
            }
        }
        CommandDef::Missing
    }

    /// Doubled-operator form bound to `bare`, if any
    pub fn compound_action(&self, bare: &KeySeq) -> Option<ActionDef> {
        self.compound.get(bare).copied()
    }

    /// Exact built-in binding, ignoring user mappings
    pub fn lookup_builtin(&self, mode: Mode, seq: &KeySeq) -> Option<&CommandDef> {
        self.builtins.get(&mode).and_then(|m| m.get(seq))
    }

    /// True if `seq` is a strict prefix of some user mapping in `mode`
    pub fn is_user_prefix(&self, mode: Mode, seq: &KeySeq) -> bool {
        self.user
            .get(&mode)
            .is_some_and(|m| m.keys().any(|lhs| seq.is_strict_prefix_of(lhs)))
    }

    /// Add or replace a user mapping
    pub fn add_user_mapping(&mut self, mapping: UserMapping) {
        if mapping.lhs.is_empty() {
            tracing::warn!("Ignoring user mapping with empty lhs");
            return;
        }
        tracing::debug!(
            "Adding user mapping in {:?}: {}",
            mapping.mode,
            mapping.display_string()
        );
        self.user
            .entry(mapping.mode)
            .or_default()
            .insert(mapping.lhs.clone(), mapping);
    }

    /// Remove a user mapping, returning it if it existed
    pub fn remove_user_mapping(&mut self, mode: Mode, lhs: &KeySeq) -> Option<UserMapping> {
        self.user.get_mut(&mode).and_then(|m| m.remove(lhs))
    }

    pub fn clear_user_mappings(&mut self) {
        self.user.clear();
    }

    /// All user mappings, sorted by mode then lhs
    pub fn user_mappings(&self) -> Vec<&UserMapping> {
        let mut mappings: Vec<&UserMapping> =
            self.user.values().flat_map(|m| m.values()).collect();
        mappings.sort_by(|a, b| a.mode.cmp(&b.mode).then_with(|| a.lhs.cmp(&b.lhs)));
        mappings
    }

    /// All built-in sequences bound in `mode`
    pub fn builtin_sequences(&self, mode: Mode) -> impl Iterator<Item = &KeySeq> {
        self.builtins.get(&mode).into_iter().flat_map(|m| m.keys())
    }

    /// Number of built-in bindings across all modes
    pub fn builtin_count(&self) -> usize {
        self.builtins.values().map(HashMap::len).sum()
    }
}
