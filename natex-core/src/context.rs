//! Per-compilation state
//!
//! A [`CompilationContext`] lives for exactly one compile call. It borrows
//! the caller's variables, the macro registry and the utterance n-grams, and
//! owns the set of symbols already bound to a capture group in this pass.

use crate::macros::MacroRegistry;
use crate::ngrams::Ngrams;
use crate::Vars;
use std::collections::HashMap;

/// Prefix of generated group names for symbols that are not regex identifiers
const GENERATED_GROUP_PREFIX: &str = "_natex";

/// State threaded through one compilation
#[derive(Debug)]
pub struct CompilationContext<'a> {
    vars: &'a Vars,
    macros: &'a MacroRegistry,
    ngrams: &'a Ngrams,
    /// symbol -> capture group name
    bound: HashMap<String, String>,
    /// (group name, symbol) in binding order
    groups: Vec<(String, String)>,
}

impl<'a> CompilationContext<'a> {
    /// Create a context with nothing bound yet
    pub fn new(vars: &'a Vars, macros: &'a MacroRegistry, ngrams: &'a Ngrams) -> Self {
        CompilationContext {
            vars,
            macros,
            ngrams,
            bound: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Variables supplied by the caller
    pub fn vars(&self) -> &'a Vars {
        self.vars
    }

    /// Macros available to this compilation
    pub fn macros(&self) -> &'a MacroRegistry {
        self.macros
    }

    /// The utterance being matched, if any
    pub fn ngrams(&self) -> &'a Ngrams {
        self.ngrams
    }

    /// The capture group bound to `symbol` in this pass
    pub fn group_for(&self, symbol: &str) -> Option<&str> {
        self.bound.get(symbol).map(String::as_str)
    }

    /// Check if `symbol` already has a capture group in this pass
    pub fn is_bound(&self, symbol: &str) -> bool {
        self.bound.contains_key(symbol)
    }

    /// Bind `symbol` to a new capture group and return the group name.
    /// If the symbol is already bound its existing group is returned.
    pub fn bind(&mut self, symbol: &str) -> String {
        if let Some(group) = self.bound.get(symbol) {
            return group.clone();
        }

        let group = if is_group_identifier(symbol) && !self.group_taken(symbol) {
            symbol.to_string()
        } else {
            let mut n = self.groups.len();
            loop {
                let candidate = format!("{}{}", GENERATED_GROUP_PREFIX, n);
                if !self.group_taken(&candidate) {
                    break candidate;
                }
                n += 1;
            }
        };

        self.bound.insert(symbol.to_string(), group.clone());
        self.groups.push((group.clone(), symbol.to_string()));
        group
    }

    fn group_taken(&self, group: &str) -> bool {
        self.groups.iter().any(|(g, _)| g == group)
    }

    /// (group name, symbol) pairs in binding order
    pub fn groups(&self) -> &[(String, String)] {
        &self.groups
    }

    /// Consume the context, keeping only the group table
    pub fn into_groups(self) -> Vec<(String, String)> {
        self.groups
    }
}

/// Whether `name` can be used verbatim as a regex capture group name
fn is_group_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_context(test: impl FnOnce(&mut CompilationContext<'_>)) {
        let vars = Vars::new();
        let macros = MacroRegistry::new();
        let ngrams = Ngrams::default();
        let mut ctx = CompilationContext::new(&vars, &macros, &ngrams);
        test(&mut ctx);
    }

    #[test]
    fn test_bind_uses_symbol_as_group_name() {
        with_context(|ctx| {
            assert!(!ctx.is_bound("color"));
            assert_eq!(ctx.bind("color"), "color");
            assert!(ctx.is_bound("color"));
            assert_eq!(ctx.group_for("color"), Some("color"));
        });
    }

    #[test]
    fn test_bind_is_idempotent() {
        with_context(|ctx| {
            ctx.bind("x");
            ctx.bind("x");
            assert_eq!(ctx.groups().len(), 1);
        });
    }

    #[test]
    fn test_bind_generates_names_for_non_identifiers() {
        with_context(|ctx| {
            assert_eq!(ctx.bind("user.name"), "_natex0");
            assert_eq!(ctx.bind("2nd"), "_natex1");
            assert_eq!(
                ctx.groups(),
                &[
                    ("_natex0".to_string(), "user.name".to_string()),
                    ("_natex1".to_string(), "2nd".to_string()),
                ]
            );
        });
    }

    #[test]
    fn test_bind_avoids_group_name_collisions() {
        with_context(|ctx| {
            assert_eq!(ctx.bind("a.b"), "_natex0");
            assert_eq!(ctx.bind("_natex0"), "_natex1");
        });
    }

    #[test]
    fn test_group_identifier() {
        assert!(is_group_identifier("name"));
        assert!(is_group_identifier("_x1"));
        assert!(!is_group_identifier("1x"));
        assert!(!is_group_identifier("a.b"));
        assert!(!is_group_identifier(""));
    }
}
