//! Values produced by compiling a term or running a macro
//!
//! Every node of the tree compiles to a [`Value`]. Combinators only ever see
//! regex text, so they convert their operands with [`Value::to_fragment`];
//! macro arguments keep the value as produced.

use std::collections::BTreeSet;
use std::fmt;

/// Fragment for `false`: a token that does not occur in real utterances
pub const FALSE_SENTINEL: &str = "_FALSE_";

/// Fragment for a reference to a symbol that is neither bound nor supplied
pub fn unresolved_reference(symbol: &str) -> String {
    format!("_{}_NOT_FOUND_", symbol)
}

/// Fragment for a call to a macro missing from the registry
pub fn unknown_macro(name: &str) -> String {
    format!("_{}_MACRO_NOT_FOUND_", name)
}

/// Fragment for a macro that returned an error, panicked, or produced
/// malformed regex text
pub fn failed_macro(name: &str) -> String {
    format!("_{}_MACRO_FAILED_", name)
}

/// Fragment for a supplied variable whose value is not valid regex text
pub fn invalid_reference(symbol: &str) -> String {
    format!("_{}_INVALID_", symbol)
}

/// The result of compiling a term or running a macro
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A regex fragment
    Text(String),
    /// Alternative fragments, any of which may match
    Alternatives(BTreeSet<String>),
    /// `true` matches anything, `false` matches nothing
    Bool(bool),
    /// No constraint at all: the empty fragment
    Absent,
}

impl Value {
    /// Create a text value
    pub fn text(fragment: impl Into<String>) -> Self {
        Value::Text(fragment.into())
    }

    /// Create an alternatives value from any collection of strings
    pub fn alternatives<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Alternatives(items.into_iter().map(Into::into).collect())
    }

    /// Convert into regex source text
    pub fn to_fragment(&self) -> String {
        match self {
            Value::Text(fragment) => fragment.clone(),
            Value::Alternatives(items) => {
                let parts: Vec<&str> = items.iter().map(String::as_str).collect();
                format!("(?:{})", parts.join("|"))
            }
            Value::Bool(true) => ".*".to_string(),
            Value::Bool(false) => FALSE_SENTINEL.to_string(),
            Value::Absent => String::new(),
        }
    }

    /// The text of a [`Value::Text`], if that is what this is
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(fragment) => Some(fragment),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fragment())
    }
}

impl From<String> for Value {
    fn from(fragment: String) -> Self {
        Value::Text(fragment)
    }
}

impl From<&str> for Value {
    fn from(fragment: &str) -> Self {
        Value::Text(fragment.to_string())
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<BTreeSet<String>> for Value {
    fn from(items: BTreeSet<String>) -> Self {
        Value::Alternatives(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}
