//! Macros and the boundary that runs them
//!
//! A macro is arbitrary caller code. Whatever it does wrong (returns an
//! error, panics, or is simply not registered) stays local to its call site:
//! the call compiles to a sentinel that never matches and compilation of the
//! surrounding expression carries on.

use crate::ngrams::Ngrams;
use crate::value::{self, Value};
use crate::Vars;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// Errors a macro may report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MacroError {
    /// A required argument was not supplied
    #[error("missing argument {0}")]
    MissingArgument(usize),

    /// An argument had the wrong kind or could not be interpreted
    #[error("invalid argument {index}: {reason}")]
    InvalidArgument {
        /// Zero-based argument position
        index: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Any other failure
    #[error("{0}")]
    Failed(String),
}

impl MacroError {
    /// Create a general failure
    pub fn failed(message: impl Into<String>) -> Self {
        MacroError::Failed(message.into())
    }
}

/// A named, user-supplied pattern generator
pub trait Macro: Send + Sync {
    /// Produce a value from the utterance, the current variables, and the
    /// already-compiled arguments
    fn run(&self, ngrams: &Ngrams, vars: &Vars, args: &[Value]) -> Result<Value, MacroError>;
}

/// A macro backed by a closure; see [`from_fn`]
#[derive(Clone)]
pub struct FnMacro<F>(F);

impl<F> Macro for FnMacro<F>
where
    F: Fn(&Ngrams, &Vars, &[Value]) -> Result<Value, MacroError> + Send + Sync,
{
    fn run(&self, ngrams: &Ngrams, vars: &Vars, args: &[Value]) -> Result<Value, MacroError> {
        (self.0)(ngrams, vars, args)
    }
}

/// Wrap a closure as a [`Macro`]
///
/// # Example
/// ```
/// use natex_core::{MacroRegistry, Value, from_fn};
///
/// let registry = MacroRegistry::new().with("YES", from_fn(|_, _, _| Ok(Value::Bool(true))));
/// assert!(registry.contains("YES"));
/// ```
pub fn from_fn<F>(f: F) -> FnMacro<F>
where
    F: Fn(&Ngrams, &Vars, &[Value]) -> Result<Value, MacroError> + Send + Sync,
{
    FnMacro(f)
}

/// Macros by name
#[derive(Clone, Default)]
pub struct MacroRegistry {
    macros: HashMap<String, Arc<dyn Macro>>,
}

impl MacroRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a macro, replacing any previous one with the same name
    pub fn insert(&mut self, name: impl Into<String>, m: impl Macro + 'static) -> &mut Self {
        self.macros.insert(name.into(), Arc::new(m));
        self
    }

    /// Builder-style [`MacroRegistry::insert`]
    pub fn with(mut self, name: impl Into<String>, m: impl Macro + 'static) -> Self {
        self.insert(name, m);
        self
    }

    /// Look up a macro by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Macro>> {
        self.macros.get(name)
    }

    /// Check if a macro is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered macros
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// A registry holding every macro from `self` and from `overrides`;
    /// on a name clash the macro from `overrides` wins.
    pub fn overlay(&self, overrides: &MacroRegistry) -> MacroRegistry {
        let mut merged = self.clone();
        for (name, m) in &overrides.macros {
            merged.macros.insert(name.clone(), Arc::clone(m));
        }
        merged
    }
}

impl fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Run macro `name` with the given arguments.
///
/// Never fails: an unregistered name, a returned [`MacroError`], and a panic
/// all become an unmatchable sentinel fragment.
pub fn invoke(
    registry: &MacroRegistry,
    name: &str,
    ngrams: &Ngrams,
    vars: &Vars,
    args: &[Value],
) -> Value {
    let Some(m) = registry.get(name) else {
        tracing::warn!(macro_name = name, "macro not found");
        return Value::Text(value::unknown_macro(name));
    };

    match panic::catch_unwind(AssertUnwindSafe(|| m.run(ngrams, vars, args))) {
        Ok(Ok(value)) => value,
        Ok(Err(error)) => {
            tracing::warn!(macro_name = name, %error, "macro failed");
            Value::Text(value::failed_macro(name))
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            tracing::warn!(macro_name = name, panic = %message, "macro panicked");
            Value::Text(value::failed_macro(name))
        }
    }
}
