//! The pattern facade
//!
//! [`Natex`] owns an expression and its default macros. Compiling builds a
//! fresh context every time; matching always recompiles because the result
//! depends on the variables passed in.

use crate::compiler;
use crate::context::CompilationContext;
use crate::diagnostics::Trace;
use crate::error::{NatexError, Result};
use crate::macros::MacroRegistry;
use crate::ngrams::Ngrams;
use crate::parser::parse;
use crate::Vars;
use std::borrow::Cow;
use std::fmt;

/// A Natex expression together with its default macros
#[derive(Debug, Clone)]
pub struct Natex {
    expression: String,
    macros: MacroRegistry,
}

impl Natex {
    /// Create a pattern from expression text and a default macro registry
    pub fn new(expression: impl Into<String>, macros: MacroRegistry) -> Self {
        Natex {
            expression: expression.into(),
            macros,
        }
    }

    /// The expression text
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The default macros
    pub fn macros(&self) -> &MacroRegistry {
        &self.macros
    }

    /// Replace the default macros
    pub fn set_macros(&mut self, macros: MacroRegistry) {
        self.macros = macros;
    }

    /// Compile without an utterance; macros see empty n-grams
    pub fn compile(
        &self,
        vars: &Vars,
        extra_macros: Option<&MacroRegistry>,
        debug: bool,
    ) -> Result<CompiledPattern> {
        self.compile_with(&Ngrams::default(), vars, extra_macros, debug)
    }

    /// Compile for a specific utterance.
    ///
    /// `extra_macros` are layered over the defaults: on a name clash the
    /// caller's macro is used.
    #[tracing::instrument(level = "debug", skip_all, fields(expression = %self.expression))]
    pub fn compile_with(
        &self,
        ngrams: &Ngrams,
        vars: &Vars,
        extra_macros: Option<&MacroRegistry>,
        debug: bool,
    ) -> Result<CompiledPattern> {
        let macros = match extra_macros {
            Some(extra) => Cow::Owned(self.macros.overlay(extra)),
            None => Cow::Borrowed(&self.macros),
        };

        if debug {
            let mut bindings: Vec<String> =
                vars.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            bindings.sort();
            tracing::debug!(
                input = ngrams.text(),
                macros = %macros.names().join(" "),
                vars = %bindings.join(", "),
                "natex compilation"
            );
        }

        let term = parse(&self.expression)?;
        let mut ctx = CompilationContext::new(vars, &macros, ngrams);
        let compilation = compiler::compile(&term, &mut ctx, debug);

        let trace = debug.then(|| {
            let trace = Trace::build(&term, &compilation.reductions, &compilation.fragment);
            for step in trace.steps() {
                tracing::debug!(step = %step.label, "{}", step.rendering);
            }
            trace
        });

        Ok(CompiledPattern {
            source: compilation.fragment,
            groups: ctx.into_groups(),
            trace,
        })
    }

    /// Compile and match `utterance` as a whole.
    ///
    /// `vars` seeds references during compilation. On a match every captured
    /// group is written back into it; on a miss it is left untouched.
    #[tracing::instrument(level = "debug", skip(self, vars, extra_macros, debug))]
    pub fn matches(
        &self,
        utterance: &str,
        vars: &mut Vars,
        extra_macros: Option<&MacroRegistry>,
        debug: bool,
    ) -> Result<MatchResult> {
        let ngrams = Ngrams::new(utterance);
        let pattern = self.compile_with(&ngrams, vars, extra_macros, debug)?;
        let captures = pattern.full_match(utterance)?;

        let matched = captures.is_some();
        let captures = captures.unwrap_or_default();
        if matched {
            vars.extend(captures.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        tracing::debug!(matched, pattern = %pattern, "natex match");

        Ok(MatchResult {
            matched,
            pattern,
            captures,
        })
    }
}

impl fmt::Display for Natex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Natex({})", self.expression)
    }
}

/// The regex produced by one compilation
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPattern {
    source: String,
    groups: Vec<(String, String)>,
    trace: Option<Trace>,
}

impl CompiledPattern {
    /// The regex source, without anchors
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// (capture group, variable) pairs, in binding order
    pub fn groups(&self) -> &[(String, String)] {
        &self.groups
    }

    /// The compilation trace, if diagnostics were requested
    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    /// The regex anchored at both ends
    pub fn anchored(&self) -> String {
        format!("^(?:{})$", self.source)
    }

    /// Build the anchored regex
    pub fn regex(&self) -> Result<fancy_regex::Regex> {
        let anchored = self.anchored();
        fancy_regex::Regex::new(&anchored).map_err(|source| NatexError::Regex {
            pattern: anchored,
            source: Box::new(source),
        })
    }

    /// Match the whole of `utterance`; on success return the captured
    /// variables (only groups that took part in the match)
    pub fn full_match(&self, utterance: &str) -> Result<Option<Vars>> {
        let regex = self.regex()?;
        let captures = regex.captures(utterance).map_err(|source| NatexError::Regex {
            pattern: self.anchored(),
            source: Box::new(source),
        })?;

        Ok(captures.map(|caps| {
            self.groups
                .iter()
                .filter_map(|(group, symbol)| {
                    caps.name(group)
                        .map(|m| (symbol.clone(), m.as_str().to_string()))
                })
                .collect()
        }))
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// The outcome of [`Natex::matches`]
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    matched: bool,
    pattern: CompiledPattern,
    captures: Vars,
}

impl MatchResult {
    /// Whether the utterance matched
    pub fn is_match(&self) -> bool {
        self.matched
    }

    /// The pattern the utterance was matched against
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Variables captured by this match (empty on a miss)
    pub fn captures(&self) -> &Vars {
        &self.captures
    }
}
