//! Natex Core Library
//!
//! Compiles natural-language pattern expressions into regular expressions
//! that match whole utterances.
//!
//! ```
//! use natex_core::{MacroRegistry, Natex, Vars};
//!
//! let natex = Natex::new("$x=/red|blue/ ball is $x", MacroRegistry::new());
//! let mut vars = Vars::new();
//! assert!(natex.matches("red ball is red", &mut vars, None, false).unwrap().is_match());
//! assert_eq!(vars["x"], "red");
//! ```

pub mod ast;
pub mod compiler;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod macros;
pub mod natex;
pub mod ngrams;
pub mod parser;
pub mod value;

use std::collections::HashMap;

/// Variable bindings: read as seeds, written with captures after a match
pub type Vars = HashMap<String, String>;

pub use ast::{NodePath, Term};
pub use compiler::{Compilation, Reduction};
pub use context::CompilationContext;
pub use diagnostics::{Trace, TraceStep, render, render_partial};
pub use error::{NatexError, Result, SyntaxError, SyntaxErrorKind};
pub use lexer::{Lexeme, Lexer, Token};
pub use macros::{FnMacro, Macro, MacroError, MacroRegistry, from_fn, invoke};
pub use natex::{CompiledPattern, MatchResult, Natex};
pub use ngrams::Ngrams;
pub use parser::{Parser, parse};
pub use value::Value;

/// Compile an expression with no variables and no macros
///
/// This is the quickest way to see what an expression turns into.
pub fn compile(expression: &str) -> Result<String> {
    let term = parse(expression)?;
    let vars = Vars::new();
    let macros = MacroRegistry::new();
    let ngrams = Ngrams::default();
    let mut ctx = CompilationContext::new(&vars, &macros, &ngrams);
    Ok(compiler::compile(&term, &mut ctx, false).fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end() {
        // string -> tokens -> AST -> regex
        let result = compile("[!hello, {there, friend}]").unwrap();
        assert_eq!(result, r"hello\W+(?:there|friend)");
    }

    #[test]
    fn test_syntax_error_surfaces() {
        assert!(matches!(compile("{a}"), Err(NatexError::Syntax(_))));
    }
}
