//! Error types for the Natex compiler
//!
//! Only malformed expression text and patterns rejected by the regex engine
//! are errors. Data-dependent problems (missing variables, unknown or failing
//! macros) degrade to unmatchable sentinels inside the compiled pattern.

use thiserror::Error;

/// The main error type for Natex operations
#[derive(Error, Debug)]
pub enum NatexError {
    /// The expression text is not valid Natex syntax
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// The regex engine rejected the compiled pattern or gave up while matching
    #[error("regex error in `{pattern}`: {source}")]
    Regex {
        /// The anchored pattern handed to the engine
        pattern: String,
        /// The engine's own error
        #[source]
        source: Box<fancy_regex::Error>,
    },
}

/// A malformed expression, with the byte offset where it was detected
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at position {position}")]
pub struct SyntaxError {
    /// Byte offset into the expression
    pub position: usize,
    /// What went wrong
    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    /// Create a new syntax error
    pub fn new(position: usize, kind: SyntaxErrorKind) -> Self {
        SyntaxError { position, kind }
    }
}

/// Specific kinds of syntax errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxErrorKind {
    /// A character that cannot start any token
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    /// A token that does not fit the grammar here
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected
        expected: String,
        /// What was actually found
        found: String,
    },

    /// The expression ended in the middle of a construct
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A `/regex/` without its closing slash
    #[error("unterminated regex")]
    UnterminatedRegex,

    /// A `//` with nothing between the slashes
    #[error("empty regex")]
    EmptyRegex,

    /// A `$` or `#` not followed by a symbol
    #[error("expected a symbol after '{0}'")]
    MissingSymbol(char),

    /// A bracketed construct with fewer operands than it requires
    #[error("{construct} needs at least {minimum} operand(s), found {found}")]
    TooFewOperands {
        /// Name of the construct
        construct: &'static str,
        /// Minimum number of operands
        minimum: usize,
        /// Number actually present
        found: usize,
    },
}

/// Result type alias for Natex operations
pub type Result<T> = std::result::Result<T, NatexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_char_display() {
        let err = SyntaxError::new(5, SyntaxErrorKind::UnexpectedChar('?'));
        assert_eq!(err.to_string(), "unexpected character '?' at position 5");
    }

    #[test]
    fn test_unexpected_token_display() {
        let err = SyntaxErrorKind::UnexpectedToken {
            expected: "`]`".to_string(),
            found: "end of input".to_string(),
        };
        assert_eq!(err.to_string(), "expected `]`, found end of input");
    }

    #[test]
    fn test_too_few_operands_display() {
        let err = SyntaxErrorKind::TooFewOperands {
            construct: "disjunction",
            minimum: 2,
            found: 1,
        };
        assert_eq!(
            err.to_string(),
            "disjunction needs at least 2 operand(s), found 1"
        );
    }

    #[test]
    fn test_natex_error_from_syntax_error() {
        let err: NatexError = SyntaxError::new(0, SyntaxErrorKind::UnexpectedEof).into();
        assert_eq!(
            err.to_string(),
            "syntax error: unexpected end of input at position 0"
        );
    }
}
