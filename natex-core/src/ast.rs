//! Abstract Syntax Tree (AST) for Natex expressions
//!
//! One variant per surface construct. A tree is built fresh for every
//! compilation and rendered back to surface syntax by its `Display` impl.

use std::fmt;

/// Position of a node in a tree: the child index taken at each level,
/// starting from the root (the root itself has the empty path).
pub type NodePath = Vec<usize>;

/// A term in a Natex expression
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// `[a, b, ...]`: operands in order, anything in between
    FlexibleSequence(Vec<Term>),

    /// `[!a, b, ...]`: operands in order, separated only by non-word characters
    RigidSequence(Vec<Term>),

    /// `<a, b, ...>`: every operand somewhere, in any order
    Conjunction(Vec<Term>),

    /// `{a, b, ...}`: any one operand
    Disjunction(Vec<Term>),

    /// `-a`: the operand occurs nowhere
    Negation(Box<Term>),

    /// `/pattern/`: raw regex passed through unchanged
    Regex(String),

    /// `$name`
    Reference(String),

    /// `$name=term`
    Assignment {
        /// The variable being bound
        symbol: String,
        /// The term whose match is captured
        term: Box<Term>,
    },

    /// `#name(a, b, ...)`
    MacroCall {
        /// Registry name of the macro
        name: String,
        /// Argument terms, compiled before the call
        args: Vec<Term>,
    },

    /// One or more whitespace-separated words
    Literal(String),

    /// Whitespace-separated terms at the top level of an expression
    Concatenation(Vec<Term>),
}

impl Term {
    /// Create a literal term
    pub fn literal(text: impl Into<String>) -> Self {
        Term::Literal(text.into())
    }

    /// Create a raw regex term
    pub fn regex(pattern: impl Into<String>) -> Self {
        Term::Regex(pattern.into())
    }

    /// Create a reference term
    pub fn reference(symbol: impl Into<String>) -> Self {
        Term::Reference(symbol.into())
    }

    /// Create an assignment term
    pub fn assignment(symbol: impl Into<String>, term: Term) -> Self {
        Term::Assignment {
            symbol: symbol.into(),
            term: Box::new(term),
        }
    }

    /// Create a macro call term
    pub fn macro_call(name: impl Into<String>, args: Vec<Term>) -> Self {
        Term::MacroCall {
            name: name.into(),
            args,
        }
    }

    /// Create a negation term
    pub fn negation(term: Term) -> Self {
        Term::Negation(Box::new(term))
    }

    /// Human-readable name of this kind of term
    pub fn kind(&self) -> &'static str {
        match self {
            Term::FlexibleSequence(_) => "flexible sequence",
            Term::RigidSequence(_) => "rigid sequence",
            Term::Conjunction(_) => "conjunction",
            Term::Disjunction(_) => "disjunction",
            Term::Negation(_) => "negation",
            Term::Regex(_) => "regex",
            Term::Reference(_) => "reference",
            Term::Assignment { .. } => "assignment",
            Term::MacroCall { .. } => "macro",
            Term::Literal(_) => "literal",
            Term::Concatenation(_) => "concatenation",
        }
    }

    /// The direct children of this term, in evaluation order
    pub fn children(&self) -> &[Term] {
        match self {
            Term::FlexibleSequence(terms)
            | Term::RigidSequence(terms)
            | Term::Conjunction(terms)
            | Term::Disjunction(terms)
            | Term::Concatenation(terms) => terms,
            Term::MacroCall { args, .. } => args,
            Term::Negation(term) | Term::Assignment { term, .. } => std::slice::from_ref(term),
            Term::Regex(_) | Term::Reference(_) | Term::Literal(_) => &[],
        }
    }

    /// Look up a descendant by path
    pub fn at(&self, path: &[usize]) -> Option<&Term> {
        match path.split_first() {
            None => Some(self),
            Some((&index, rest)) => self.children().get(index)?.at(rest),
        }
    }

    /// Write this term in surface syntax. Wherever `substitute` returns a
    /// string for a node's path, that string is written instead of the node.
    pub(crate) fn write_surface<'s, F>(&self, path: &mut NodePath, out: &mut String, substitute: &F)
    where
        F: Fn(&[usize]) -> Option<&'s str>,
    {
        if let Some(text) = substitute(path) {
            out.push_str(text);
            return;
        }

        let mut children = |out: &mut String, separator: &str| {
            for (index, child) in self.children().iter().enumerate() {
                if index > 0 {
                    out.push_str(separator);
                }
                path.push(index);
                child.write_surface(path, out, substitute);
                path.pop();
            }
        };

        match self {
            Term::FlexibleSequence(_) => {
                out.push('[');
                children(out, ", ");
                out.push(']');
            }
            Term::RigidSequence(_) => {
                out.push_str("[!");
                children(out, ", ");
                out.push(']');
            }
            Term::Conjunction(_) => {
                out.push('<');
                children(out, ", ");
                out.push('>');
            }
            Term::Disjunction(_) => {
                out.push('{');
                children(out, ", ");
                out.push('}');
            }
            Term::Negation(_) => {
                out.push('-');
                children(out, "");
            }
            Term::Regex(pattern) => {
                out.push('/');
                out.push_str(pattern);
                out.push('/');
            }
            Term::Reference(symbol) => {
                out.push('$');
                out.push_str(symbol);
            }
            Term::Assignment { symbol, .. } => {
                out.push('$');
                out.push_str(symbol);
                out.push('=');
                children(out, "");
            }
            Term::MacroCall { name, args } => {
                out.push('#');
                out.push_str(name);
                if !args.is_empty() {
                    out.push('(');
                    children(out, ", ");
                    out.push(')');
                }
            }
            Term::Literal(text) => out.push_str(text),
            Term::Concatenation(_) => children(out, " "),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_surface(&mut Vec::new(), &mut out, &|_| None);
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal() {
        assert_eq!(Term::literal("good morning").to_string(), "good morning");
    }

    #[test]
    fn test_sequences() {
        let items = vec![Term::literal("a"), Term::literal("b")];
        assert_eq!(Term::FlexibleSequence(items.clone()).to_string(), "[a, b]");
        assert_eq!(Term::RigidSequence(items).to_string(), "[!a, b]");
    }

    #[test]
    fn test_conjunction_and_disjunction() {
        let items = vec![Term::literal("a"), Term::reference("x")];
        assert_eq!(Term::Conjunction(items.clone()).to_string(), "<a, $x>");
        assert_eq!(Term::Disjunction(items).to_string(), "{a, $x}");
    }

    #[test]
    fn test_negation_and_regex() {
        let term = Term::negation(Term::regex("a+"));
        assert_eq!(term.to_string(), "-/a+/");
    }

    #[test]
    fn test_assignment() {
        let term = Term::assignment("color", Term::regex("red|blue"));
        assert_eq!(term.to_string(), "$color=/red|blue/");
    }

    #[test]
    fn test_macro_call() {
        let call = Term::macro_call("Rep", vec![Term::literal("there"), Term::literal("3")]);
        assert_eq!(call.to_string(), "#Rep(there, 3)");
        assert_eq!(Term::macro_call("ANY", vec![]).to_string(), "#ANY");
    }

    #[test]
    fn test_concatenation() {
        let term = Term::Concatenation(vec![
            Term::literal("oh hello"),
            Term::macro_call("Rep", vec![Term::literal("there")]),
        ]);
        assert_eq!(term.to_string(), "oh hello #Rep(there)");
    }

    #[test]
    fn test_children_and_at() {
        let term = Term::FlexibleSequence(vec![
            Term::literal("a"),
            Term::negation(Term::literal("b")),
        ]);
        assert_eq!(term.children().len(), 2);
        assert_eq!(term.at(&[1, 0]), Some(&Term::literal("b")));
        assert_eq!(term.at(&[2]), None);
        assert_eq!(term.at(&[]), Some(&term));
    }
}
