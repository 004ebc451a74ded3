//! Lexer for tokenizing Natex expressions
//!
//! Whitespace is significant in two places (between the words of a literal
//! and between top-level terms), so runs of whitespace become a single
//! [`Token::Space`] instead of being dropped.

use crate::error::{SyntaxError, SyntaxErrorKind};
use std::fmt;

/// A token in a Natex expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `[` (start of a flexible sequence)
    FlexOpen,
    /// `[!` (start of a rigid sequence)
    RigidOpen,
    /// `]`
    CloseBracket,
    /// `<`
    OpenAngle,
    /// `>`
    CloseAngle,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `(` (start of macro arguments)
    OpenParen,
    /// `)`
    CloseParen,
    /// `,`
    Comma,
    /// `-` (negation)
    Minus,
    /// `=` (assignment)
    Equals,
    /// `$name`
    Variable(String),
    /// `#name`
    Macro(String),
    /// `/pattern/`, holding the text between the slashes
    Regex(String),
    /// A run of ASCII letters and digits
    Word(String),
    /// A run of whitespace
    Space,
    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::FlexOpen => write!(f, "`[`"),
            Token::RigidOpen => write!(f, "`[!`"),
            Token::CloseBracket => write!(f, "`]`"),
            Token::OpenAngle => write!(f, "`<`"),
            Token::CloseAngle => write!(f, "`>`"),
            Token::OpenBrace => write!(f, "`{{`"),
            Token::CloseBrace => write!(f, "`}}`"),
            Token::OpenParen => write!(f, "`(`"),
            Token::CloseParen => write!(f, "`)`"),
            Token::Comma => write!(f, "`,`"),
            Token::Minus => write!(f, "`-`"),
            Token::Equals => write!(f, "`=`"),
            Token::Variable(name) => write!(f, "variable `${}`", name),
            Token::Macro(name) => write!(f, "macro `#{}`", name),
            Token::Regex(pattern) => write!(f, "regex `/{}/`", pattern),
            Token::Word(word) => write!(f, "word `{}`", word),
            Token::Space => write!(f, "whitespace"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// A token together with the byte offset where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    /// The token
    pub token: Token,
    /// Byte offset into the expression
    pub position: usize,
}

/// Lexer for tokenizing Natex expressions
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given expression
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            self.position += c.len_utf8();
        }
    }

    /// Check if a character may appear in a `$` or `#` symbol
    pub fn is_symbol_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '.'
    }

    /// Check if a character may appear in a literal word
    pub fn is_word_char(c: char) -> bool {
        c.is_ascii_alphanumeric()
    }

    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        while let Some(c) = self.current_char() {
            if predicate(c) {
                self.advance();
            } else {
                break;
            }
        }
        &self.input[start..self.position]
    }

    /// Read the symbol following a `$` or `#` sigil (already consumed)
    fn read_symbol(&mut self, sigil: char) -> Result<String, SyntaxError> {
        let symbol = self.read_while(Self::is_symbol_char);
        if symbol.is_empty() {
            return Err(SyntaxError::new(
                self.position,
                SyntaxErrorKind::MissingSymbol(sigil),
            ));
        }
        Ok(symbol.to_string())
    }

    /// Read a raw regex body; the opening slash is already consumed
    fn read_regex(&mut self, start: usize) -> Result<String, SyntaxError> {
        let body = self.read_while(|c| c != '/');
        if self.current_char() != Some('/') {
            return Err(SyntaxError::new(start, SyntaxErrorKind::UnterminatedRegex));
        }
        self.advance();
        if body.is_empty() {
            return Err(SyntaxError::new(start, SyntaxErrorKind::EmptyRegex));
        }
        Ok(body.to_string())
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Lexeme, SyntaxError> {
        let position = self.position;
        let Some(c) = self.current_char() else {
            return Ok(Lexeme {
                token: Token::Eof,
                position,
            });
        };

        let token = match c {
            c if c.is_whitespace() => {
                self.read_while(char::is_whitespace);
                Token::Space
            }
            c if Self::is_word_char(c) => {
                Token::Word(self.read_while(Self::is_word_char).to_string())
            }
            '[' => {
                self.advance();
                if self.current_char() == Some('!') {
                    self.advance();
                    Token::RigidOpen
                } else {
                    Token::FlexOpen
                }
            }
            '$' => {
                self.advance();
                Token::Variable(self.read_symbol('$')?)
            }
            '#' => {
                self.advance();
                Token::Macro(self.read_symbol('#')?)
            }
            '/' => {
                self.advance();
                Token::Regex(self.read_regex(position)?)
            }
            _ => {
                let token = match c {
                    ']' => Token::CloseBracket,
                    '<' => Token::OpenAngle,
                    '>' => Token::CloseAngle,
                    '{' => Token::OpenBrace,
                    '}' => Token::CloseBrace,
                    '(' => Token::OpenParen,
                    ')' => Token::CloseParen,
                    ',' => Token::Comma,
                    '-' => Token::Minus,
                    '=' => Token::Equals,
                    other => {
                        return Err(SyntaxError::new(
                            position,
                            SyntaxErrorKind::UnexpectedChar(other),
                        ));
                    }
                };
                self.advance();
                token
            }
        };

        Ok(Lexeme { token, position })
    }

    /// Tokenize the entire input; the last lexeme is always [`Token::Eof`]
    pub fn tokenize(&mut self) -> Result<Vec<Lexeme>, SyntaxError> {
        let mut lexemes = Vec::new();
        loop {
            let lexeme = self.next_token()?;
            let done = lexeme.token == Token::Eof;
            lexemes.push(lexeme);
            if done {
                break;
            }
        }
        Ok(lexemes)
    }
}
