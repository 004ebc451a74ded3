//! Parser for Natex expressions
//!
//! A recursive descent parser over the lexer's tokens.
//!
//! Grammar:
//!   expression  := space? term ( space term )* space? EOF
//!   term        := flexible | rigid | conjunction | disjunction | negation
//!                | regex | assignment | reference | macro | literal
//!   flexible    := '[' operands ']'            (1 or more)
//!   rigid       := '[!' operands ']'           (2 or more)
//!   conjunction := '<' operands '>'            (2 or more)
//!   disjunction := '{' operands '}'            (2 or more)
//!   operands    := space? term ( separator term )* space?
//!   separator   := space? ',' space? | space
//!   negation    := '-' space? term
//!   regex       := '/' [^/]+ '/'
//!   assignment  := '$' symbol '=' term
//!   reference   := '$' symbol
//!   macro       := '#' symbol ( '(' space? operands? ')' )?
//!   literal     := word ( space word )*

use crate::ast::Term;
use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::lexer::{Lexeme, Lexer, Token};

/// Parser for Natex expressions
pub struct Parser<'a> {
    input: &'a str,
    lexemes: Vec<Lexeme>,
    index: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given expression
    pub fn new(input: &'a str) -> Result<Self, SyntaxError> {
        let lexemes = Lexer::new(input).tokenize()?;
        Ok(Parser {
            input,
            lexemes,
            index: 0,
        })
    }

    fn current(&self) -> &Lexeme {
        // tokenize() always ends with Eof, and the parser never moves past it
        &self.lexemes[self.index.min(self.lexemes.len() - 1)]
    }

    fn current_token(&self) -> &Token {
        &self.current().token
    }

    fn peek_token(&self, offset: usize) -> &Token {
        let index = (self.index + offset).min(self.lexemes.len() - 1);
        &self.lexemes[index].token
    }

    fn advance(&mut self) {
        if self.current_token() != &Token::Eof {
            self.index += 1;
        }
    }

    fn skip_space(&mut self) -> bool {
        if self.current_token() == &Token::Space {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let lexeme = self.current();
        let kind = match lexeme.token {
            Token::Eof => SyntaxErrorKind::UnexpectedEof,
            ref found => SyntaxErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: found.to_string(),
            },
        };
        SyntaxError::new(lexeme.position, kind)
    }

    /// Parse the entire input and return the AST
    pub fn parse(&mut self) -> Result<Term, SyntaxError> {
        self.skip_space();
        let mut terms = vec![self.parse_term()?];

        loop {
            let spaced = self.skip_space();
            if self.current_token() == &Token::Eof {
                break;
            }
            if !spaced {
                return Err(self.unexpected("whitespace or end of input"));
            }
            terms.push(self.parse_term()?);
        }

        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(Term::Concatenation(terms))
        }
    }

    /// Parse a single term
    fn parse_term(&mut self) -> Result<Term, SyntaxError> {
        match self.current_token().clone() {
            Token::FlexOpen => {
                let items =
                    self.parse_operands(Token::CloseBracket, "`]`", "flexible sequence", 1)?;
                Ok(Term::FlexibleSequence(items))
            }
            Token::RigidOpen => {
                let items = self.parse_operands(Token::CloseBracket, "`]`", "rigid sequence", 2)?;
                Ok(Term::RigidSequence(items))
            }
            Token::OpenAngle => {
                let items = self.parse_operands(Token::CloseAngle, "`>`", "conjunction", 2)?;
                Ok(Term::Conjunction(items))
            }
            Token::OpenBrace => {
                let items = self.parse_operands(Token::CloseBrace, "`}`", "disjunction", 2)?;
                Ok(Term::Disjunction(items))
            }
            Token::Minus => {
                self.advance();
                self.skip_space();
                Ok(Term::negation(self.parse_term()?))
            }
            Token::Regex(pattern) => {
                self.advance();
                Ok(Term::Regex(pattern))
            }
            Token::Variable(symbol) => {
                self.advance();
                if self.current_token() == &Token::Equals {
                    self.advance();
                    let term = self.parse_term()?;
                    Ok(Term::assignment(symbol, term))
                } else {
                    Ok(Term::Reference(symbol))
                }
            }
            Token::Macro(name) => {
                self.advance();
                let args = if self.current_token() == &Token::OpenParen {
                    self.parse_arguments()?
                } else {
                    Vec::new()
                };
                Ok(Term::MacroCall { name, args })
            }
            Token::Word(_) => self.parse_literal(),
            _ => Err(self.unexpected("term")),
        }
    }

    /// Parse `word ( space word )*`, keeping the source text verbatim
    fn parse_literal(&mut self) -> Result<Term, SyntaxError> {
        let start = self.current().position;
        let mut end = match self.current_token() {
            Token::Word(word) => start + word.len(),
            _ => return Err(self.unexpected("word")),
        };
        self.advance();

        while self.current_token() == &Token::Space
            && let Token::Word(word) = self.peek_token(1)
        {
            end = self.lexemes[self.index + 1].position + word.len();
            self.advance();
            self.advance();
        }

        Ok(Term::literal(&self.input[start..end]))
    }

    /// Parse a bracketed operand list; the opening token is current
    fn parse_operands(
        &mut self,
        close: Token,
        close_name: &str,
        construct: &'static str,
        minimum: usize,
    ) -> Result<Vec<Term>, SyntaxError> {
        let open_position = self.current().position;
        self.advance();
        let items = self.parse_operand_list(&close, close_name)?;

        if items.len() < minimum {
            return Err(SyntaxError::new(
                open_position,
                SyntaxErrorKind::TooFewOperands {
                    construct,
                    minimum,
                    found: items.len(),
                },
            ));
        }
        Ok(items)
    }

    /// Parse `( operands? )` after a macro name
    fn parse_arguments(&mut self) -> Result<Vec<Term>, SyntaxError> {
        self.advance();
        self.parse_operand_list(&Token::CloseParen, "`)`")
    }

    /// Parse operands up to and including the closing token
    fn parse_operand_list(
        &mut self,
        close: &Token,
        close_name: &str,
    ) -> Result<Vec<Term>, SyntaxError> {
        let mut items = Vec::new();
        self.skip_space();

        if self.current_token() == close {
            self.advance();
            return Ok(items);
        }

        loop {
            items.push(self.parse_term()?);

            let spaced = self.skip_space();
            if self.current_token() == close {
                self.advance();
                return Ok(items);
            }
            if self.current_token() == &Token::Comma {
                self.advance();
                self.skip_space();
            } else if !spaced {
                return Err(self.unexpected(&format!("`,` or {}", close_name)));
            }
        }
    }
}

/// Parse a Natex expression into an AST
pub fn parse(input: &str) -> Result<Term, SyntaxError> {
    let mut parser = Parser::new(input)?;
    parser.parse()
}
