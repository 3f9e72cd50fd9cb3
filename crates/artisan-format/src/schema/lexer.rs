// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema tokenizer.
//!
//! Keywords (`struct`, `union`, `optional`, `ref`, `seq`) come out as plain
//! identifiers; the parser gives them meaning by position.

use super::SchemaError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Identifier(String),
    Integer(u64),
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    LBracket,
    RBracket,
    Colon,
    Semicolon,
    Comma,
    At,
    Equals,
    Eof,
}

impl Token {
    /// How the token reads in diagnostics.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Identifier(name) => format!("'{}'", name),
            Self::Integer(n) => format!("'{}'", n),
            Self::LBrace => "'{'".into(),
            Self::RBrace => "'}'".into(),
            Self::LAngle => "'<'".into(),
            Self::RAngle => "'>'".into(),
            Self::LBracket => "'['".into(),
            Self::RBracket => "']'".into(),
            Self::Colon => "':'".into(),
            Self::Semicolon => "';'".into(),
            Self::Comma => "','".into(),
            Self::At => "'@'".into(),
            Self::Equals => "'='".into(),
            Self::Eof => "end of input".into(),
        }
    }
}

/// Token with the position of its first character (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_line(&mut self) {
        while let Some(ch) = self.next_char() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip whitespace plus `#` and `//` comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else if ch == '#' || (ch == '/' && self.peek_second() == Some('/')) {
                self.skip_line();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.next_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn read_integer(&mut self, line: usize, column: usize) -> Result<Token, SchemaError> {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() || ch == '_' {
                self.next_char();
            } else {
                break;
            }
        }
        let digits: String = self.input[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        digits
            .parse()
            .map(Token::Integer)
            .map_err(|_| SchemaError::syntax(line, column, "integer literal out of range"))
    }

    pub(crate) fn next_token(&mut self) -> Result<Spanned, SchemaError> {
        self.skip_trivia();
        let (line, column) = (self.line, self.column);
        let spanned = |token| Spanned {
            token,
            line,
            column,
        };

        let ch = match self.peek_char() {
            Some(c) => c,
            None => return Ok(spanned(Token::Eof)),
        };

        let single = match ch {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '<' => Some(Token::LAngle),
            '>' => Some(Token::RAngle),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            ':' => Some(Token::Colon),
            ';' => Some(Token::Semicolon),
            ',' => Some(Token::Comma),
            '@' => Some(Token::At),
            '=' => Some(Token::Equals),
            _ => None,
        };
        if let Some(token) = single {
            self.next_char();
            return Ok(spanned(token));
        }

        if ch.is_ascii_digit() {
            return self.read_integer(line, column).map(spanned);
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(spanned(Token::Identifier(self.read_identifier())));
        }

        Err(SchemaError::syntax(
            line,
            column,
            format!("unexpected character '{}'", ch),
        ))
    }
}
