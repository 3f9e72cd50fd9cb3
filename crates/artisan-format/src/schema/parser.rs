// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive-descent parser producing raw type metadata.
//!
//! ```text
//! schema  := item*
//! item    := "struct" IDENT "{" field* "}" [";"]
//!          | "union" IDENT "{" variant* "}" [";"]
//! field   := IDENT ":" ["optional"] type ["@" INT] ";"
//! variant := IDENT ["=" INT] ("{" field* "}" [";"] | ";")
//! type    := "ref" IDENT
//!          | "seq" "<" type ["," INT] ">"
//!          | "[" type ";" INT "]"
//!          | IDENT ["<" INT ">"]
//! ```

use super::lexer::{Lexer, Spanned, Token};
use super::SchemaError;
use artisan_core::{RawField, RawKind, RawType, RawVariant};

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Spanned,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a str) -> Result<Self, SchemaError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> Result<(), SchemaError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> SchemaError {
        SchemaError::syntax(self.current.line, self.current.column, message)
    }

    fn unexpected(&self, expected: &str) -> SchemaError {
        self.error(format!(
            "expected {}, found {}",
            expected,
            self.current.token.describe()
        ))
    }

    fn expect(&mut self, token: Token) -> Result<(), SchemaError> {
        if self.current.token == token {
            self.advance()
        } else {
            Err(self.unexpected(&token.describe()))
        }
    }

    fn eat(&mut self, token: &Token) -> Result<bool, SchemaError> {
        if &self.current.token == token {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(&self.current.token, Token::Identifier(name) if name == keyword)
    }

    fn identifier(&mut self) -> Result<String, SchemaError> {
        match &self.current.token {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn integer(&mut self) -> Result<u64, SchemaError> {
        match self.current.token {
            Token::Integer(n) => {
                self.advance()?;
                Ok(n)
            }
            _ => Err(self.unexpected("integer")),
        }
    }

    /// Integer literal that must fit `T`.
    fn bounded_integer<T: TryFrom<u64>>(&mut self, what: &str) -> Result<T, SchemaError> {
        let (line, column) = (self.current.line, self.current.column);
        let n = self.integer()?;
        T::try_from(n)
            .map_err(|_| SchemaError::syntax(line, column, format!("{} {} out of range", what, n)))
    }

    pub(crate) fn parse_schema(&mut self) -> Result<Vec<RawType>, SchemaError> {
        let mut types = Vec::new();
        while self.current.token != Token::Eof {
            types.push(self.parse_item()?);
        }
        Ok(types)
    }

    fn parse_item(&mut self) -> Result<RawType, SchemaError> {
        let raw = if self.at_keyword("struct") {
            self.advance()?;
            let name = self.identifier()?;
            RawType::structure(name, self.parse_field_block()?)
        } else if self.at_keyword("union") {
            self.advance()?;
            let name = self.identifier()?;
            self.expect(Token::LBrace)?;
            let mut variants = Vec::new();
            while self.current.token != Token::RBrace {
                variants.push(self.parse_variant()?);
            }
            self.advance()?;
            RawType::union(name, variants)
        } else {
            return Err(self.unexpected("'struct' or 'union'"));
        };
        self.eat(&Token::Semicolon)?;
        Ok(raw)
    }

    fn parse_field_block(&mut self) -> Result<Vec<RawField>, SchemaError> {
        self.expect(Token::LBrace)?;
        let mut fields = Vec::new();
        while self.current.token != Token::RBrace {
            fields.push(self.parse_field()?);
        }
        self.advance()?;
        Ok(fields)
    }

    fn parse_field(&mut self) -> Result<RawField, SchemaError> {
        let name = self.identifier()?;
        self.expect(Token::Colon)?;
        let optional = if self.at_keyword("optional") {
            self.advance()?;
            true
        } else {
            false
        };
        let mut field = RawField::new(name, self.parse_type()?);
        field.optional = optional;
        if self.eat(&Token::At)? {
            field.ordinal = Some(self.bounded_integer::<u32>("ordinal")?);
        }
        self.expect(Token::Semicolon)?;
        Ok(field)
    }

    fn parse_variant(&mut self) -> Result<RawVariant, SchemaError> {
        let name = self.identifier()?;
        let tag = if self.eat(&Token::Equals)? {
            Some(self.bounded_integer::<u8>("variant tag")?)
        } else {
            None
        };
        let fields = if self.current.token == Token::LBrace {
            let fields = self.parse_field_block()?;
            self.eat(&Token::Semicolon)?;
            fields
        } else {
            self.expect(Token::Semicolon)?;
            Vec::new()
        };
        Ok(RawVariant { name, tag, fields })
    }

    fn parse_type(&mut self) -> Result<RawKind, SchemaError> {
        if self.at_keyword("ref") {
            self.advance()?;
            return Ok(RawKind::Indirect(self.identifier()?));
        }

        if self.at_keyword("seq") {
            self.advance()?;
            self.expect(Token::LAngle)?;
            let element = self.parse_type()?;
            let bound = if self.eat(&Token::Comma)? {
                Some(self.bounded_integer::<usize>("sequence bound")?)
            } else {
                None
            };
            self.expect(Token::RAngle)?;
            return Ok(RawKind::Sequence(Box::new(element), bound));
        }

        if self.eat(&Token::LBracket)? {
            let element = self.parse_type()?;
            self.expect(Token::Semicolon)?;
            let length = self.bounded_integer::<usize>("array length")?;
            self.expect(Token::RBracket)?;
            return Ok(RawKind::array(element, length));
        }

        let name = self.identifier()?;
        if self.eat(&Token::LAngle)? {
            let bound = self.bounded_integer::<usize>("length bound")?;
            self.expect(Token::RAngle)?;
            return Ok(RawKind::Bounded(name, bound));
        }
        Ok(RawKind::Named(name))
    }
}
