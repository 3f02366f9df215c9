//! Parser for Firefox preference files (user.js, prefs.js)
//!
//! This module provides a recursive descent parser that converts Firefox's
//! JavaScript-like preference syntax into structured entries.
//!
//! # Format
//!
//! ```text
//! // HomePage: "none"
//! user_pref("preference.name", value);
//! pref("preference.name", value);           // default
//! lock_pref("preference.name", value);      // locked
//! sticky_pref("preference.name", value);    // sticky
//! ```
//!
//! `//` comments standing on their own lines directly above a statement are
//! attached to that entry as its `comment`. Trailing and block comments are
//! dropped.
//!
//! # Example
//!
//! ```rust
//! use ffskel::{parse_prefs_js, PrefType, PrefValue};
//!
//! let content = r#"
//!     // DontCheckDefaultBrowser: true
//!     user_pref("browser.shell.checkDefaultBrowser", false);
//!     user_pref("browser.startup.page", 0);
//! "#;
//!
//! let prefs = parse_prefs_js(content)?;
//! assert_eq!(prefs[0].value, PrefValue::Bool(false));
//! assert_eq!(prefs[0].comment.as_deref(), Some("DontCheckDefaultBrowser: true"));
//! assert_eq!(prefs[1].pref_type, PrefType::User);
//! # Ok::<(), ffskel::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token};
use crate::types::{PrefEntry, PrefType, PrefValue};
use std::path::Path;

/// Parse preference text and return its entries in file order
pub fn parse_prefs_js(content: &str) -> Result<Vec<PrefEntry>> {
    let mut parser = Parser::new(content)?;
    parser.parse()
}

/// Parse a preference file directly from a file path
pub fn parse_prefs_js_file(path: &Path) -> Result<Vec<PrefEntry>> {
    let content = std::fs::read_to_string(path)?;
    parse_prefs_js(&content)
}

/// Parser for Firefox preference files
struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Current lookahead token
    current: Token,
    /// Where the lookahead token starts
    position: (usize, usize),
    /// Own-line comments seen since the previous statement
    pending_comments: Vec<String>,
    in_statement: bool,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self> {
        let mut parser = Parser {
            lexer: Lexer::new(input),
            current: Token::Eof,
            position: (1, 1),
            pending_comments: Vec::new(),
            in_statement: false,
        };
        parser.advance()?;
        Ok(parser)
    }

    fn parse(&mut self) -> Result<Vec<PrefEntry>> {
        let mut preferences = Vec::new();

        while self.current != Token::Eof {
            preferences.push(self.parse_statement()?);
        }

        Ok(preferences)
    }

    /// Parse a single statement: pref_type "(" key "," value ")" ";"
    fn parse_statement(&mut self) -> Result<PrefEntry> {
        let line = self.position.0;
        let comment = if self.pending_comments.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending_comments).join("\n"))
        };

        self.in_statement = true;
        let pref_type = self.parse_pref_type_identifier()?;
        self.expect_token(Token::LeftParen)?;
        let key = self.expect_string()?;
        self.expect_token(Token::Comma)?;
        let value = self.parse_value()?;
        self.expect_token(Token::RightParen)?;
        self.in_statement = false;
        self.expect_token(Token::Semicolon)?;

        Ok(PrefEntry {
            key,
            value,
            pref_type,
            comment,
            line: Some(line),
        })
    }

    fn parse_pref_type_identifier(&mut self) -> Result<PrefType> {
        match &self.current {
            Token::Identifier(ident) => match PrefType::from_function_name(ident) {
                Some(pref_type) => {
                    self.advance()?;
                    Ok(pref_type)
                }
                None => Err(self.error(format!(
                    "Unknown pref function '{}'. Expected user_pref, pref, lock_pref, or sticky_pref",
                    ident
                ))),
            },
            token => Err(self.error(format!(
                "Expected pref function name (user_pref, pref, lock_pref, sticky_pref), got {:?}",
                token
            ))),
        }
    }

    /// Parse a value (string, number, boolean, null)
    fn parse_value(&mut self) -> Result<PrefValue> {
        let value = match std::mem::replace(&mut self.current, Token::Eof) {
            Token::String(s) => PrefValue::String(s),
            Token::Integer(n) => PrefValue::Integer(n),
            Token::Float(n) => PrefValue::from_f64(n),
            Token::Boolean(b) => PrefValue::Bool(b),
            Token::Null => PrefValue::Null,
            Token::Eof => return Err(self.error("Unexpected end of input".to_string())),
            token => {
                let message = format!("Expected value, got {:?}", token);
                self.current = token;
                return Err(self.error(message));
            }
        };
        self.advance()?;
        Ok(value)
    }

    /// Expect a specific token and consume it
    fn expect_token(&mut self, expected: Token) -> Result<()> {
        if self.current == expected {
            return self.advance();
        }
        let message = match &self.current {
            Token::Eof => "Unexpected end of input".to_string(),
            token => format!("Expected {:?}, got {:?}", expected, token),
        };
        Err(self.error(message))
    }

    /// Expect a string token and return its value
    fn expect_string(&mut self) -> Result<String> {
        match std::mem::replace(&mut self.current, Token::Eof) {
            Token::String(s) => {
                self.advance()?;
                Ok(s)
            }
            Token::Eof => Err(self.error("Unexpected end of input".to_string())),
            token => {
                let message = format!("Expected string, got {:?}", token);
                self.current = token;
                Err(self.error(message))
            }
        }
    }

    /// Advance to the next significant token, collecting annotations on the way
    fn advance(&mut self) -> Result<()> {
        loop {
            let token = self.lexer.next_token()?;
            self.position = self.lexer.token_start();
            match token {
                Token::Comment(text) => {
                    if !self.in_statement {
                        self.pending_comments.push(text);
                    }
                }
                token => {
                    self.current = token;
                    return Ok(());
                }
            }
        }
    }

    fn error(&self, message: String) -> Error {
        Error::Parser {
            line: self.position.0,
            column: self.position.1,
            message,
        }
    }
}
