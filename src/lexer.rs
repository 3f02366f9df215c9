//! Lexer for tokenizing Firefox preference files
//!
//! This module converts character streams into tokens for parsing `user.js`
//! and `prefs.js` files. It handles JavaScript escape sequences, tracks
//! line/column numbers for error reporting, and surfaces `//` comments that
//! stand on their own line so they can be carried as entry annotations.

use crate::error::{Error, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Token types produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier (e.g., user_pref, pref, lock_pref, sticky_pref)
    Identifier(String),
    /// String value with escape sequences already processed
    String(String),
    /// Integer literal
    Integer(i64),
    /// Fractional or exponent literal
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    /// `//` comment that is the first thing on its line, text after the slashes trimmed
    Comment(String),
    /// End of input
    Eof,
}

/// Lexer for tokenizing Firefox preference files
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Whether a non-comment token was already produced on the current line
    line_has_token: bool,
    /// Position where the most recently returned token started
    token_start: (usize, usize),
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
            line_has_token: false,
            token_start: (1, 1),
        }
    }

    /// Line and column where the last returned token started
    pub fn token_start(&self) -> (usize, usize) {
        self.token_start
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            self.skip_whitespace();
            self.token_start = (self.line, self.column);

            let c = match self.chars.peek() {
                Some(&c) => c,
                None => return Ok(Token::Eof),
            };

            if c == '/' {
                match self.peek_second() {
                    Some('/') => {
                        let text = self.lex_line_comment();
                        if self.line_has_token {
                            // trailing comment after a statement
                            continue;
                        }
                        return Ok(Token::Comment(text));
                    }
                    Some('*') => {
                        self.skip_block_comment()?;
                        continue;
                    }
                    _ => {
                        return Err(Error::Lexer {
                            message: "Unexpected character: '/'".to_string(),
                            line: self.line,
                            column: self.column,
                        })
                    }
                }
            }

            let token = match c {
                '(' => {
                    self.advance();
                    Token::LeftParen
                }
                ')' => {
                    self.advance();
                    Token::RightParen
                }
                ',' => {
                    self.advance();
                    Token::Comma
                }
                ';' => {
                    self.advance();
                    Token::Semicolon
                }
                '"' => self.lex_string()?,
                '-' | '0'..='9' => self.lex_number()?,
                'a'..='z' | 'A'..='Z' | '_' => self.lex_identifier(),
                _ => {
                    return Err(Error::Lexer {
                        message: format!("Unexpected character: '{}'", c),
                        line: self.line,
                        column: self.column,
                    })
                }
            };
            self.line_has_token = true;
            return Ok(token);
        }
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    /// Consume one character, keeping line/column in sync
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.line_has_token = false;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn advance(&mut self) {
        self.bump();
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || c == '\u{feff}' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Consume a `//` comment up to (not including) the newline
    fn lex_line_comment(&mut self) -> String {
        self.advance();
        self.advance();
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        text.trim().to_string()
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start_line = self.line;
        let start_col = self.column;
        self.advance();
        self.advance();
        loop {
            match self.bump() {
                Some('*') => {
                    if let Some(&'/') = self.chars.peek() {
                        self.advance();
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => {
                    return Err(Error::Lexer {
                        message: "Unterminated block comment".to_string(),
                        line: start_line,
                        column: start_col,
                    })
                }
            }
        }
    }

    /// Lex an identifier (e.g., user_pref, pref, true, false, null)
    fn lex_identifier(&mut self) -> Token {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            _ => Token::Identifier(ident),
        }
    }

    /// Lex a string literal (only double-quoted strings in preference files)
    fn lex_string(&mut self) -> Result<Token> {
        let start_line = self.line;
        let start_col = self.column;

        // opening quote
        self.advance();

        let mut result = String::new();

        loop {
            match self.bump() {
                Some('"') => return Ok(Token::String(result)),
                Some('\\') => {
                    let escaped = self.lex_escape()?;
                    result.push(escaped);
                }
                Some(c) => result.push(c),
                None => {
                    return Err(Error::Lexer {
                        message: "Unterminated string literal".to_string(),
                        line: start_line,
                        column: start_col,
                    });
                }
            }
        }
    }

    /// Decode the escape sequence following a backslash
    fn lex_escape(&mut self) -> Result<char> {
        let c = match self.bump() {
            Some(c) => c,
            None => {
                return Err(Error::Lexer {
                    message: "Unexpected end of input in escape sequence".to_string(),
                    line: self.line,
                    column: self.column,
                })
            }
        };

        match c {
            '"' => Ok('"'),
            '\'' => Ok('\''),
            '\\' => Ok('\\'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'b' => Ok('\x08'),
            'f' => Ok('\x0c'),
            '0' => {
                if let Some(&'0') = self.chars.peek() {
                    return Err(Error::Lexer {
                        message: "Octal escape sequences are not supported. Use \\x00 instead."
                            .to_string(),
                        line: self.line,
                        column: self.column,
                    });
                }
                Ok('\x00')
            }
            'x' => {
                let hex = self.take_hex_digits(2);
                match (hex.len(), u8::from_str_radix(&hex, 16)) {
                    (2, Ok(byte)) => Ok(byte as char),
                    _ => Err(Error::Lexer {
                        message: format!("Invalid hex escape: \\x{}", hex),
                        line: self.line,
                        column: self.column,
                    }),
                }
            }
            'u' => {
                let hex = self.take_hex_digits(4);
                match (hex.len(), u32::from_str_radix(&hex, 16)) {
                    (4, Ok(code)) => Ok(char::from_u32(code).unwrap_or('\u{FFFD}')),
                    _ => Err(Error::Lexer {
                        message: format!("Invalid unicode escape: \\u{}", hex),
                        line: self.line,
                        column: self.column,
                    }),
                }
            }
            other => Err(Error::Lexer {
                message: format!("Invalid escape sequence: \\{}", other),
                line: self.line,
                column: self.column,
            }),
        }
    }

    fn take_hex_digits(&mut self, max: usize) -> String {
        let mut hex = String::new();
        while hex.len() < max {
            match self.chars.peek() {
                Some(&c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        hex
    }

    /// Lex a number (integer or float, including scientific notation)
    fn lex_number(&mut self) -> Result<Token> {
        let start_col = self.column;
        let mut num_str = String::new();
        let mut is_float = false;

        if let Some(&'-') = self.chars.peek() {
            num_str.push('-');
            self.advance();
        }

        self.take_digits(&mut num_str);

        if let Some(&'.') = self.chars.peek() {
            is_float = true;
            num_str.push('.');
            self.advance();
            self.take_digits(&mut num_str);
        }

        if let Some(&('e' | 'E')) = self.chars.peek() {
            is_float = true;
            num_str.push('e');
            self.advance();

            if let Some(&sign) = self.chars.peek() {
                if sign == '+' || sign == '-' {
                    num_str.push(sign);
                    self.advance();
                }
            }

            let before = num_str.len();
            self.take_digits(&mut num_str);
            if num_str.len() == before {
                return Err(Error::Lexer {
                    message: "Missing exponent digits in scientific notation".to_string(),
                    line: self.line,
                    column: self.column,
                });
            }
        }

        let parsed = if is_float {
            num_str.parse::<f64>().ok().map(Token::Float)
        } else {
            num_str.parse::<i64>().ok().map(Token::Integer)
        };

        parsed.ok_or_else(|| Error::Lexer {
            message: format!("Failed to parse number: {}", num_str),
            line: self.line,
            column: start_col,
        })
    }

    fn take_digits(&mut self, out: &mut String) {
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                out.push(c);
                self.advance();
            } else {
                break;
            }
        }
    }
}
