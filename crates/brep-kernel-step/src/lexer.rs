//! Part 21 (STEP physical file format) lexer.
//!
//! A forward-only cursor over one record body. Tokens are coarse: everything
//! that is not a number is text, and the decoder gives text its meaning from
//! position.
//!
//! - Keywords and identifiers (e.g., `CARTESIAN_POINT`)
//! - Numbers (e.g., `1.5E-10`, `-3.`, `42`)
//! - Quoted literals, markers kept (e.g., `'name'`, `.T.`, `.UNSPECIFIED.`)
//! - Any other single character (`(`, `)`, `#`, `$`, `*`, `=`)

use thiserror::Error;

/// Delimiters skipped between tokens.
pub const DELIMITERS: &[u8] = b", \n\t\r";

/// Characters that open a literal running to the matching close.
pub const QUOTES: &[u8] = b".'";

/// A lexical token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    /// End of input.
    Absent,
    /// Keyword, quoted literal or punctuation, as written.
    Text(&'a str),
    /// Numeric literal.
    Number(f64),
}

impl<'a> Token<'a> {
    /// Whether this is the text token `s`.
    pub fn is(&self, s: &str) -> bool {
        matches!(self, Token::Text(t) if *t == s)
    }

    /// The text of a text token.
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Token::Text(t) => Some(*t),
            _ => None,
        }
    }
}

/// A malformed token.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at byte {offset}")]
pub struct LexError {
    /// Byte offset into the lexed text.
    pub offset: usize,
    /// What went wrong.
    pub message: String,
}

/// Cursor over the tokens of a text.
///
/// Cloning a lexer snapshots its position; there is no rewind.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    delimiters: &'a [u8],
    quotes: &'a [u8],
    current: Token<'a>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer with the Part 21 delimiter and quote sets.
    pub fn new(input: &'a str) -> Self {
        Self::with_sets(input, DELIMITERS, QUOTES)
    }

    /// Create a lexer with custom delimiter and quote sets.
    pub fn with_sets(input: &'a str, delimiters: &'a [u8], quotes: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            delimiters,
            quotes,
            current: Token::Absent,
        }
    }

    /// The most recently read token. Does not advance.
    pub fn current(&self) -> Token<'a> {
        self.current
    }

    /// Byte offset of the cursor.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Whether only delimiters remain. Does not advance.
    pub fn is_exhausted(&self) -> bool {
        self.input.as_bytes()[self.pos..]
            .iter()
            .all(|b| self.delimiters.contains(b))
    }

    /// The token `advance` would return, without consuming it.
    pub fn peek(&self) -> Result<Token<'a>, LexError> {
        self.clone().advance()
    }

    /// Read the next token and make it current.
    pub fn advance(&mut self) -> Result<Token<'a>, LexError> {
        let input = self.input;
        let bytes = input.as_bytes();
        while self.pos < bytes.len() && self.delimiters.contains(&bytes[self.pos]) {
            self.pos += 1;
        }

        let token = match bytes.get(self.pos) {
            None => Token::Absent,
            Some(&b) if b.is_ascii_digit() || b == b'-' || b == b'+' => self.read_number()?,
            Some(&b) if b.is_ascii_alphabetic() || b == b'_' => self.read_word(),
            Some(&b) if self.quotes.contains(&b) => self.read_literal(b)?,
            Some(_) => self.read_char(),
        };
        self.current = token;
        Ok(token)
    }

    fn read_number(&mut self) -> Result<Token<'a>, LexError> {
        let input = self.input;
        match fast_float::parse_partial::<f64, _>(&input.as_bytes()[self.pos..]) {
            Ok((value, consumed)) if consumed > 0 && value.is_finite() => {
                self.pos += consumed;
                Ok(Token::Number(value))
            }
            Ok((_, consumed)) if consumed > 0 => Err(self.error("number is not finite")),
            _ => Err(self.error("malformed number")),
        }
    }

    fn read_word(&mut self) -> Token<'a> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
        {
            self.pos += 1;
        }
        Token::Text(&self.input[start..self.pos])
    }

    fn read_literal(&mut self, marker: u8) -> Result<Token<'a>, LexError> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut i = start + 1;
        loop {
            match bytes.get(i) {
                None => return Err(self.error("unterminated literal")),
                // '' inside a string is an escaped quote
                Some(&b) if b == marker && marker == b'\'' && bytes.get(i + 1) == Some(&b'\'') => {
                    i += 2
                }
                Some(&b) if b == marker => break,
                Some(_) => i += 1,
            }
        }
        self.pos = i + 1;
        Ok(Token::Text(&self.input[start..self.pos]))
    }

    fn read_char(&mut self) -> Token<'a> {
        let start = self.pos;
        let len = self.input[start..].chars().next().map_or(1, char::len_utf8);
        self.pos += len;
        Token::Text(&self.input[start..self.pos])
    }

    fn error(&self, message: &str) -> LexError {
        LexError {
            offset: self.pos,
            message: message.to_string(),
        }
    }
}
