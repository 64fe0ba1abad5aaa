//! Formula tokenizer
//!
//! A hand-written scanner that splits formula text into typed tokens while
//! keeping every input character inside some token's text: concatenating the
//! token texts in order reproduces the input exactly. The rewriter relies on
//! this to reassemble a formula after offsetting its range operands, so no
//! token ever drops or normalizes characters.

use crate::error::{FormulaError, FormulaResult};
use flatsheet_core::{CellAddress, MAX_ROWS};

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A value-producing token; see [`OperandKind`]
    Operand(OperandKind),
    /// Function name (the following `(` is a separate token)
    Function,
    /// Arithmetic, comparison or concatenation operator
    Operator,
    /// Argument separator (`,` or `;`)
    Separator,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// A run of whitespace, preserved verbatim
    Whitespace,
}

/// Operand sub-kinds; only [`OperandKind::Range`] is subject to offsetting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Cell or range reference ("A1", "$B$2", "A1:B2")
    Range,
    /// Numeric literal
    Number,
    /// String literal, quotes included
    Text,
    /// TRUE / FALSE
    Logical,
    /// Error literal ("#REF!", "#DIV/0!", ...)
    Error,
    /// Named range, sheet-qualified reference, or other identifier
    Identifier,
}

/// One formula token: a kind plus its exact text span
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// True for operand tokens holding a cell or range reference
    pub fn is_range_operand(&self) -> bool {
        self.kind == TokenKind::Operand(OperandKind::Range)
    }
}

/// Tokenize formula text
///
/// The leading `=` (if present) comes back as an Operator token so that the
/// concatenation invariant holds for the whole input.
pub fn tokenize(input: &str) -> FormulaResult<Vec<Token>> {
    Tokenizer::new(input).run()
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn run(mut self) -> FormulaResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while !self.is_at_end() {
            tokens.push(self.scan_token()?);
        }
        Ok(tokens)
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        let c = self.peek_char().unwrap();

        if c.is_whitespace() {
            return Ok(self.scan_whitespace());
        }

        if c == '"' {
            return self.scan_string();
        }

        if c == '\'' {
            return self.scan_quoted_sheet_reference();
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return Ok(self.scan_number());
        }

        if c == '#' {
            return Ok(self.scan_error_literal());
        }

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            return Ok(self.scan_identifier_or_ref());
        }

        // Single- and two-character operators and delimiters
        match c {
            '(' => {
                self.advance();
                return Ok(Token::new(TokenKind::OpenParen, "("));
            }
            ')' => {
                self.advance();
                return Ok(Token::new(TokenKind::CloseParen, ")"));
            }
            ',' => {
                self.advance();
                return Ok(Token::new(TokenKind::Separator, ","));
            }
            ';' => {
                self.advance();
                return Ok(Token::new(TokenKind::Separator, ";"));
            }
            '+' | '-' | '*' | '/' | '^' | '%' | '&' | '=' | ':' | '{' | '}' => {
                self.advance();
                return Ok(Token::new(TokenKind::Operator, c.to_string()));
            }
            '<' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    return Ok(Token::new(TokenKind::Operator, "<="));
                }
                if self.peek_char() == Some('>') {
                    self.advance();
                    return Ok(Token::new(TokenKind::Operator, "<>"));
                }
                return Ok(Token::new(TokenKind::Operator, "<"));
            }
            '>' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    return Ok(Token::new(TokenKind::Operator, ">="));
                }
                return Ok(Token::new(TokenKind::Operator, ">"));
            }
            _ => {}
        }

        Err(self.error(format!("unexpected character '{}'", c)))
    }

    fn scan_whitespace(&mut self) -> Token {
        let start = self.pos;
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
        Token::new(TokenKind::Whitespace, &self.input[start..self.pos])
    }

    fn scan_string(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance(); // opening quote

        loop {
            match self.peek_char() {
                Some('"') => {
                    // Doubled quote is an escaped quote, keep scanning
                    if self.peek_char_at(1) == Some('"') {
                        self.advance();
                        self.advance();
                    } else {
                        self.advance(); // closing quote
                        break;
                    }
                }
                Some(_) => self.advance(),
                None => return Err(self.error("unterminated string literal".into())),
            }
        }

        Ok(Token::new(
            TokenKind::Operand(OperandKind::Text),
            &self.input[start..self.pos],
        ))
    }

    /// Quoted sheet name ('My Sheet'!A1). Passed through as an identifier
    /// operand: sheet-qualified references are never offset.
    fn scan_quoted_sheet_reference(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance(); // opening quote

        loop {
            match self.peek_char() {
                Some('\'') => {
                    if self.peek_char_at(1) == Some('\'') {
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        break;
                    }
                }
                Some(_) => self.advance(),
                None => return Err(self.error("unterminated sheet name".into())),
            }
        }

        if self.peek_char() != Some('!') {
            return Err(self.error("quoted sheet name without '!'".into()));
        }
        self.advance();
        self.consume_reference_chars();
        if self.peek_char() == Some(':') && self.reference_follows(1) {
            self.advance();
            self.consume_reference_chars();
        }

        Ok(Token::new(
            TokenKind::Operand(OperandKind::Identifier),
            &self.input[start..self.pos],
        ))
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            let mark = self.pos;
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            if self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                    self.advance();
                }
            } else {
                // Not an exponent after all (e.g. "1E" in a named range)
                self.pos = mark;
            }
        }

        // Integer endpoints around ':' form a whole-row range ("1:3")
        let text = &self.input[start..self.pos];
        if is_row_reference(text) && self.peek_char() == Some(':') {
            let mark = self.pos;
            self.advance(); // ':'
            self.consume_reference_chars();
            let second = &self.input[mark + 1..self.pos];
            if is_row_reference(second) {
                return Token::new(
                    TokenKind::Operand(OperandKind::Range),
                    &self.input[start..self.pos],
                );
            }
            self.pos = mark;
        }

        Token::new(TokenKind::Operand(OperandKind::Number), text)
    }

    fn scan_error_literal(&mut self) -> Token {
        let start = self.pos;
        self.advance(); // '#'
        while self.peek_char().map_or(false, |c| {
            c.is_ascii_alphanumeric() || c == '!' || c == '/' || c == '?'
        }) {
            self.advance();
        }
        Token::new(
            TokenKind::Operand(OperandKind::Error),
            &self.input[start..self.pos],
        )
    }

    fn scan_identifier_or_ref(&mut self) -> Token {
        let start = self.pos;
        self.consume_reference_chars();

        // Sheet-qualified reference: swallow the '!' and the cell part into
        // one identifier operand (not offset; see the rewriter)
        if self.peek_char() == Some('!') {
            self.advance();
            self.consume_reference_chars();
            if self.peek_char() == Some(':') && self.reference_follows(1) {
                self.advance();
                self.consume_reference_chars();
            }
            return Token::new(
                TokenKind::Operand(OperandKind::Identifier),
                &self.input[start..self.pos],
            );
        }

        let text = &self.input[start..self.pos];

        // A name directly followed by '(' is a function call, even when it
        // would otherwise parse as a cell reference (e.g. LOG10)
        if self.peek_char() == Some('(') {
            return Token::new(TokenKind::Function, text);
        }

        let upper = text.to_ascii_uppercase();
        if upper == "TRUE" || upper == "FALSE" {
            return Token::new(TokenKind::Operand(OperandKind::Logical), text);
        }

        if is_cell_reference(text) {
            // "A1:B2" style range: merge both endpoints into one token so the
            // rewriter can offset them independently
            if self.peek_char() == Some(':') && self.reference_follows(1) {
                self.advance(); // ':'
                self.consume_reference_chars();
                let full = &self.input[start..self.pos];
                let (first, second) = full.split_once(':').unwrap();
                if is_cell_reference(first) && is_cell_reference(second) {
                    return Token::new(TokenKind::Operand(OperandKind::Range), full);
                }
                // Second half is not a reference; back out to just the first
                self.pos = start + first.len();
                return Token::new(TokenKind::Operand(OperandKind::Range), first);
            }
            return Token::new(TokenKind::Operand(OperandKind::Range), text);
        }

        // Whole-column range ("A:A", "$B:C"): both endpoints name a column.
        // A digits-only scan never lands here, but "$1" does, so whole-row
        // endpoints with a lock are matched here too.
        if (is_column_reference(text) || is_row_reference(text))
            && self.peek_char() == Some(':')
        {
            let mark = self.pos;
            self.advance(); // ':'
            self.consume_reference_chars();
            let second = &self.input[mark + 1..self.pos];
            if (is_column_reference(text) && is_column_reference(second))
                || (is_row_reference(text) && is_row_reference(second))
            {
                return Token::new(
                    TokenKind::Operand(OperandKind::Range),
                    &self.input[start..self.pos],
                );
            }
            // Endpoints on different axes do not pair up
            self.pos = mark;
        }

        Token::new(TokenKind::Operand(OperandKind::Identifier), text)
    }

    /// Consume the character set that can appear inside a reference or name
    fn consume_reference_chars(&mut self) {
        while self.peek_char().map_or(false, |c| {
            c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.'
        }) {
            self.advance();
        }
    }

    /// True if a reference-ish character starts at `offset` chars ahead
    fn reference_follows(&self, offset: usize) -> bool {
        self.peek_char_at(offset)
            .map_or(false, |c| c.is_ascii_alphabetic() || c == '$')
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn error(&self, reason: String) -> FormulaError {
        FormulaError::Tokenize {
            formula: self.input.to_string(),
            reason,
        }
    }
}

/// True if `text` parses as a single in-bounds cell reference
fn is_cell_reference(text: &str) -> bool {
    CellAddress::parse(text).is_ok()
}

/// True if `text` is one endpoint of a whole-column range ("A", "$IV")
fn is_column_reference(text: &str) -> bool {
    let body = text.strip_prefix('$').unwrap_or(text);
    !body.is_empty()
        && body.bytes().all(|b| b.is_ascii_alphabetic())
        && CellAddress::letters_to_column(body).is_ok()
}

/// True if `text` is one endpoint of a whole-row range ("3", "$12")
fn is_row_reference(text: &str) -> bool {
    let body = text.strip_prefix('$').unwrap_or(text);
    !body.is_empty()
        && body.bytes().all(|b| b.is_ascii_digit())
        && body
            .parse::<u32>()
            .map_or(false, |row| (1..=MAX_ROWS).contains(&row))
}
