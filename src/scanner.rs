//! Byte cursor over source text.
//!
//! The scanner knows nothing about the language. It tracks the current
//! offset together with a 1-based line and column, and offers the small
//! set of character and substring matchers the lexer and the expander are
//! built from. Only ASCII bytes are ever matched, so every offset a caller
//! slices at lands on a char boundary.

#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    start: usize,
    curr: usize,
    line: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source,
            start: 0,
            curr: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.curr >= self.source.len()
    }

    /// Current byte, without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.curr).copied()
    }

    /// The byte most recently consumed.
    pub fn previous(&self) -> Option<u8> {
        let index = self.curr.checked_sub(1)?;
        self.source.as_bytes().get(index).copied()
    }

    /// Consumes one byte, keeping line and column up to date.
    ///
    /// UTF-8 continuation bytes do not advance the column, so columns count
    /// characters rather than bytes.
    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.curr += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if byte & 0xC0 != 0x80 {
            self.column += 1;
        }
        Some(byte)
    }

    pub fn check(&self, expected: u8) -> bool {
        self.peek() == Some(expected)
    }

    /// Consumes the current byte if it equals `expected`.
    pub fn match_byte(&mut self, expected: u8) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn check_str(&self, expected: &str) -> bool {
        self.rest().starts_with(expected)
    }

    /// Consumes `expected` if the remaining input starts with it.
    pub fn match_str(&mut self, expected: &str) -> bool {
        if !self.check_str(expected) {
            return false;
        }
        for _ in 0..expected.len() {
            self.advance();
        }
        true
    }

    /// Advances up to (not past) the next `stop` byte, or to the end.
    pub fn advance_until(&mut self, stop: u8) {
        while !self.is_at_end() && !self.check(stop) {
            self.advance();
        }
    }

    /// Advances up to (not past) the next occurrence of `stop`, or to the end.
    pub fn advance_until_str(&mut self, stop: &str) {
        while !self.is_at_end() && !self.check_str(stop) {
            self.advance();
        }
    }

    /// Starts a new lexeme at the current position.
    pub fn mark(&mut self) {
        self.start = self.curr;
    }

    /// Text consumed since the last [`mark`](Self::mark).
    pub fn lexeme(&self) -> &'a str {
        self.slice(self.start, self.curr)
    }

    pub fn slice(&self, from: usize, to: usize) -> &'a str {
        self.source.get(from..to).unwrap_or("")
    }

    pub fn rest(&self) -> &'a str {
        self.source.get(self.curr..).unwrap_or("")
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn position(&self) -> usize {
        self.curr
    }

    /// Line and column of the next byte to be consumed.
    pub fn location(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}
