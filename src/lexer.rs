//! Tokenization for flint
//!
//! The lexer turns source text into a flat token stream terminated by a
//! single [`TokenKind::Eod`] token. It understands the three quoting forms,
//! comments, statement separators and the balanced `$(...)` spans that may
//! appear inside words and double-quoted strings.

use std::fmt;

use thiserror::Error;

use crate::scanner::Scanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Pipe,         // |
    And,          // && or `and`
    Or,           // || or `or`
    Ampersand,    // &
    StatementEnd, // ; or newline
    Eod,
    Error,
    Word,
    DQuotedString,
    SQuotedString,
    If,
    For,
    In,
    By,
    Fun,
    End,
    Else,
    While,
}

impl TokenKind {
    /// Retags a bare word that spells a keyword. Matching is case-sensitive.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "for" => TokenKind::For,
            "if" => TokenKind::If,
            "end" => TokenKind::End,
            "in" => TokenKind::In,
            "fun" => TokenKind::Fun,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "by" => TokenKind::By,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            _ => return None,
        };
        Some(kind)
    }

    /// Words and both kinds of quoted string.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            TokenKind::Word | TokenKind::DQuotedString | TokenKind::SQuotedString
        )
    }

    /// Keywords that may also stand as plain command arguments.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::For
                | TokenKind::In
                | TokenKind::By
                | TokenKind::Fun
                | TokenKind::End
                | TokenKind::Else
                | TokenKind::While
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Pipe => "PIPE",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Ampersand => "AMPERSAND",
            TokenKind::StatementEnd => "STATEMENT_END",
            TokenKind::Eod => "EOD",
            TokenKind::Error => "ERROR",
            TokenKind::Word => "WORD",
            TokenKind::DQuotedString => "DQUOTED_STRING",
            TokenKind::SQuotedString => "SQUOTED_STRING",
            TokenKind::If => "IF",
            TokenKind::For => "FOR",
            TokenKind::In => "IN",
            TokenKind::By => "BY",
            TokenKind::Fun => "FUN",
            TokenKind::End => "END",
            TokenKind::Else => "ELSE",
            TokenKind::While => "WHILE",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexeme with its kind and the 1-based position of its first character.
///
/// Quoted strings store their contents without the surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}

/// The `--log-tokens` line format: `line:column KIND 'lexeme'`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} '{}'",
            self.line,
            self.column,
            self.kind,
            self.lexeme.escape_debug()
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("{line}:{column}: unterminated string, expected closing {delimiter}")]
    UnterminatedString {
        delimiter: &'static str,
        line: usize,
        column: usize,
    },
    #[error("{line}:{column}: unterminated command substitution, expected closing )")]
    UnterminatedSubstitution { line: usize, column: usize },
}

/// Tokenizes `source` into a stream ending with exactly one `Eod` token.
///
/// Any lexical error discards the whole stream.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eod;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

pub struct Lexer<'a> {
    scanner: Scanner<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            scanner: Scanner::new(source),
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_blanks();
            let (line, column) = self.scanner.location();
            self.scanner.mark();

            let Some(c) = self.scanner.advance() else {
                return Ok(Token::new(TokenKind::Eod, "", line, column));
            };

            let kind = match c {
                b'|' if self.scanner.match_byte(b'|') => TokenKind::Or,
                b'|' => TokenKind::Pipe,
                b'&' if self.scanner.match_byte(b'&') => TokenKind::And,
                b'&' => TokenKind::Ampersand,
                b';' | b'\n' => TokenKind::StatementEnd,
                b'(' | b')' => TokenKind::Error,
                b'#' => {
                    self.scanner.advance_until(b'\n');
                    continue;
                }
                b'\'' => return self.single_quoted(line, column),
                b'"' if self.scanner.match_str("\"\"") => return self.triple_quoted(line, column),
                b'"' => return self.double_quoted(line, column),
                _ => return self.word(line, column),
            };
            return Ok(Token::new(kind, self.scanner.lexeme(), line, column));
        }
    }

    fn skip_blanks(&mut self) {
        while matches!(self.scanner.peek(), Some(b' ' | b'\t' | b'\r')) {
            self.scanner.advance();
        }
    }

    fn word(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        while let Some(c) = self.scanner.peek() {
            if c == b'(' && self.scanner.previous() == Some(b'$') {
                self.scanner.advance();
                if !skip_substitution(&mut self.scanner) {
                    return Err(LexError::UnterminatedSubstitution { line, column });
                }
            } else if is_word_byte(c) {
                self.scanner.advance();
            } else {
                break;
            }
        }
        let lexeme = self.scanner.lexeme();
        let kind = TokenKind::keyword(lexeme).unwrap_or(TokenKind::Word);
        Ok(Token::new(kind, lexeme, line, column))
    }

    fn single_quoted(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        self.scanner.mark();
        self.scanner.advance_until(b'\'');
        if self.scanner.is_at_end() {
            return Err(LexError::UnterminatedString {
                delimiter: "'",
                line,
                column,
            });
        }
        let token = Token::new(TokenKind::SQuotedString, self.scanner.lexeme(), line, column);
        self.scanner.advance();
        Ok(token)
    }

    fn double_quoted(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        self.scanner.mark();
        if !skip_double_quoted(&mut self.scanner) {
            return Err(LexError::UnterminatedString {
                delimiter: "\"",
                line,
                column,
            });
        }
        let token = Token::new(TokenKind::DQuotedString, self.scanner.lexeme(), line, column);
        self.scanner.advance();
        Ok(token)
    }

    /// `"""..."""`. When the opening delimiter ends its line, that newline
    /// and a single newline before the closing delimiter are dropped.
    fn triple_quoted(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        let strip = self.scanner.match_byte(b'\n');
        self.scanner.mark();
        self.scanner.advance_until_str("\"\"\"");
        if self.scanner.is_at_end() {
            return Err(LexError::UnterminatedString {
                delimiter: "\"\"\"",
                line,
                column,
            });
        }
        let start = self.scanner.start();
        let mut end = self.scanner.position();
        if strip && end > start && self.scanner.previous() == Some(b'\n') {
            end -= 1;
        }
        let token = Token::new(
            TokenKind::DQuotedString,
            self.scanner.slice(start, end),
            line,
            column,
        );
        self.scanner.match_str("\"\"\"");
        Ok(token)
    }
}

fn is_word_byte(c: u8) -> bool {
    !matches!(
        c,
        b' ' | b'\t' | b'\r' | b'\n' | b'&' | b'|' | b';' | b'(' | b')' | b'"' | b'\''
    )
}

/// Consumes the body of a `$(...)` whose `(` was already consumed, through
/// the matching `)`. Nested parentheses and quotes are balanced. Returns
/// `false` if the input ends first.
pub(crate) fn skip_substitution(scanner: &mut Scanner<'_>) -> bool {
    while let Some(c) = scanner.advance() {
        match c {
            b'(' => {
                if !skip_substitution(scanner) {
                    return false;
                }
            }
            b')' => return true,
            b'\'' => {
                scanner.advance_until(b'\'');
                if !scanner.match_byte(b'\'') {
                    return false;
                }
            }
            b'"' => {
                if !skip_double_quoted(scanner) {
                    return false;
                }
                scanner.advance();
            }
            _ => {}
        }
    }
    false
}

/// Advances to the `"` closing a double-quoted string, without consuming it.
/// A backslash protects the next character.
pub(crate) fn skip_double_quoted(scanner: &mut Scanner<'_>) -> bool {
    while !scanner.is_at_end() && !scanner.check(b'"') {
        if scanner.match_str("$(") {
            if !skip_substitution(scanner) {
                return false;
            }
        } else {
            if scanner.match_byte(b'\\') && scanner.is_at_end() {
                return false;
            }
            scanner.advance();
        }
    }
    !scanner.is_at_end()
}
