//! Recursive-descent parser for flint
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! program        := statement*
//! statement      := if_stmt | while_stmt | for_stmt | fun_stmt | job
//! if_stmt        := "if" job statement* ("else" statement*)? "end"
//! while_stmt     := "while" job statement* "end"
//! for_stmt       := "for" STRING "in" STRING "by" STRING statement* "end"
//! fun_stmt       := "fun" WORD statement* "end"
//! job            := or "&"?
//! or             := and ("||" and)*
//! and            := pipeline ("&&" pipeline)*
//! pipeline       := simple_command ("|" simple_command)*
//! simple_command := (STRING | keyword)+
//! ```
//!
//! On a grammar violation the parser records a [`Diagnostic`], suppresses
//! further diagnostics until it resynchronizes at the next statement end,
//! and keeps going so one pass reports every independent error. Any
//! diagnostic rejects the whole input.

use thiserror::Error;

use crate::ast::{Function, Job, Statement};
use crate::diagnostic::Diagnostic;
use crate::lexer::{tokenize, Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", render(.diagnostics))]
pub struct ParseError {
    pub diagnostics: Vec<Diagnostic>,
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a token stream produced from `source`.
pub fn parse(tokens: &[Token], source: &str) -> Result<Vec<Statement>, ParseError> {
    let mut parser = Parser::new(tokens, source);
    let statements = parser.program();
    if parser.diagnostics.is_empty() {
        Ok(statements)
    } else {
        Err(ParseError {
            diagnostics: parser.diagnostics,
        })
    }
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    source_lines: Vec<&'a str>,
    diagnostics: Vec<Diagnostic>,
    panic_mode: bool,
    eod: Token,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], source: &'a str) -> Self {
        let (line, column) = tokens
            .last()
            .map(|t| (t.line, t.column))
            .unwrap_or((1, 1));
        Parser {
            tokens,
            current: 0,
            source_lines: source.split('\n').collect(),
            diagnostics: Vec::new(),
            panic_mode: false,
            eod: Token::new(TokenKind::Eod, "", line, column),
        }
    }

    pub fn program(&mut self) -> Vec<Statement> {
        self.block(&[])
    }

    // ---- token cursor ----

    fn peek(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&self.eod)
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eod
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek().kind)
    }

    fn check_argument(&self) -> bool {
        let kind = self.peek().kind;
        kind.is_string() || kind.is_keyword()
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Option<Token> {
        if self.check(kind) {
            return Some(self.advance());
        }
        self.error_at_current(message);
        None
    }

    fn consume_string(&mut self, message: &str) -> Option<Token> {
        if self.peek().kind.is_string() {
            return Some(self.advance());
        }
        self.error_at_current(message);
        None
    }

    // ---- error handling ----

    fn error_at_current(&mut self, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        let diagnostic = Diagnostic::at_token(&self.source_lines, self.peek(), message);
        self.diagnostics.push(diagnostic);
    }

    /// Skips to just past the next statement end.
    fn synchronize(&mut self) {
        while !self.is_at_end() && !self.check(TokenKind::StatementEnd) {
            self.current += 1;
        }
        self.match_kind(TokenKind::StatementEnd);
        self.panic_mode = false;
    }

    fn recover(&mut self) {
        if self.panic_mode {
            self.synchronize();
        }
    }

    fn skip_statement_ends(&mut self) {
        while self.match_kind(TokenKind::StatementEnd) {}
    }

    // ---- statements ----

    /// Statements up to one of `terminators` (not consumed) or end of input.
    fn block(&mut self, terminators: &[TokenKind]) -> Vec<Statement> {
        let mut statements = Vec::new();
        self.skip_statement_ends();
        while !self.is_at_end() && !self.check_any(terminators) {
            let before = self.current;
            let statement = self.statement();
            self.recover();
            match statement {
                Some(statement) => statements.push(statement),
                None if self.current == before => {
                    self.current += 1;
                }
                None => {}
            }
            self.skip_statement_ends();
        }
        statements
    }

    fn statement(&mut self) -> Option<Statement> {
        match self.peek().kind {
            TokenKind::If => {
                self.advance();
                self.if_statement()
            }
            TokenKind::While => {
                self.advance();
                self.while_statement()
            }
            TokenKind::For => {
                self.advance();
                self.for_statement()
            }
            TokenKind::Fun => {
                self.advance();
                self.fun_statement()
            }
            TokenKind::End => {
                self.error_at_current("Unexpected 'end'.");
                None
            }
            TokenKind::Else => {
                self.error_at_current("Unexpected 'else'.");
                None
            }
            _ => self.job().map(Statement::Job),
        }
    }

    fn if_statement(&mut self) -> Option<Statement> {
        let condition = self.job();
        self.recover();
        let if_branch = self.block(&[TokenKind::Else, TokenKind::End]);
        let else_branch = if self.match_kind(TokenKind::Else) {
            self.block(&[TokenKind::End])
        } else {
            Vec::new()
        };
        self.consume(TokenKind::End, "Expected 'end' after if statement.")?;
        Some(Statement::If {
            condition: condition?,
            if_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Option<Statement> {
        let condition = self.job();
        self.recover();
        let body = self.block(&[TokenKind::End]);
        self.consume(TokenKind::End, "Expected 'end' after while loop.")?;
        Some(Statement::While {
            condition: condition?,
            body,
        })
    }

    fn for_statement(&mut self) -> Option<Statement> {
        let header = self.for_header();
        self.recover();
        let body = self.block(&[TokenKind::End]);
        self.consume(TokenKind::End, "Expected 'end' after for loop.")?;
        let (var_name, string, delim) = header?;
        Some(Statement::For {
            var_name,
            string,
            delim,
            body,
        })
    }

    fn for_header(&mut self) -> Option<(Token, Token, Token)> {
        let var_name = self.consume_string("Expected variable name after 'for'.")?;
        self.consume(TokenKind::In, "Expected 'in' after loop variable.")?;
        let string = self.consume_string("Expected string after 'in'.")?;
        self.consume(TokenKind::By, "Expected 'by' after loop string.")?;
        let delim = self.consume_string("Expected delimiter after 'by'.")?;
        Some((var_name, string, delim))
    }

    fn fun_statement(&mut self) -> Option<Statement> {
        let name = self.consume(TokenKind::Word, "Expected function name after 'fun'.");
        self.recover();
        let body = self.block(&[TokenKind::End]);
        self.consume(TokenKind::End, "Expected 'end' after function body.")?;
        Some(Statement::Function(
            Function { name: name?, body }.into(),
        ))
    }

    // ---- jobs ----

    fn job(&mut self) -> Option<Job> {
        let job = self.or();
        if self.check(TokenKind::Ampersand) {
            let operator = self.advance();
            return Some(Job::unary(operator, job?));
        }
        job
    }

    fn or(&mut self) -> Option<Job> {
        let mut job = self.and();
        while self.check(TokenKind::Or) {
            let operator = self.advance();
            let right = self.and();
            job = Some(Job::binary(operator, job?, right?));
        }
        job
    }

    fn and(&mut self) -> Option<Job> {
        let mut job = self.pipeline();
        while self.check(TokenKind::And) {
            let operator = self.advance();
            let right = self.pipeline();
            job = Some(Job::binary(operator, job?, right?));
        }
        job
    }

    fn pipeline(&mut self) -> Option<Job> {
        let mut job = self.simple_command();
        while self.check(TokenKind::Pipe) {
            let operator = self.advance();
            let right = self.simple_command();
            job = Some(Job::binary(operator, job?, right?));
        }
        job
    }

    fn simple_command(&mut self) -> Option<Job> {
        let mut argv = Vec::new();
        while self.check_argument() {
            argv.push(self.advance());
        }
        if argv.is_empty() {
            if self.check(TokenKind::Error) {
                self.error_at_current("Unexpected character.");
            } else {
                self.error_at_current("Expected command.");
            }
            return None;
        }
        Some(Job::command(argv))
    }
}

/// Whether `source` stops in the middle of something: an open quote or
/// `$(`, a block without its `end`, or a trailing `|`, `&&` or `||`.
/// The REPL keeps reading lines while this holds.
pub fn needs_more_input(source: &str) -> bool {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(_) => return true,
    };

    let mut depth = 0usize;
    let mut statement_start = true;
    let mut last = TokenKind::StatementEnd;
    for token in &tokens {
        if statement_start {
            match token.kind {
                TokenKind::If | TokenKind::While | TokenKind::For | TokenKind::Fun => depth += 1,
                TokenKind::End => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        statement_start = match token.kind {
            TokenKind::StatementEnd | TokenKind::Ampersand => true,
            TokenKind::Else | TokenKind::End => statement_start,
            _ => false,
        };
        if token.kind != TokenKind::Eod {
            last = token.kind;
        }
    }
    depth > 0 || matches!(last, TokenKind::Pipe | TokenKind::And | TokenKind::Or)
}
