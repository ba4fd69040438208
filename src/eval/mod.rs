//! Evaluator for flint
//!
//! The [`Interpreter`] is the context object every phase runs against: it
//! owns the scope stack and alias table, the read-only [`Config`], and the
//! list of background children still to be reaped. [`Interpreter::interpret`]
//! is the single entry point for REPL lines, scripts, `-c` commands, the
//! init file and command substitution.
//!
//! The work is split across files by concern:
//!
//! - `mod.rs`: entry points, statements, job operators
//! - `command.rs`: argv dispatch to functions, builtins and programs
//! - `process.rs`: fork/exec, N-stage pipelines, background jobs
//! - `substitution.rs`: capturing standard output for `$(...)`
//! - `builtins.rs`: the builtin verb table

mod builtins;
mod command;
mod process;
mod substitution;


use std::env;

use nix::unistd::Pid;
use thiserror::Error;

use crate::alias::AliasExpander;
use crate::ast::{Job, Outline, Statement};
use crate::config::Config;
use crate::expand::{self, ExpansionContext};
use crate::lexer::{self, LexError, Token, TokenKind};
use crate::parser::{self, ParseError};
use crate::state::State;

pub use builtins::{BuiltinFn, BUILTIN_NAMES};

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("pipe failed: {0}")]
    Pipe(nix::Error),
    #[error("dup failed: {0}")]
    Dup(nix::Error),
    #[error("wait failed: {0}")]
    Wait(nix::Error),
    #[error("command substitution failed: {0}")]
    Capture(#[from] std::io::Error),
    #[error("{name}: maximum call depth of {depth} exceeded")]
    RecursionLimit { name: String, depth: usize },
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
}

/// Anything that stops one `interpret` call.
#[derive(Error, Debug)]
pub enum InterpretError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Exit status reported for input that does not parse.
pub const SYNTAX_ERROR_STATUS: i32 = 2;

pub struct Interpreter {
    pub(crate) state: State,
    pub(crate) config: Config,
    /// Background children not yet reaped
    pub(crate) background: Vec<Pid>,
    /// Nesting of user function calls
    pub(crate) call_depth: usize,
    /// Status of the last foreground job
    pub(crate) last_status: i32,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        Interpreter {
            state: State::new(),
            config,
            background: Vec::new(),
            call_depth: 0,
            last_status: 0,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn last_status(&self) -> i32 {
        self.last_status
    }

    /// Lexes, alias-expands, parses and evaluates `source`.
    pub fn run(&mut self, source: &str) -> Result<i32, InterpretError> {
        let tokens = lexer::tokenize(source)?;
        let tokens = AliasExpander::new(self.state.aliases())
            .with_max_depth(self.config.max_alias_depth)
            .expand(tokens)?;

        if self.config.log_tokens {
            for token in &tokens {
                eprintln!("{}", token);
            }
        }

        let statements = parser::parse(&tokens, source)?;
        drop(tokens);

        if self.config.log_statements {
            eprint!("{}", Outline(&statements));
        }

        Ok(self.evaluate_statements(&statements)?)
    }

    /// Runs `source`, reporting any error on stderr.
    ///
    /// Returns the status of the last statement, 1 after a lexical or
    /// runtime error, or [`SYNTAX_ERROR_STATUS`] when nothing ran because
    /// the input did not parse.
    pub fn interpret(&mut self, source: &str) -> i32 {
        self.reap_background();
        match self.run(source) {
            Ok(status) => status,
            Err(InterpretError::Parse(err)) => {
                for diagnostic in &err.diagnostics {
                    eprintln!("{}", diagnostic);
                }
                self.set_last_status(SYNTAX_ERROR_STATUS);
                SYNTAX_ERROR_STATUS
            }
            Err(e) => {
                eprintln!("flint: {}", e);
                self.set_last_status(1);
                1
            }
        }
    }

    /// Records the status of a foreground job and publishes it as `$?`.
    pub(crate) fn set_last_status(&mut self, status: i32) {
        self.last_status = status;
        env::set_var("?", status.to_string());
    }

    /// Runs `f` inside a fresh scope, popping it on every path.
    pub(crate) fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        self.state.push_scope();
        let result = f(self);
        self.state.pop_scope();
        result
    }

    pub(crate) fn evaluate_statements(&mut self, statements: &[Statement]) -> Result<i32, EvalError> {
        let mut status = 0;
        for statement in statements {
            status = self.evaluate_statement(statement)?;
        }
        Ok(status)
    }

    fn evaluate_block(&mut self, body: &[Statement]) -> Result<i32, EvalError> {
        self.scoped(|interp| interp.evaluate_statements(body))
    }

    fn evaluate_statement(&mut self, statement: &Statement) -> Result<i32, EvalError> {
        match statement {
            Statement::Job(job) => {
                let status = self.evaluate_job(job)?;
                self.set_last_status(status);
                Ok(status)
            }
            Statement::If {
                condition,
                if_branch,
                else_branch,
            } => {
                let branch = if self.evaluate_job(condition)? == 0 {
                    if_branch
                } else {
                    else_branch
                };
                self.evaluate_block(branch)?;
                Ok(0)
            }
            Statement::While { condition, body } => {
                while self.evaluate_job(condition)? == 0 {
                    self.evaluate_block(body)?;
                }
                Ok(0)
            }
            Statement::For {
                var_name,
                string,
                delim,
                body,
            } => self.evaluate_for(var_name, string, delim, body),
            Statement::Function(function) => {
                self.state.create_function(function.clone());
                Ok(0)
            }
        }
    }

    fn evaluate_for(
        &mut self,
        var_name: &Token,
        string: &Token,
        delim: &Token,
        body: &[Statement],
    ) -> Result<i32, EvalError> {
        let text = expand::expand_to_string(string, self)?;
        let delim = expand::expand_to_string(delim, self)?;
        let fields = split_on_any(&text, &delim);

        self.scoped(|interp| {
            interp.state.create_variable(var_name.lexeme.as_str(), "");
            for field in fields {
                interp.state.mutate_variable(&var_name.lexeme, field);
                interp.evaluate_block(body)?;
            }
            Ok(0)
        })
    }

    pub(crate) fn evaluate_job(&mut self, job: &Job) -> Result<i32, EvalError> {
        match job {
            Job::Command { argv } => self.evaluate_command(argv),
            Job::Unary { operator, child } => match operator.kind {
                TokenKind::Ampersand => self.spawn_background(child),
                _ => Err(EvalError::UnknownOperator(operator.lexeme.clone())),
            },
            Job::Binary {
                operator,
                left,
                right,
            } => match operator.kind {
                TokenKind::And => {
                    let status = self.evaluate_job(left)?;
                    if status != 0 {
                        return Ok(status);
                    }
                    self.evaluate_job(right)
                }
                TokenKind::Or => {
                    let status = self.evaluate_job(left)?;
                    if status == 0 {
                        return Ok(status);
                    }
                    self.evaluate_job(right)
                }
                TokenKind::Pipe => self.evaluate_pipeline(job),
                _ => Err(EvalError::UnknownOperator(operator.lexeme.clone())),
            },
        }
    }
}

impl ExpansionContext for Interpreter {
    type Error = EvalError;

    fn variable(&self, name: &str) -> String {
        self.state.select_variable(name)
    }

    fn home_dir(&self) -> String {
        env::var("HOME").unwrap_or_else(|_| ".".to_string())
    }

    fn command_output(&mut self, source: &str) -> Result<String, EvalError> {
        self.capture_output(source)
    }
}

/// Splits `text` on any character of `delims`, skipping empty fields.
/// An empty delimiter set yields the whole text as one field.
fn split_on_any(text: &str, delims: &str) -> Vec<String> {
    if delims.is_empty() {
        return if text.is_empty() {
            Vec::new()
        } else {
            vec![text.to_string()]
        };
    }
    text.split(|c: char| delims.contains(c))
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}
