//! flint - a small interactive command language
//!
//! # Overview
//!
//! flint reads commands, pipelines and a handful of block statements,
//! and runs them with fork/exec on a Unix host. Input goes through four
//! phases, each in its own module:
//!
//! 1. [`lexer`]: source text to [`Token`]s (quoted strings, keywords,
//!    operators, statement ends)
//! 2. [`alias`]: command-position words replaced by their alias values
//! 3. [`parser`]: tokens to [`Statement`]s, with panic-mode recovery so one
//!    pass reports every syntax error
//! 4. [`eval`]: statements run against the [`Interpreter`], which owns the
//!    scope stack, aliases and background children
//!
//! # Language
//!
//! ```text
//! let name "world"                 # declare in the current scope
//! println "hello $name"            # $name, ${name}, $? and $(...)
//! ls -l | grep rs | wc -l          # pipelines of any length
//! make && ./run || echo failed     # short-circuit chains
//! sleep 10 &                       # background job
//!
//! if test $x < 10                  # blocks open a scope
//!     println small
//! else
//!     println large
//! end
//!
//! for f in "a:b:c" by ":"
//!     println $f
//! end
//!
//! fun greet
//!     println "hello $1"
//! end
//! ```
//!
//! # Example
//!
//! ```rust
//! use flint::{Config, Interpreter};
//!
//! let mut interp = Interpreter::new(Config::default());
//! assert_eq!(interp.interpret("let answer 42"), 0);
//! assert_eq!(interp.state().lookup_variable("answer"), Some("42"));
//! ```

#[cfg(not(unix))]
compile_error!("flint only supports Unix-like hosts");

pub mod alias;
pub mod ast;
pub mod config;
pub mod diagnostic;
pub mod eval;
pub mod expand;
pub mod lexer;
pub mod parser;
pub mod scanner;
pub mod signals;
pub mod state;

// Re-export commonly used items
pub use alias::{expand_aliases, AliasExpander};
pub use ast::{Function, Job, Outline, Statement};
pub use config::Config;
pub use diagnostic::Diagnostic;
pub use eval::{EvalError, InterpretError, Interpreter, SYNTAX_ERROR_STATUS};
pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use parser::{needs_more_input, parse, ParseError};
pub use state::State;
