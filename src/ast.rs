//! AST for flint
//!
//! Two node families: [`Job`] composes commands with operators, and
//! [`Statement`] adds control flow and function declarations around jobs.
//! Every token in the tree is an owned copy, so a tree outlives the token
//! stream it was parsed from. Function bodies are shared through `Rc`, which
//! lets the function table hand out a body while the caller redefines the
//! same name.

use std::fmt;
use std::rc::Rc;

use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    /// A simple command; `argv` is never empty once parsed.
    Command { argv: Vec<Token> },
    /// Background `&`.
    Unary { operator: Token, child: Box<Job> },
    /// `|`, `&&` or `||`.
    Binary {
        operator: Token,
        left: Box<Job>,
        right: Box<Job>,
    },
}

impl Job {
    pub fn command(argv: Vec<Token>) -> Self {
        Job::Command { argv }
    }

    pub fn unary(operator: Token, child: Job) -> Self {
        Job::Unary {
            operator,
            child: Box::new(child),
        }
    }

    pub fn binary(operator: Token, left: Job, right: Job) -> Self {
        Job::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Token,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Job(Job),
    If {
        condition: Job,
        if_branch: Vec<Statement>,
        else_branch: Vec<Statement>,
    },
    While {
        condition: Job,
        body: Vec<Statement>,
    },
    For {
        var_name: Token,
        string: Token,
        delim: Token,
        body: Vec<Statement>,
    },
    Function(Rc<Function>),
}

/// Source-like rendering of a job, with quotes restored.
impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Command { argv } => {
                for (i, token) in argv.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_argument(f, token)?;
                }
                Ok(())
            }
            Job::Unary { operator, child } => write!(f, "{} {}", child, operator.lexeme),
            Job::Binary {
                operator,
                left,
                right,
            } => write!(f, "{} {} {}", left, operator.lexeme, right),
        }
    }
}

fn write_argument(f: &mut fmt::Formatter<'_>, token: &Token) -> fmt::Result {
    match token.kind {
        TokenKind::DQuotedString => write!(f, "\"{}\"", token.lexeme),
        TokenKind::SQuotedString => write!(f, "'{}'", token.lexeme),
        _ => f.write_str(&token.lexeme),
    }
}

/// Indented outline of a statement list, printed by `--log-statements`.
pub struct Outline<'a>(pub &'a [Statement]);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_block(f, self.0, 0)
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, statements: &[Statement], depth: usize) -> fmt::Result {
    for statement in statements {
        write_statement(f, statement, depth)?;
    }
    Ok(())
}

fn write_statement(f: &mut fmt::Formatter<'_>, statement: &Statement, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    match statement {
        Statement::Job(job) => {
            writeln!(f, "{pad}job")?;
            write_job(f, job, depth + 1)
        }
        Statement::If {
            condition,
            if_branch,
            else_branch,
        } => {
            writeln!(f, "{pad}if")?;
            write_job(f, condition, depth + 1)?;
            writeln!(f, "{pad}then")?;
            write_block(f, if_branch, depth + 1)?;
            if !else_branch.is_empty() {
                writeln!(f, "{pad}else")?;
                write_block(f, else_branch, depth + 1)?;
            }
            Ok(())
        }
        Statement::While { condition, body } => {
            writeln!(f, "{pad}while")?;
            write_job(f, condition, depth + 1)?;
            writeln!(f, "{pad}do")?;
            write_block(f, body, depth + 1)
        }
        Statement::For {
            var_name,
            string,
            delim,
            body,
        } => {
            writeln!(
                f,
                "{pad}for {} in {} by {}",
                var_name.lexeme, string.lexeme, delim.lexeme
            )?;
            write_block(f, body, depth + 1)
        }
        Statement::Function(function) => {
            writeln!(f, "{pad}fun {}", function.name.lexeme)?;
            write_block(f, &function.body, depth + 1)
        }
    }
}

fn write_job(f: &mut fmt::Formatter<'_>, job: &Job, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    match job {
        Job::Command { .. } => writeln!(f, "{pad}command {job}"),
        Job::Unary { operator, child } => {
            writeln!(f, "{pad}{}", operator.kind)?;
            write_job(f, child, depth + 1)
        }
        Job::Binary {
            operator,
            left,
            right,
        } => {
            writeln!(f, "{pad}{}", operator.kind)?;
            write_job(f, left, depth + 1)?;
            write_job(f, right, depth + 1)
        }
    }
}
