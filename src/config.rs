//! Read-only interpreter settings, built once by the binary.

use std::env;

use crate::alias::DEFAULT_MAX_DEPTH;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Print every token after alias expansion (`--log-tokens`)
    pub log_tokens: bool,
    /// Print the parsed statement tree (`--log-statements`)
    pub log_statements: bool,
    /// Print each expanded command before running it (`--trace`)
    pub trace: bool,
    /// Nesting limit for user function calls (`FLINT_MAX_RECURSION`)
    pub max_call_depth: usize,
    /// Nesting limit for alias re-expansion (`FLINT_MAX_ALIAS_DEPTH`)
    pub max_alias_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_tokens: false,
            log_statements: false,
            trace: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_alias_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    /// Defaults, with depth limits overridden from the environment.
    pub fn from_env() -> Self {
        Config {
            max_call_depth: env_limit("FLINT_MAX_RECURSION").unwrap_or(DEFAULT_MAX_CALL_DEPTH),
            max_alias_depth: env_limit("FLINT_MAX_ALIAS_DEPTH").unwrap_or(DEFAULT_MAX_DEPTH),
            ..Config::default()
        }
    }
}

fn env_limit(name: &str) -> Option<usize> {
    env::var(name).ok().and_then(|v| parse_limit(&v))
}

fn parse_limit(value: &str) -> Option<usize> {
    value.trim().parse().ok().filter(|&n: &usize| n > 0)
}
