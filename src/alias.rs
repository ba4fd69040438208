//! Alias expansion over a token stream.
//!
//! Runs once between lexing and parsing. A string token standing in
//! command position is looked up in the alias table and, on a hit,
//! replaced by the tokens of the re-lexed alias value. Replacements are
//! expanded again, except for names already being expanded, so
//! `alias ls 'ls -F'` terminates after one step.

use std::collections::HashMap;

use crate::lexer::{tokenize, LexError, Token, TokenKind};

pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Expands aliases in `tokens` with the default nesting limit.
pub fn expand_aliases(
    tokens: Vec<Token>,
    aliases: &HashMap<String, String>,
) -> Result<Vec<Token>, LexError> {
    AliasExpander::new(aliases).expand(tokens)
}

pub struct AliasExpander<'a> {
    aliases: &'a HashMap<String, String>,
    max_depth: usize,
    active: Vec<String>,
}

impl<'a> AliasExpander<'a> {
    pub fn new(aliases: &'a HashMap<String, String>) -> Self {
        AliasExpander {
            aliases,
            max_depth: DEFAULT_MAX_DEPTH,
            active: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn expand(&mut self, tokens: Vec<Token>) -> Result<Vec<Token>, LexError> {
        if self.aliases.is_empty() {
            return Ok(tokens);
        }
        let mut out = Vec::with_capacity(tokens.len());
        let mut command_position = true;
        for token in tokens {
            command_position = self.push(token, command_position, &mut out)?;
        }
        Ok(out)
    }

    /// Pushes `token`, expanded if needed, and reports whether the token
    /// after it stands in command position.
    fn push(
        &mut self,
        token: Token,
        command_position: bool,
        out: &mut Vec<Token>,
    ) -> Result<bool, LexError> {
        if !token.kind.is_string() {
            let opens = opens_command_position(token.kind, command_position);
            out.push(token);
            return Ok(opens);
        }
        if !command_position {
            out.push(token);
            return Ok(false);
        }

        let value = match self.aliases.get(&token.lexeme) {
            Some(value)
                if self.active.len() < self.max_depth && !self.active.contains(&token.lexeme) =>
            {
                value
            }
            _ => {
                out.push(token);
                return Ok(false);
            }
        };

        let mut replacement = tokenize(value)?;
        replacement.pop();

        self.active.push(token.lexeme.clone());
        let mut position = true;
        for mut spliced in replacement {
            spliced.line = token.line;
            spliced.column = token.column;
            position = match self.push(spliced, position, out) {
                Ok(position) => position,
                Err(e) => {
                    self.active.pop();
                    return Err(e);
                }
            };
        }
        self.active.pop();
        Ok(position)
    }
}

/// Operators and separators always start a new command. Keywords only do
/// when they are themselves at command position; `fun`, `for`, `in` and
/// `by` introduce names or data instead.
fn opens_command_position(kind: TokenKind, command_position: bool) -> bool {
    match kind {
        TokenKind::Fun | TokenKind::For | TokenKind::In | TokenKind::By => false,
        TokenKind::If | TokenKind::While | TokenKind::Else | TokenKind::End => command_position,
        _ => true,
    }
}
