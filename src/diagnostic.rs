//! Line-addressed syntax diagnostics.

use std::fmt;

use crate::lexer::{Token, TokenKind};

/// One syntax error, with enough of the source to point at it.
///
/// Rendered as:
///
/// ```text
/// 2:5: syntax error: Expected 'end' after if statement.
///   at end
///     2 | if true
///       |     ^
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
    /// Offending lexeme, or `None` at a statement end or end of input.
    pub near: Option<String>,
    pub source_line: String,
}

impl Diagnostic {
    pub fn at_token(source_lines: &[&str], token: &Token, message: impl Into<String>) -> Self {
        let near = match token.kind {
            TokenKind::Eod | TokenKind::StatementEnd => None,
            _ => Some(token.lexeme.clone()),
        };
        let source_line = token
            .line
            .checked_sub(1)
            .and_then(|index| source_lines.get(index))
            .map(|line| line.trim_end_matches('\r').to_string())
            .unwrap_or_default();
        Diagnostic {
            line: token.line,
            column: token.column,
            message: message.into(),
            near,
            source_line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}:{}: syntax error: {}",
            self.line, self.column, self.message
        )?;
        match &self.near {
            Some(lexeme) => writeln!(f, "  at '{}'", lexeme)?,
            None => writeln!(f, "  at end")?,
        }
        writeln!(f, "{:>5} | {}", self.line, self.source_line.replace('\t', " "))?;
        write!(
            f,
            "{:>5} | {}^",
            "",
            " ".repeat(self.column.saturating_sub(1))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_at_token() {
        let lines = ["echo a", "ls | )"];
        let token = Token::new(TokenKind::Error, ")", 2, 6);
        let diagnostic = Diagnostic::at_token(&lines, &token, "Unexpected character.");
        assert_eq!(
            diagnostic.to_string(),
            "2:6: syntax error: Unexpected character.\n  at ')'\n    2 | ls | )\n      |      ^"
        );
    }

    #[test]
    fn end_of_input_has_no_lexeme() {
        let token = Token::new(TokenKind::Eod, "", 3, 1);
        let diagnostic = Diagnostic::at_token(&["if true", "echo"], &token, "Expected 'end'.");
        assert_eq!(diagnostic.near, None);
        assert_eq!(diagnostic.source_line, "");
        assert!(diagnostic.to_string().contains("  at end\n"));
    }
}
