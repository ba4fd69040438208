//! Word expansion: the step between a parsed argument token and the
//! strings handed to a command.
//!
//! | token            | tilde | `$name` `${name}` `$(...)` | escapes | field splitting |
//! |------------------|-------|----------------------------|---------|-----------------|
//! | bare word        | yes   | yes                        | yes     | yes             |
//! | `"..."`          | yes   | yes                        | yes     | no              |
//! | `'...'`, keyword | no    | no                         | yes     | no              |
//!
//! Lookups and command substitution go through an [`ExpansionContext`], so
//! the rules here do not depend on the interpreter.

use crate::lexer::{skip_substitution, Token, TokenKind};
use crate::scanner::Scanner;

pub trait ExpansionContext {
    type Error;

    /// Value of a variable; unset names read as the empty string.
    fn variable(&self, name: &str) -> String;

    fn home_dir(&self) -> String;

    /// Raw standard output of running `source`.
    fn command_output(&mut self, source: &str) -> Result<String, Self::Error>;
}

/// Expands every argument token, in order, into the final argv.
pub fn expand_argv<C: ExpansionContext>(
    tokens: &[Token],
    ctx: &mut C,
) -> Result<Vec<String>, C::Error> {
    let mut argv = Vec::with_capacity(tokens.len());
    for token in tokens {
        argv.extend(expand_token(token, ctx)?);
    }
    Ok(argv)
}

/// Expands one token into zero or more words. Only bare words split.
pub fn expand_token<C: ExpansionContext>(
    token: &Token,
    ctx: &mut C,
) -> Result<Vec<String>, C::Error> {
    match token.kind {
        TokenKind::Word => Ok(split_fields(&expand_text(&token.lexeme, ctx)?)),
        TokenKind::DQuotedString => Ok(vec![expand_text(&token.lexeme, ctx)?]),
        _ => Ok(vec![resolve_escapes(&token.lexeme)]),
    }
}

/// Expands one token into exactly one string, without field splitting.
pub fn expand_to_string<C: ExpansionContext>(
    token: &Token,
    ctx: &mut C,
) -> Result<String, C::Error> {
    match token.kind {
        TokenKind::Word | TokenKind::DQuotedString => expand_text(&token.lexeme, ctx),
        _ => Ok(resolve_escapes(&token.lexeme)),
    }
}

/// Splits on runs of spaces, tabs and newlines, dropping empty fields.
pub fn split_fields(text: &str) -> Vec<String> {
    text.split([' ', '\t', '\n'])
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves backslash escapes only. Used for single-quoted strings.
pub fn resolve_escapes(text: &str) -> String {
    let mut scanner = Scanner::new(text);
    let mut out = String::with_capacity(text.len());
    while let Some(c) = scanner.peek() {
        if c == b'\\' {
            scanner.advance();
            escape(&mut scanner, &mut out);
        } else {
            literal_run(&mut scanner, &mut out, |c| c == b'\\');
        }
    }
    out
}

/// Full expansion of a word or double-quoted string body.
pub fn expand_text<C: ExpansionContext>(text: &str, ctx: &mut C) -> Result<String, C::Error> {
    let mut scanner = Scanner::new(text);
    let mut out = String::with_capacity(text.len());

    if text == "~" || text.starts_with("~/") {
        scanner.advance();
        out.push_str(&ctx.home_dir());
    }

    while let Some(c) = scanner.peek() {
        match c {
            b'$' => {
                scanner.advance();
                dollar(&mut scanner, ctx, &mut out)?;
            }
            b'\\' => {
                scanner.advance();
                escape(&mut scanner, &mut out);
            }
            _ => literal_run(&mut scanner, &mut out, |c| c == b'$' || c == b'\\'),
        }
    }
    Ok(out)
}

/// Handles whatever follows a `$`.
fn dollar<C: ExpansionContext>(
    scanner: &mut Scanner<'_>,
    ctx: &mut C,
    out: &mut String,
) -> Result<(), C::Error> {
    if scanner.match_byte(b'(') {
        let start = scanner.position();
        let closed = skip_substitution(scanner);
        let end = if closed {
            scanner.position() - 1
        } else {
            scanner.position()
        };
        let output = ctx.command_output(scanner.slice(start, end))?;
        out.push_str(output.strip_suffix('\n').unwrap_or(&output));
    } else if scanner.match_byte(b'{') {
        scanner.mark();
        scanner.advance_until(b'}');
        if scanner.is_at_end() {
            out.push_str(scanner.lexeme());
        } else {
            out.push_str(&ctx.variable(scanner.lexeme()));
            scanner.advance();
        }
    } else {
        scanner.mark();
        while scanner.peek().is_some_and(is_name_byte) {
            scanner.advance();
        }
        let name = scanner.lexeme();
        if name.is_empty() {
            out.push('$');
        } else {
            out.push_str(&ctx.variable(name));
        }
    }
    Ok(())
}

/// Handles the character after a consumed backslash.
fn escape(scanner: &mut Scanner<'_>, out: &mut String) {
    match scanner.peek() {
        Some(c) if c.is_ascii() => {
            scanner.advance();
            out.push(match c {
                b'n' => '\n',
                b't' => '\t',
                b'r' => '\r',
                other => other as char,
            });
        }
        // A non-ASCII character is copied by the next literal run.
        Some(_) => {}
        None => out.push('\\'),
    }
}

/// Copies text up to the next byte for which `special` holds.
fn literal_run(scanner: &mut Scanner<'_>, out: &mut String, special: fn(u8) -> bool) {
    scanner.mark();
    while scanner.peek().is_some_and(|c| !special(c)) {
        scanner.advance();
    }
    out.push_str(scanner.lexeme());
}

fn is_name_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'?' | b'@')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::convert::Infallible;

    #[derive(Default)]
    struct FakeContext {
        vars: HashMap<String, String>,
        commands: Vec<String>,
    }

    impl FakeContext {
        fn with(vars: &[(&str, &str)]) -> Self {
            FakeContext {
                vars: vars
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                commands: Vec::new(),
            }
        }
    }

    impl ExpansionContext for FakeContext {
        type Error = Infallible;

        fn variable(&self, name: &str) -> String {
            self.vars.get(name).cloned().unwrap_or_default()
        }

        fn home_dir(&self) -> String {
            "/home/user".to_string()
        }

        fn command_output(&mut self, source: &str) -> Result<String, Infallible> {
            self.commands.push(source.to_string());
            Ok(match source {
                "echo hi" => "hi\n".to_string(),
                "printf 'a b'" => "a b".to_string(),
                "two lines" => "one\ntwo\n\n".to_string(),
                _ => String::new(),
            })
        }
    }

    fn word(text: &str) -> Token {
        Token::new(TokenKind::Word, text, 1, 1)
    }

    fn dquoted(text: &str) -> Token {
        Token::new(TokenKind::DQuotedString, text, 1, 1)
    }

    fn squoted(text: &str) -> Token {
        Token::new(TokenKind::SQuotedString, text, 1, 1)
    }

    fn expand(token: Token, ctx: &mut FakeContext) -> Vec<String> {
        match expand_token(&token, ctx) {
            Ok(words) => words,
            Err(never) => match never {},
        }
    }

    #[test]
    fn literal_words_are_unchanged() {
        let mut ctx = FakeContext::default();
        let tokens = vec![word("ls"), word("-la"), dquoted("a b"), squoted("c")];
        let argv = expand_argv(&tokens, &mut ctx).unwrap();
        assert_eq!(argv, vec!["ls", "-la", "a b", "c"]);
        let again: Vec<Token> = argv.iter().map(|a| dquoted(a)).collect();
        assert_eq!(expand_argv(&again, &mut ctx).unwrap(), argv);
    }

    #[test]
    fn variables() {
        let mut ctx = FakeContext::with(&[("name", "flint"), ("?", "3"), ("@", "a b")]);
        assert_eq!(expand(word("$name"), &mut ctx), vec!["flint"]);
        assert_eq!(expand(word("x${name}y"), &mut ctx), vec!["xflinty"]);
        assert_eq!(expand(word("$?"), &mut ctx), vec!["3"]);
        assert_eq!(expand(dquoted("[$@]"), &mut ctx), vec!["[a b]"]);
        assert_eq!(expand(word("$missing"), &mut ctx), Vec::<String>::new());
        assert_eq!(expand(dquoted("$missing"), &mut ctx), vec![""]);
    }

    #[test]
    fn name_stops_at_non_name_byte() {
        let mut ctx = FakeContext::with(&[("a", "1")]);
        assert_eq!(expand(dquoted("$a.$a-$a"), &mut ctx), vec!["1.1-1"]);
    }

    #[test]
    fn lone_dollar_is_literal() {
        let mut ctx = FakeContext::default();
        assert_eq!(expand(word("$"), &mut ctx), vec!["$"]);
        assert_eq!(expand(dquoted("cost: $ 5"), &mut ctx), vec!["cost: $ 5"]);
    }

    #[test]
    fn unclosed_brace_is_kept_verbatim() {
        let mut ctx = FakeContext::with(&[("abc", "nope")]);
        assert_eq!(expand(dquoted("x${abc"), &mut ctx), vec!["xabc"]);
    }

    #[test]
    fn tilde_only_at_start() {
        let mut ctx = FakeContext::default();
        assert_eq!(expand(word("~"), &mut ctx), vec!["/home/user"]);
        assert_eq!(expand(word("~/src"), &mut ctx), vec!["/home/user/src"]);
        assert_eq!(expand(word("a~b"), &mut ctx), vec!["a~b"]);
        assert_eq!(expand(word("~other"), &mut ctx), vec!["~other"]);
        assert_eq!(expand(squoted("~"), &mut ctx), vec!["~"]);
    }

    #[test]
    fn escapes() {
        let mut ctx = FakeContext::with(&[("x", "v")]);
        assert_eq!(expand(dquoted(r"a\tb\nc\rd"), &mut ctx), vec!["a\tb\nc\rd"]);
        assert_eq!(expand(dquoted(r"\$x \\ \q"), &mut ctx), vec!["$x \\ q"]);
        assert_eq!(expand(dquoted(r#"say \"hi\""#), &mut ctx), vec!["say \"hi\""]);
        assert_eq!(expand(dquoted("trailing\\"), &mut ctx), vec!["trailing\\"]);
        assert_eq!(expand(dquoted("\\é"), &mut ctx), vec!["é"]);
    }

    #[test]
    fn single_quotes_only_resolve_escapes() {
        let mut ctx = FakeContext::with(&[("x", "v")]);
        assert_eq!(expand(squoted(r"$x $(echo hi)\n"), &mut ctx), vec!["$x $(echo hi)\n"]);
        assert!(ctx.commands.is_empty());
    }

    #[test]
    fn command_substitution_trims_one_newline() {
        let mut ctx = FakeContext::default();
        assert_eq!(expand(word("$(echo hi)"), &mut ctx), vec!["hi"]);
        assert_eq!(expand(dquoted("$(two lines)"), &mut ctx), vec!["one\ntwo\n"]);
        assert_eq!(ctx.commands, vec!["echo hi", "two lines"]);
    }

    #[test]
    fn substitution_splits_in_words_only() {
        let mut ctx = FakeContext::default();
        assert_eq!(expand(word("$(printf 'a b')"), &mut ctx), vec!["a", "b"]);
        assert_eq!(expand(dquoted("<$(printf 'a b')>"), &mut ctx), vec!["<a b>"]);
        assert_eq!(ctx.commands, vec!["printf 'a b'", "printf 'a b'"]);
    }

    #[test]
    fn nested_substitution_is_passed_whole() {
        let mut ctx = FakeContext::default();
        expand(word("$(echo $(echo (x)))"), &mut ctx);
        assert_eq!(ctx.commands, vec!["echo $(echo (x))"]);
    }

    #[test]
    fn unclosed_substitution_runs_the_rest() {
        let mut ctx = FakeContext::default();
        expand(dquoted("$(echo hi"), &mut ctx);
        assert_eq!(ctx.commands, vec!["echo hi"]);
    }

    #[test]
    fn field_splitting() {
        assert_eq!(split_fields("  a \t b\n\nc  "), vec!["a", "b", "c"]);
        assert!(split_fields(" \n ").is_empty());
    }

    #[test]
    fn expand_to_string_does_not_split() {
        let mut ctx = FakeContext::with(&[("list", "a b c")]);
        let value = match expand_to_string(&word("$list"), &mut ctx) {
            Ok(value) => value,
            Err(never) => match never {},
        };
        assert_eq!(value, "a b c");
    }

    #[test]
    fn keywords_expand_literally() {
        let mut ctx = FakeContext::default();
        let token = Token::new(TokenKind::If, "if", 1, 1);
        assert_eq!(expand(token, &mut ctx), vec!["if"]);
    }
}
