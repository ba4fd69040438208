//! Integration tests for the language: quoting, variables, scopes, control
//! flow, functions and aliases

#[path = "common/mod.rs"]
mod common;
use common::{flint, Sandbox};

use predicates::prelude::*;
use std::fs;

// ============================================
// Words and quoting
// ============================================

#[test]
fn test_variables_and_quoting() {
    flint("let name world; println \"hello $name\"")
        .success()
        .stdout("hello world\n");
    flint("let name world; println 'hello $name'")
        .success()
        .stdout("hello $name\n");
    flint("let name world; println \"${name}wide\"")
        .success()
        .stdout("worldwide\n");
}

#[test]
fn test_escapes() {
    flint("println \"tab\\there\"").success().stdout("tab\there\n");
    flint("println \"say \\\"hi\\\"\"").success().stdout("say \"hi\"\n");
}

#[test]
fn test_triple_quoted_string_spans_lines() {
    flint("println \"\"\"line one\nline two\"\"\"")
        .success()
        .stdout("line one\nline two\n");
}

#[test]
fn test_comments_are_ignored() {
    flint("println a # not an argument\n# whole line\nprintln b")
        .success()
        .stdout("a\nb\n");
}

#[test]
fn test_unquoted_variable_is_split() {
    flint("let words 'one two'\necho $words | wc -w")
        .success()
        .stdout(predicate::str::contains("2"));
    flint("let words 'one two'\nlen \"$words\"")
        .success()
        .stdout("7\n");
}

#[test]
fn test_tilde_expansion() {
    let sandbox = Sandbox::new();
    let expected = format!("{}/docs\n", sandbox.home().display());
    sandbox
        .run("println ~/docs")
        .assert()
        .success()
        .stdout(predicate::str::diff(expected));
}

#[test]
fn test_unset_variable_is_empty() {
    flint("println \"[$flint_surely_unset]\"").success().stdout("[]\n");
}

// ============================================
// Scopes
// ============================================

#[test]
fn test_block_scope_shadows() {
    flint("let x outer\nif true\n let x inner\n println $x\nend\nprintln $x")
        .success()
        .stdout("inner\nouter\n");
}

#[test]
fn test_mut_reaches_outer_scope() {
    flint("let x 1\nif true\n mut x 2\nend\nprintln $x")
        .success()
        .stdout("2\n");
}

#[test]
fn test_mut_undeclared_fails() {
    flint("mut nope 1")
        .code(1)
        .stderr(predicate::str::contains("mut: variable 'nope' doesn't exist"))
        .stderr(predicate::str::contains("declare it with: let nope \"1\""));
}

// ============================================
// Control flow
// ============================================

#[test]
fn test_if_else() {
    flint("if false\n println then\nelse\n println else\nend")
        .success()
        .stdout("else\n");
    flint("if test 10 > 9; println numeric; end")
        .success()
        .stdout("numeric\n");
}

#[test]
fn test_for_loop() {
    flint("for i in 'a b c' by ' '\n println $i\nend")
        .success()
        .stdout("a\nb\nc\n");
}

#[test]
fn test_for_loop_over_substitution() {
    flint("for f in \"$(printf 'x:y')\" by ':'\n println \"<$f>\"\nend")
        .success()
        .stdout("<x>\n<y>\n");
}

#[test]
fn test_while_loop() {
    flint("let n x\nwhile test $n != xxxx\n mut n \"${n}x\"\n println $n\nend")
        .success()
        .stdout("xx\nxxx\nxxxx\n");
}

// ============================================
// Functions
// ============================================

#[test]
fn test_function_arguments() {
    flint("fun greet\n println \"hello $1 ($@)\"\nend\ngreet ada lovelace")
        .success()
        .stdout("hello ada (ada lovelace)\n");
}

#[test]
fn test_function_locals_do_not_leak() {
    flint("fun f\n let inside 1\nend\nf\nprintln \"[$inside]\"")
        .success()
        .stdout("[]\n");
}

#[test]
fn test_recursive_function() {
    let source = "fun count\n if test $1 != xxx\n  println $1\n  count \"${1}x\"\n end\nend\ncount x";
    flint(source).success().stdout("x\nxx\n");
}

#[test]
fn test_recursion_limit() {
    let sandbox = Sandbox::new();
    sandbox
        .run("fun r\n r\nend\nr")
        .env("FLINT_MAX_RECURSION", "10")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("maximum call depth of 10 exceeded"));
}

// ============================================
// Aliases
// ============================================

#[test]
fn test_alias_from_init_file() {
    let sandbox = Sandbox::new();
    sandbox.write_init("alias ll 'echo listed'\n");
    sandbox.run("ll").assert().success().stdout("listed\n");
}

#[test]
fn test_alias_only_in_command_position() {
    let sandbox = Sandbox::new();
    sandbox.write_init("alias ll 'echo listed'\n");
    sandbox
        .run("echo ll; println x | ll")
        .assert()
        .success()
        .stdout("ll\nlisted\n");
}

#[test]
fn test_self_referential_alias_expands_once() {
    let sandbox = Sandbox::new();
    sandbox.write_init("alias echo 'echo -n'\n");
    sandbox.run("echo x").assert().success().stdout("x");
}

#[test]
fn test_chained_aliases() {
    let sandbox = Sandbox::new();
    sandbox.write_init("alias a b\nalias b 'echo chained'\n");
    sandbox.run("a").assert().success().stdout("chained\n");
}

#[test]
fn test_alias_listing() {
    let sandbox = Sandbox::new();
    sandbox.write_init("alias zz 'echo z'\nalias aa 'echo a'\n");
    sandbox
        .run("alias")
        .assert()
        .success()
        .stdout("aa 'echo a'\nzz 'echo z'\n");
}

// ============================================
// Builtins
// ============================================

#[test]
fn test_cd_changes_directory() {
    flint("cd /; pwd").success().stdout("/\n");

    let sandbox = Sandbox::new();
    let home = fs::canonicalize(sandbox.home()).unwrap();
    sandbox
        .run("cd /; cd; pwd")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", home.display())));
}

#[test]
fn test_cd_errors() {
    flint("cd /flint-nonexistent-dir")
        .code(1)
        .stderr(predicate::str::contains("cd: /flint-nonexistent-dir:"));
    flint("cd a b")
        .code(1)
        .stderr(predicate::str::contains("cd: too many arguments"));
}

#[test]
fn test_len_counts_characters() {
    flint("len héllo").success().stdout("5\n");
}

#[test]
fn test_test_builtin() {
    flint("test 10 > 9").success();
    flint("test abc < abd").success();
    flint("test 1 == one")
        .code(1)
        .stderr(predicate::str::contains("both operands"));
}

#[test]
fn test_exit_statuses() {
    flint("exit 7").code(7);
    flint("exit 3\nprintln unreachable").code(3).stdout("");
    flint("exit abc")
        .code(255)
        .stderr(predicate::str::contains("exit: argument must be a number"));
    flint("exit 1 2; println still-here")
        .success()
        .stdout("still-here\n");
}
