//! Builtin verbs
//!
//! Each builtin receives the full expanded argv (`args[0]` is its own
//! name) and returns an exit status. Usage errors go to stderr and yield
//! status 1; nothing here escalates into an `EvalError`.

use std::cmp::Ordering;
use std::env;
use std::io::{self, Write};
use std::process;
use std::time::Instant;

use super::Interpreter;

pub type BuiltinFn = fn(&mut Interpreter, &[String]) -> i32;

/// Names of every builtin, in lookup order.
pub const BUILTIN_NAMES: &[&str] = &[
    "cd", "exit", "export", "let", "mut", "alias", "test", "len", "print", "println", "time",
    "command",
];

pub fn lookup(name: &str) -> Option<BuiltinFn> {
    let builtin: BuiltinFn = match name {
        "cd" => builtin_cd,
        "exit" => builtin_exit,
        "export" => builtin_export,
        "let" => builtin_let,
        "mut" => builtin_mut,
        "alias" => builtin_alias,
        "test" => builtin_test,
        "len" => builtin_len,
        "print" => builtin_print,
        "println" => builtin_println,
        "time" => builtin_time,
        "command" => builtin_command,
        _ => return None,
    };
    Some(builtin)
}

/// Writes to standard output and flushes, so builtin output stays ordered
/// with output from child processes.
fn write_stdout(text: &str) -> i32 {
    let mut out = io::stdout().lock();
    match out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

fn usage(text: &str) -> i32 {
    eprintln!("usage: {}", text);
    1
}

fn builtin_cd(_: &mut Interpreter, args: &[String]) -> i32 {
    let target = match args {
        [_] => env::var("HOME").unwrap_or_else(|_| ".".to_string()),
        [_, path] => path.clone(),
        _ => {
            eprintln!("cd: too many arguments");
            return 1;
        }
    };
    if let Err(e) = env::set_current_dir(&target) {
        eprintln!("cd: {}: {}", target, e);
        return 1;
    }
    if let Ok(cwd) = env::current_dir() {
        env::set_var("PWD", cwd);
    }
    0
}

fn builtin_exit(_: &mut Interpreter, args: &[String]) -> i32 {
    let code = match args {
        [_] => 0,
        [_, code] if is_status(code) => code.parse::<u64>().map_or(255, |n| (n % 256) as i32),
        [_, _] => {
            eprintln!("exit: argument must be a number");
            255
        }
        _ => {
            eprintln!("exit: too many arguments");
            return 1;
        }
    };
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    process::exit(code)
}

fn is_status(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn builtin_export(_: &mut Interpreter, args: &[String]) -> i32 {
    let [_, name, value] = args else {
        return usage("export <name> <value>");
    };
    if name.is_empty() || name.contains(['=', '\0']) || value.contains('\0') {
        eprintln!("export: invalid variable '{}'", name);
        return 1;
    }
    env::set_var(name, value);
    0
}

fn builtin_let(interp: &mut Interpreter, args: &[String]) -> i32 {
    let [_, name, value] = args else {
        return usage("let <name> <value>");
    };
    interp.state.create_variable(name.as_str(), value.as_str());
    0
}

fn builtin_mut(interp: &mut Interpreter, args: &[String]) -> i32 {
    let [_, name, value] = args else {
        return usage("mut <name> <value>");
    };
    if interp.state.mutate_variable(name, value.as_str()) {
        return 0;
    }
    eprintln!("mut: variable '{}' doesn't exist", name);
    eprintln!("declare it with: let {} \"{}\"", name, value);
    1
}

fn builtin_alias(interp: &mut Interpreter, args: &[String]) -> i32 {
    match args {
        [_] => {
            let mut entries: Vec<_> = interp.state.aliases().iter().collect();
            entries.sort();
            let listing: String = entries
                .into_iter()
                .map(|(key, value)| format!("{} '{}'\n", key, value))
                .collect();
            write_stdout(&listing)
        }
        [_, key, value] => {
            interp.state.put_alias(key.as_str(), value.as_str());
            0
        }
        _ => usage("alias [<key> <value>]"),
    }
}

fn builtin_test(_: &mut Interpreter, args: &[String]) -> i32 {
    let [_, a, operator, b] = args else {
        return usage("test <string | number> <operator> <string | number>");
    };
    let ordering = match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (None, None) => a.cmp(b),
        _ => {
            eprintln!("test: both operands must be numbers or both strings");
            return 1;
        }
    };
    let holds = match operator.as_str() {
        "==" => ordering == Ordering::Equal,
        "!=" => ordering != Ordering::Equal,
        "<" => ordering == Ordering::Less,
        ">" => ordering == Ordering::Greater,
        "<=" => ordering != Ordering::Greater,
        ">=" => ordering != Ordering::Less,
        _ => {
            eprintln!("test: unknown operator '{}'", operator);
            return 1;
        }
    };
    if holds {
        0
    } else {
        1
    }
}

/// Decimal numbers only; words such as `inf` or `nan` compare as strings.
fn as_number(text: &str) -> Option<f64> {
    let digits = text.trim_start_matches(['+', '-']);
    if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    text.parse::<f64>().ok()
}

fn builtin_len(_: &mut Interpreter, args: &[String]) -> i32 {
    let [_, value] = args else {
        return usage("len <value>");
    };
    write_stdout(&format!("{}\n", value.chars().count()))
}

fn builtin_print(_: &mut Interpreter, args: &[String]) -> i32 {
    let [_, text] = args else {
        return usage("print <string>");
    };
    write_stdout(text)
}

fn builtin_println(_: &mut Interpreter, args: &[String]) -> i32 {
    let [_, text] = args else {
        return usage("println <string>");
    };
    write_stdout(&format!("{}\n", text))
}

fn builtin_time(interp: &mut Interpreter, args: &[String]) -> i32 {
    if args.len() < 2 {
        return usage("time <command> [args...]");
    }
    let start = Instant::now();
    let status = interp.exec_command(&args[1..]).unwrap_or_else(|e| {
        eprintln!("flint: {}", e);
        1
    });
    write_stdout(&format!("{:.6}\n", start.elapsed().as_secs_f64()));
    status
}

fn builtin_command(interp: &mut Interpreter, args: &[String]) -> i32 {
    if args.len() < 2 {
        return usage("command <program> [args...]");
    }
    interp.trace(&args[1..]);
    interp.run_external(&args[1..]).unwrap_or_else(|e| {
        eprintln!("flint: {}", e);
        1
    })
}
