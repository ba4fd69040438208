use flint::{Config, Interpreter};
use crate::rcfile::load_init_file;
use std::fs;
use std::process::ExitCode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parsed command-line arguments
pub(crate) struct CliArgs {
    pub(crate) command: Option<String>,
    pub(crate) script: Option<String>,
    pub(crate) help: bool,
    pub(crate) version: bool,
    pub(crate) norc: bool,
    pub(crate) log_tokens: bool,
    pub(crate) log_statements: bool,
    pub(crate) trace: bool,
    /// First flag we did not recognise
    pub(crate) unknown: Option<String>,
}

/// Parse command-line arguments
pub(crate) fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs {
        command: None,
        script: None,
        help: false,
        version: false,
        norc: false,
        log_tokens: false,
        log_statements: false,
        trace: false,
        unknown: None,
    };

    let mut i = 1; // Skip program name
    while i < args.len() {
        match args[i].as_str() {
            "-c" => {
                // Everything after -c is the command
                cli.command = Some(args[i + 1..].join(" "));
                break;
            }
            "--norc" => cli.norc = true,
            "--log-tokens" => cli.log_tokens = true,
            "--log-statements" => cli.log_statements = true,
            "--trace" => cli.trace = true,
            "--help" | "-h" => cli.help = true,
            "--version" | "-V" => cli.version = true,
            flag if flag.starts_with('-') => {
                if cli.unknown.is_none() {
                    cli.unknown = Some(flag.to_string());
                }
            }
            path => {
                // The first non-flag is the script; anything after it is ignored
                if cli.script.is_none() {
                    cli.script = Some(path.to_string());
                }
            }
        }
        i += 1;
    }

    cli
}

impl CliArgs {
    /// Builds the interpreter configuration: environment limits plus flags.
    pub(crate) fn config(&self) -> Config {
        Config {
            log_tokens: self.log_tokens,
            log_statements: self.log_statements,
            trace: self.trace,
            ..Config::from_env()
        }
    }

    /// A fresh interpreter with the init file already run, unless `--norc`.
    pub(crate) fn interpreter(&self) -> Interpreter {
        let mut interp = Interpreter::new(self.config());
        if !self.norc {
            load_init_file(&mut interp);
        }
        interp
    }
}

pub(crate) fn print_help() {
    println!(
        r#"flint {} - a small interactive command language

USAGE:
    flint [flags]                  Start interactive REPL
    flint [flags] -c <command>     Execute a single command
    flint [flags] <script.flint>   Execute a script file

FLAGS:
    -h, --help              Show this help message
    -V, --version           Show version
    --norc                  Skip ~/.config/flint/init.flint
    --log-tokens            Print tokens after alias expansion (stderr)
    --log-statements        Print the parsed statement tree (stderr)
    --trace                 Print each command before running it (stderr)

ENVIRONMENT:
    FLINT_MAX_RECURSION     Maximum function call depth (default 1000)
    FLINT_MAX_ALIAS_DEPTH   Maximum alias re-expansion depth (default 16)

SYNTAX:
    cmd arg 'single' "double $var"    Commands and quoting
    """multi
    line"""                           Triple-quoted strings
    $name ${{name}} $? $(cmd)         Variables, status, substitution
    a | b | c                         Pipelines
    a && b || c                       Short-circuit chains
    cmd &                             Background job
    ; or newline                      Statement separator
    # comment                         Comments

STATEMENTS:
    if <job> ... [else ...] end
    while <job> ... end
    for <name> in <string> by <delimiters> ... end
    fun <name> ... end                $1..$n and $@ inside the body

BUILTINS:
    cd [dir]                Change directory
    exit [status]           Leave the shell
    export <name> <value>   Set an environment variable
    let <name> <value>      Declare a variable in the current scope
    mut <name> <value>      Assign an existing variable
    alias [<key> <value>]   Define or list aliases
    test <a> <op> <b>       Compare numbers or strings (== != < > <= >=)
    len <value>             Print character count
    print, println          Print one string
    time <cmd...>           Run a command and print elapsed seconds
    command <cmd...>        Run a program, bypassing functions and builtins
"#,
        VERSION
    );
}

pub(crate) fn print_version() {
    println!("flint {}", VERSION);
}

/// Converts a shell status into a process exit code.
pub(crate) fn exit_code(status: i32) -> ExitCode {
    ExitCode::from(status_byte(status))
}

fn status_byte(status: i32) -> u8 {
    (status & 0xff) as u8
}

/// Execute a single command
pub(crate) fn execute_command(cli: &CliArgs, command: &str) -> ExitCode {
    let mut interp = cli.interpreter();
    exit_code(interp.interpret(command))
}

/// Execute a script file as one source
pub(crate) fn execute_script(cli: &CliArgs, path: &str) -> ExitCode {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("flint: {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let mut interp = cli.interpreter();
    exit_code(interp.interpret(&content))
}
