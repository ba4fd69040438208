//! flint - a small interactive command language
//!
//! Usage:
//!   flint               Start interactive REPL
//!   flint -c "cmd"      Execute a single command
//!   flint script.flint  Execute a script file

mod cli;
mod prompt;
mod rcfile;
mod repl;

use cli::{exit_code, execute_command, execute_script, parse_args, print_help, print_version};
use std::env;
use std::process::ExitCode;

/// Exit status for command-line usage errors
const USAGE_STATUS: u8 = 2;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let cli = parse_args(&args);

    if cli.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if cli.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    if let Some(flag) = &cli.unknown {
        eprintln!("flint: unknown option '{}'", flag);
        eprintln!("Try 'flint --help' for more information.");
        return ExitCode::from(USAGE_STATUS);
    }

    // Execute a single command
    if let Some(cmd) = &cli.command {
        return execute_command(&cli, cmd);
    }

    // Execute script
    if let Some(script) = &cli.script {
        return execute_script(&cli, script);
    }

    // Start REPL
    match repl::run_repl(&cli) {
        Ok(status) => exit_code(status),
        Err(e) => {
            eprintln!("flint: REPL error: {}", e);
            ExitCode::FAILURE
        }
    }
}
