use crate::cli::CliArgs;
use crate::prompt::{render_prompt, CONTINUATION_PROMPT};
use crate::rcfile::dirs_home;
use flint::eval::BUILTIN_NAMES;
use flint::{needs_more_input, signals};
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper, Result as RlResult};

const KEYWORDS: &[&str] = &["if", "else", "end", "while", "for", "fun"];

/// Helper struct for rustyline: command names in command position,
/// file names everywhere else
struct FlintHelper {
    filenames: FilenameCompleter,
}

impl Helper for FlintHelper {}

impl Completer for FlintHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        let prefix = &line[start..pos];

        if prefix.is_empty() || !at_command_position(&line[..start]) || prefix.contains('/') {
            return self.filenames.complete(line, pos, ctx);
        }

        let mut names: Vec<&str> = BUILTIN_NAMES
            .iter()
            .chain(KEYWORDS)
            .copied()
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort_unstable();

        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.to_string(),
                replacement: format!("{} ", name),
            })
            .collect();
        Ok((start, pairs))
    }
}

/// Whether the word after `before` starts a command.
fn at_command_position(before: &str) -> bool {
    let before = before.trim_end();
    before.is_empty() || before.ends_with(['|', '&', ';'])
}

impl Hinter for FlintHelper {
    type Hint = String;
}

impl Highlighter for FlintHelper {}

impl Validator for FlintHelper {}

// ============================================
// REPL main loop
// ============================================

/// Run the REPL. Returns the status of the last foreground job, which
/// becomes the shell's exit status on Ctrl-D.
pub(crate) fn run_repl(cli: &CliArgs) -> RlResult<i32> {
    if let Err(e) = signals::setup_interactive_handlers() {
        eprintln!("flint: warning: could not install SIGINT handler: {}", e);
    }

    let mut rl = Editor::new()?;
    rl.set_helper(Some(FlintHelper {
        filenames: FilenameCompleter::new(),
    }));

    let mut interp = cli.interpreter();

    // Try to load history
    let history_path = dirs_home().map(|h| h.join(".flint_history"));
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    // Lines of an input that is not complete yet
    let mut multiline_buffer = String::new();

    loop {
        interp.reap_background();
        if signals::check_sigint() {
            // A foreground child was interrupted; start the prompt on a fresh line
            println!();
        }

        let prompt = if multiline_buffer.is_empty() {
            render_prompt()
        } else {
            CONTINUATION_PROMPT.to_string()
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                if !multiline_buffer.is_empty() {
                    multiline_buffer.push('\n');
                }
                multiline_buffer.push_str(&line);

                if needs_more_input(&multiline_buffer) {
                    continue;
                }

                let input = std::mem::take(&mut multiline_buffer);
                if input.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input.as_str());
                interp.interpret(&input);
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C discards the current input, including pending lines
                multiline_buffer.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("flint: {}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Err(e) = rl.save_history(path) {
            eprintln!("flint: warning: could not save history: {}", e);
        }
    }

    Ok(interp.last_status())
}
