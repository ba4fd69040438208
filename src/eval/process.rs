//! Process orchestration: fork/exec, N-stage pipelines and background jobs.
//!
//! Every pipe end is an [`OwnedFd`], so dropping it is closing it. The
//! parent drops each end as soon as the child that needs it has been
//! forked; a child dups its ends onto stdin/stdout and drops the originals
//! before it runs anything. No stage therefore holds a write end it does
//! not own, and every reader sees EOF once its writer exits.

use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::process;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{dup2, execvp, fork, pipe, ForkResult, Pid};

use super::{EvalError, Interpreter};
use crate::ast::Job;
use crate::expand;
use crate::lexer::TokenKind;
use crate::signals;

impl Interpreter {
    /// Fork, exec `args` in the child, and wait for it.
    pub(crate) fn run_external(&mut self, args: &[String]) -> Result<i32, EvalError> {
        match fork_or_exit() {
            ForkResult::Child => exec_or_exit(args),
            ForkResult::Parent { child } => wait_for(child),
        }
    }

    /// Run `a | b | ... | z` with every stage in its own process.
    /// The status is that of the last stage.
    pub(crate) fn evaluate_pipeline(&mut self, job: &Job) -> Result<i32, EvalError> {
        let stages = pipeline_stages(job);
        let mut children = Vec::with_capacity(stages.len());
        let mut input: Option<OwnedFd> = None;

        for (index, stage) in stages.iter().enumerate() {
            let output = if index + 1 < stages.len() {
                match pipe() {
                    Ok(ends) => Some(ends),
                    Err(errno) => {
                        self.background.extend(children);
                        return Err(EvalError::Pipe(errno));
                    }
                }
            } else {
                None
            };

            match fork_or_exit() {
                ForkResult::Child => {
                    if let Some(read_end) = input.take() {
                        redirect_or_exit(read_end, libc::STDIN_FILENO);
                    }
                    if let Some((read_end, write_end)) = output {
                        drop(read_end);
                        redirect_or_exit(write_end, libc::STDOUT_FILENO);
                    }
                    let status = self.run_stage(stage);
                    exit_child(status)
                }
                ForkResult::Parent { child } => {
                    children.push(child);
                    drop(input.take());
                    input = output.map(|(read_end, write_end)| {
                        drop(write_end);
                        read_end
                    });
                }
            }
        }

        let mut status = 0;
        for child in children {
            status = wait_for(child)?;
        }
        Ok(status)
    }

    /// Body of one pipeline stage, already running in its own process.
    /// A plain external command is exec'ed in place.
    fn run_stage(&mut self, stage: &Job) -> i32 {
        let result = match stage {
            Job::Command { argv } => expand::expand_argv(argv, self).and_then(|args| {
                match args.first() {
                    Some(name) if !self.is_internal(name) => {
                        self.trace(&args);
                        exec_or_exit(&args)
                    }
                    _ => self.exec_command(&args),
                }
            }),
            other => self.evaluate_job(other),
        };
        result.unwrap_or_else(|e| {
            eprintln!("flint: {}", e);
            1
        })
    }

    /// `job &`: the child runs the job and reports how it ended; the parent
    /// returns at once.
    pub(crate) fn spawn_background(&mut self, job: &Job) -> Result<i32, EvalError> {
        match fork_or_exit() {
            ForkResult::Child => {
                let status = self.evaluate_job(job).unwrap_or_else(|e| {
                    eprintln!("flint: {}", e);
                    1
                });
                if status == 0 {
                    println!("done");
                } else {
                    eprintln!("exit with status {}", status);
                }
                exit_child(status)
            }
            ForkResult::Parent { child } => {
                self.background.push(child);
                Ok(0)
            }
        }
    }

    /// Reap background children that have finished, without blocking.
    pub fn reap_background(&mut self) {
        self.background.retain(|&pid| {
            matches!(
                waitpid(pid, Some(WaitPidFlag::WNOHANG)),
                Ok(WaitStatus::StillAlive)
            )
        });
    }
}

/// Flattens the left-nested `|` chain built by the parser.
fn pipeline_stages(job: &Job) -> Vec<&Job> {
    match job {
        Job::Binary {
            operator,
            left,
            right,
        } if operator.kind == TokenKind::Pipe => {
            let mut stages = pipeline_stages(left);
            stages.push(right);
            stages
        }
        other => vec![other],
    }
}

/// Forks, treating failure as fatal to the whole shell.
fn fork_or_exit() -> ForkResult {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    // SAFETY: the child only runs interpreter code or execs; the one other
    // thread that can exist (a substitution reader) touches no shared locks
    // beyond the allocator, which the C library keeps fork-safe.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            signals::reset_for_child();
            ForkResult::Child
        }
        Ok(parent) => parent,
        Err(errno) => {
            eprintln!("Fork failed: {}", errno.desc());
            process::exit(1);
        }
    }
}

/// Replaces the current (child) process with `args`.
fn exec_or_exit(args: &[String]) -> ! {
    let name = args.first().map(String::as_str).unwrap_or_default();
    let argv: Result<Vec<CString>, _> = args
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect();

    let reason = match argv {
        Ok(argv) if !argv.is_empty() => match execvp(&argv[0], &argv) {
            Ok(never) => match never {},
            Err(errno) => errno.desc(),
        },
        Ok(_) => Errno::ENOENT.desc(),
        Err(_) => "argument contains a NUL byte",
    };
    eprintln!("'{}': {}", name, reason);
    exit_child(1)
}

fn redirect_or_exit(fd: OwnedFd, target: RawFd) {
    if let Err(errno) = dup2(fd.as_raw_fd(), target) {
        eprintln!("flint: dup2 failed: {}", errno.desc());
        exit_child(1);
    }
}

/// Leaves a forked child, flushing anything the interpreter buffered.
fn exit_child(status: i32) -> ! {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    process::exit(status)
}

/// Blocks until `pid` terminates and decodes its status: the exit code,
/// or 128 + signal number for a killed process.
pub(crate) fn wait_for(pid: Pid) -> Result<i32, EvalError> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(128 + signal as i32),
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(errno) => return Err(EvalError::Wait(errno)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use crate::ast::Statement;

    fn job(source: &str) -> Job {
        let tokens = tokenize(source).unwrap();
        match parse(&tokens, source).unwrap().remove(0) {
            Statement::Job(job) => job,
            other => panic!("expected job, got {:?}", other),
        }
    }

    #[test]
    fn pipeline_stages_flatten_in_order() {
        let job = job("a 1 | b 2 | c 3 | d");
        let stages: Vec<String> = pipeline_stages(&job).iter().map(|s| s.to_string()).collect();
        assert_eq!(stages, vec!["a 1", "b 2", "c 3", "d"]);
    }

    #[test]
    fn single_command_is_one_stage() {
        let job = job("ls -l");
        assert_eq!(pipeline_stages(&job).len(), 1);
    }

    #[test]
    fn non_pipe_operators_are_not_split() {
        let job = job("a && b");
        assert_eq!(pipeline_stages(&job).len(), 1);
    }
}
