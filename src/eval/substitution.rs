//! Standard output capture for `$(...)`.
//!
//! The inner source runs in this process against the same interpreter,
//! with file descriptor 1 pointed at a private pipe, so builtins and
//! external programs alike are captured. A helper thread drains the pipe
//! while the inner source runs; output larger than the pipe buffer would
//! otherwise block the writer forever.

use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::thread;

use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::unistd::{dup2, pipe};

use super::{EvalError, Interpreter};

impl Interpreter {
    /// Runs `source` and returns everything it wrote to standard output.
    pub(crate) fn capture_output(&mut self, source: &str) -> Result<String, EvalError> {
        io::stdout().flush()?;

        let (read_end, write_end) = pipe().map_err(EvalError::Pipe)?;
        set_cloexec(&read_end)?;
        set_cloexec(&write_end)?;

        let redirect = StdoutRedirect::to(write_end)?;
        let reader = thread::spawn(move || -> io::Result<Vec<u8>> {
            let mut buf = Vec::with_capacity(4096);
            File::from(read_end).read_to_end(&mut buf)?;
            Ok(buf)
        });

        self.interpret(source);
        drop(redirect);

        let bytes = reader
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "capture thread panicked"))??;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn set_cloexec(fd: &OwnedFd) -> Result<(), EvalError> {
    fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)).map_err(EvalError::Dup)?;
    Ok(())
}

/// Keeps the original standard output while fd 1 points elsewhere, and
/// puts it back on drop.
struct StdoutRedirect {
    saved: OwnedFd,
}

impl StdoutRedirect {
    /// Points fd 1 at `target`; `target` itself is closed on return so the
    /// only remaining write end is fd 1 (and its copies in children).
    fn to(target: OwnedFd) -> Result<Self, EvalError> {
        let saved = fcntl(libc::STDOUT_FILENO, FcntlArg::F_DUPFD_CLOEXEC(0)).map_err(EvalError::Dup)?;
        // SAFETY: fcntl just created this descriptor and nothing else owns it.
        let saved = unsafe { OwnedFd::from_raw_fd(saved) };
        dup2(target.as_raw_fd(), libc::STDOUT_FILENO).map_err(EvalError::Dup)?;
        Ok(StdoutRedirect { saved })
    }
}

impl Drop for StdoutRedirect {
    fn drop(&mut self) {
        let _ = io::stdout().flush();
        if let Err(errno) = dup2(self.saved.as_raw_fd(), libc::STDOUT_FILENO) {
            eprintln!("flint: could not restore standard output: {}", errno.desc());
        }
    }
}
