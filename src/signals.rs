//! Signal handling for the flint shell
//!
//! An interactive shell must survive Ctrl-C while a foreground child runs;
//! the child, sharing the terminal's process group, receives the SIGINT and
//! dies. The shell only records that the signal arrived. Forked children
//! get the default dispositions back before they run anything,
//! SIGPIPE included.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{signal, SigHandler, Signal};

/// Set once interactive handlers are installed
static INTERACTIVE: AtomicBool = AtomicBool::new(false);

/// Flag indicating SIGINT was received (set by signal handler)
pub static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install the interactive SIGINT handler. Called by the REPL only, so
/// scripts and `-c` commands keep the default behaviour.
pub fn setup_interactive_handlers() -> io::Result<()> {
    use signal_hook::low_level;

    // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
    unsafe {
        low_level::register(signal_hook::consts::SIGINT, || {
            SIGINT_RECEIVED.store(true, Ordering::SeqCst);
        })?;
    }
    INTERACTIVE.store(true, Ordering::SeqCst);
    Ok(())
}

pub fn is_interactive() -> bool {
    INTERACTIVE.load(Ordering::SeqCst)
}

/// Check if SIGINT was received and clear the flag
pub fn check_sigint() -> bool {
    SIGINT_RECEIVED.swap(false, Ordering::SeqCst)
}

/// Restore default dispositions in a freshly forked child.
///
/// The Rust runtime ignores SIGPIPE and that disposition survives exec, so
/// every child gets the default back: a pipeline writer must die once its
/// reader is gone.
pub(crate) fn reset_for_child() {
    // SAFETY: the child is single-threaded right after fork and no
    // handler of ours needs to run in it.
    unsafe {
        let _ = signal(Signal::SIGPIPE, SigHandler::SigDfl);
        if is_interactive() {
            let _ = signal(Signal::SIGINT, SigHandler::SigDfl);
        }
    }
}
