use flint::Interpreter;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Get home directory
pub(crate) fn dirs_home() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

/// Get the init file path (~/.config/flint/init.flint)
pub(crate) fn init_path() -> Option<PathBuf> {
    dirs_home().map(|h| h.join(".config").join("flint").join("init.flint"))
}

/// Run ~/.config/flint/init.flint if it exists.
///
/// The whole file is interpreted as one source, so blocks may span lines.
/// A missing file is skipped silently; an unreadable one is warned about.
pub(crate) fn load_init_file(interp: &mut Interpreter) {
    let Some(path) = init_path() else {
        return;
    };

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return,
        Err(e) => {
            eprintln!("flint: warning: {}: {}", path.display(), e);
            return;
        }
    };

    interp.interpret(&content);
}
