use std::env;
use std::path::Path;

const MAGENTA: &str = "\x1b[35m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Prompt shown while an incomplete input waits for more lines
pub(crate) const CONTINUATION_PROMPT: &str = "... ";

/// Render the primary prompt: the working directory (with `$HOME` shown
/// as `~`) in magenta, then ` > ` in green.
pub(crate) fn render_prompt() -> String {
    let cwd = env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "?".to_string());
    let home = env::var("HOME").ok();
    format!(
        "{}{}{}{} > {}",
        MAGENTA,
        compress_path(&cwd, home.as_deref()),
        RESET,
        GREEN,
        RESET
    )
}

/// Replace a leading home directory with `~`.
pub(crate) fn compress_path(path: &str, home: Option<&str>) -> String {
    let Some(home) = home.filter(|h| !h.is_empty() && *h != "/") else {
        return path.to_string();
    };
    let home = home.trim_end_matches('/');
    match Path::new(path).strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_itself_is_tilde() {
        assert_eq!(compress_path("/home/ada", Some("/home/ada")), "~");
        assert_eq!(compress_path("/home/ada", Some("/home/ada/")), "~");
    }

    #[test]
    fn below_home_keeps_the_rest() {
        assert_eq!(
            compress_path("/home/ada/src/flint", Some("/home/ada")),
            "~/src/flint"
        );
    }

    #[test]
    fn sibling_with_shared_prefix_is_untouched() {
        assert_eq!(compress_path("/home/adam", Some("/home/ada")), "/home/adam");
    }

    #[test]
    fn no_home_or_root_home() {
        assert_eq!(compress_path("/tmp", None), "/tmp");
        assert_eq!(compress_path("/tmp", Some("/")), "/tmp");
    }

    #[test]
    fn prompt_ends_with_marker() {
        assert!(render_prompt().ends_with(&format!("{} > {}", GREEN, RESET)));
    }
}
