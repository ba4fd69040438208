//! Common test utilities for flint integration tests
//!
//! Every test drives the real binary: command substitution points file
//! descriptor 1 of the whole process at a pipe, and pipelines fork, so
//! nothing here can share a process with the test harness. Each
//! [`Sandbox`] gets its own `HOME`, which keeps the user's init file and
//! history out of the picture.

#![allow(dead_code)]

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Sandbox {
            home: tempfile::tempdir().expect("create temp HOME"),
        }
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// A `flint` command with `HOME` and the working directory set to the
    /// sandbox and no inherited depth limits.
    pub fn flint(&self) -> Command {
        let mut cmd = Command::cargo_bin("flint").expect("flint binary");
        cmd.env("HOME", self.home())
            .env_remove("FLINT_MAX_RECURSION")
            .env_remove("FLINT_MAX_ALIAS_DEPTH")
            .current_dir(self.home());
        cmd
    }

    /// `flint -c <source>`
    pub fn run(&self, source: &str) -> Command {
        let mut cmd = self.flint();
        cmd.arg("-c").arg(source);
        cmd
    }

    /// Writes `~/.config/flint/init.flint`.
    pub fn write_init(&self, content: &str) {
        let dir = self.home().join(".config").join("flint");
        fs::create_dir_all(&dir).expect("create config dir");
        fs::write(dir.join("init.flint"), content).expect("write init file");
    }

    /// Writes a file under the sandbox and returns its path.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.home().join(name);
        fs::write(&path, content).expect("write file");
        path
    }
}

/// Runs `flint -c <source>` in a fresh sandbox.
pub fn flint(source: &str) -> Assert {
    let sandbox = Sandbox::new();
    sandbox.run(source).assert()
}

/// Runs `source` and returns its standard output, asserting success.
pub fn stdout_of(source: &str) -> String {
    let sandbox = Sandbox::new();
    let output = sandbox.run(source).output().expect("run flint");
    assert!(
        output.status.success(),
        "`{}` failed with {:?}: {}",
        source,
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 output")
}
