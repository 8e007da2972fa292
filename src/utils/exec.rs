//! External command execution utilities.
//!
//! Provides a Builder-based API for running the diagram compilers with
//! stdin piping and captured output.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Command from a configured array, source piped over stdin
//! let output = Cmd::from_slice(&["plantuml"])
//!     .args(["-pipe", "-tsvg"])
//!     .stdin(source)
//!     .run()?;
//!
//! // With working directory
//! Cmd::new("mmdc").args(["-i", "in.mmd", "-o", "out.svg"]).cwd(dir).run()?;
//! ```

use regex::Regex;
use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    sync::LazyLock,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    stdin_data: Option<Vec<u8>>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["plantuml"]` or `["java", "-jar", "plantuml.jar"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument (empty arguments are skipped).
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set stdin data to pipe to the process.
    pub fn stdin<D: AsRef<[u8]>>(mut self, data: D) -> Self {
        self.stdin_data = Some(data.as_ref().to_vec());
        self
    }

    /// Program name for error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Execute the command and capture its output.
    ///
    /// A non-zero exit status is NOT an error here: compilers report syntax
    /// errors through their exit status and the caller inspects it.
    pub fn run(self) -> io::Result<Output> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(if self.stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        crate::debug!("exec"; "{} {}", self.program_name(), self.args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" "));

        let mut child = cmd.spawn()?;

        if let Some(data) = self.stdin_data
            && let Some(mut stdin) = child.stdin.take()
        {
            stdin.write_all(&data)?;
            // Dropping stdin closes the pipe so the child sees EOF.
        }

        child.wait_with_output()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI regex"));
    RE.replace_all(s, "")
}

/// Human readable message for a failed command.
///
/// Prefers stderr; falls back to stdout unless stdout is image markup.
pub fn failure_message(name: &str, output: &Output) -> String {
    let stderr = strip_ansi(String::from_utf8_lossy(&output.stderr).trim()).into_owned();
    if !stderr.is_empty() {
        return stderr;
    }

    let stdout = strip_ansi(String::from_utf8_lossy(&output.stdout).trim()).into_owned();
    if !stdout.is_empty() && !looks_like_markup(&stdout) {
        return stdout;
    }

    format!("`{name}` failed with {}", output.status)
}

fn looks_like_markup(text: &str) -> bool {
    text.starts_with('<') || text.starts_with("\u{89}PNG")
}
