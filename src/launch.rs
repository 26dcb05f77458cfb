//! Launch preparation: resolving the executable and assembling its arguments.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, ToolError};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// How the child process is attached to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Pipe stdout/stderr back to the caller instead of inheriting them.
    pub capture_output: bool,
    /// Allow the child to open a console window (Windows only).
    pub show_window: bool,
}

impl LaunchOptions {
    pub fn fire_and_forget() -> Self {
        Self {
            capture_output: false,
            show_window: false,
        }
    }

    pub fn capture() -> Self {
        Self {
            capture_output: true,
            show_window: false,
        }
    }
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self::fire_and_forget()
    }
}

/// Everything needed to start one tool invocation.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub options: LaunchOptions,
}

impl LaunchSpec {
    /// Arguments joined with single spaces, embedded double quotes backslash-escaped.
    pub fn argument_string(&self) -> String {
        self.args
            .iter()
            .map(|arg| escape_quotes(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null());

        if self.options.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            if !self.options.show_window {
                cmd.creation_flags(CREATE_NO_WINDOW);
            }
        }

        cmd
    }
}

impl fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        if !self.args.is_empty() {
            write!(f, " {}", self.argument_string())?;
        }
        Ok(())
    }
}

/// Resolve `tool` inside `tool_dir` and build the launch for it.
///
/// A non-empty `serial` targets that device with `-s <serial>`; the caller's
/// arguments follow in order.
pub fn prepare_launch<S: AsRef<str>>(
    tool_dir: &Path,
    tool: impl AsRef<Path>,
    serial: Option<&str>,
    args: &[S],
    options: LaunchOptions,
) -> Result<LaunchSpec> {
    let path = tool_dir.join(tool);
    if !path.is_file() {
        return Err(ToolError::NotFound { path });
    }
    let program = std::path::absolute(&path)?;
    let working_dir = program
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| tool_dir.to_path_buf());

    Ok(LaunchSpec {
        program,
        args: device_args(serial, args),
        working_dir,
        options,
    })
}

fn device_args<S: AsRef<str>>(serial: Option<&str>, args: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len() + 2);
    if let Some(s) = serial.filter(|s| !s.is_empty()) {
        out.push("-s".to_string());
        out.push(s.to_string());
    }
    out.extend(args.iter().map(|a| a.as_ref().to_string()));
    out
}

pub fn escape_quotes(arg: &str) -> String {
    arg.replace('"', "\\\"")
}
