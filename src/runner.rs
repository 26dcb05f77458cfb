//! Tool Runner
//!
//! Runs bundled device tools against an optional device serial, either
//! inheriting the console (fire-and-forget) or capturing the output.
//! Every call blocks until the child exits; there is no timeout.

use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus};

use tracing::{debug, warn};

use crate::error::{Result, ToolError};
use crate::launch::{prepare_launch, LaunchOptions, LaunchSpec};
use crate::tool::Tool;

/// Output of a captured invocation.
#[derive(Debug, Clone)]
pub struct Captured {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

/// Runs executables found in one tool directory.
///
/// The `try_*` methods return the typed error. `run`, `run_capture` and the
/// per-tool wrappers log failures and carry on.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    tool_dir: PathBuf,
}

impl ToolRunner {
    pub fn new(tool_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool_dir: tool_dir.into(),
        }
    }

    pub fn tool_dir(&self) -> &Path {
        &self.tool_dir
    }

    pub fn prepare<S: AsRef<str>>(
        &self,
        tool: impl AsRef<Path>,
        serial: Option<&str>,
        args: &[S],
        options: LaunchOptions,
    ) -> Result<LaunchSpec> {
        prepare_launch(&self.tool_dir, tool, serial, args, options)
    }

    /// Start the tool with inherited stdio and wait for it to exit.
    pub fn try_run<S: AsRef<str>>(
        &self,
        tool: impl AsRef<Path>,
        serial: Option<&str>,
        args: &[S],
    ) -> Result<ExitStatus> {
        let spec = self.prepare(tool, serial, args, LaunchOptions::fire_and_forget())?;
        debug!(command = %spec, "running tool");
        let mut child = spawn(&spec)?;
        Ok(child.wait()?)
    }

    /// Start the tool with piped stdio, wait for it and collect both streams.
    pub fn try_capture<S: AsRef<str>>(
        &self,
        tool: impl AsRef<Path>,
        serial: Option<&str>,
        args: &[S],
    ) -> Result<Captured> {
        let spec = self.prepare(tool, serial, args, LaunchOptions::capture())?;
        debug!(command = %spec, "running tool with captured output");
        let output = spawn(&spec)?.wait_with_output()?;

        Ok(Captured {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status,
        })
    }

    /// Fire-and-forget: failures are logged, never returned.
    pub fn run<S: AsRef<str>>(&self, tool: impl AsRef<Path>, serial: Option<&str>, args: &[S]) {
        let tool = tool.as_ref();
        if let Err(e) = self.try_run(tool, serial, args) {
            warn!(tool = %tool.display(), error = %e, "tool invocation failed");
        }
    }

    /// Returns the tool's stdout, or `None` if it could not be run.
    ///
    /// Anything written to stderr is logged and dropped. A tool that ran but
    /// printed nothing yields `Some("")`.
    pub fn run_capture<S: AsRef<str>>(
        &self,
        tool: impl AsRef<Path>,
        serial: Option<&str>,
        args: &[S],
    ) -> Option<String> {
        let tool = tool.as_ref();
        match self.try_capture(tool, serial, args) {
            Ok(captured) => {
                if !captured.stderr.is_empty() {
                    warn!(tool = %tool.display(), stderr = %captured.stderr.trim_end(), "tool wrote to stderr");
                }
                if !captured.status.success() {
                    debug!(tool = %tool.display(), status = %captured.status, "tool exited unsuccessfully");
                }
                Some(captured.stdout)
            }
            Err(e) => {
                warn!(tool = %tool.display(), error = %e, "tool invocation failed");
                None
            }
        }
    }

    pub fn adb<S: AsRef<str>>(&self, serial: Option<&str>, args: &[S]) {
        self.run(Tool::Adb.file_name(), serial, args)
    }

    pub fn adb_capture<S: AsRef<str>>(&self, serial: Option<&str>, args: &[S]) -> Option<String> {
        self.run_capture(Tool::Adb.file_name(), serial, args)
    }

    pub fn fastboot<S: AsRef<str>>(&self, serial: Option<&str>, args: &[S]) {
        self.run(Tool::Fastboot.file_name(), serial, args)
    }

    pub fn fastboot_capture<S: AsRef<str>>(
        &self,
        serial: Option<&str>,
        args: &[S],
    ) -> Option<String> {
        self.run_capture(Tool::Fastboot.file_name(), serial, args)
    }
}

fn spawn(spec: &LaunchSpec) -> Result<Child> {
    spec.command().spawn().map_err(|source| ToolError::Spawn {
        command: spec.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_tool_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let runner = ToolRunner::new(dir.path());

        runner.run("adb", None, &["devices"]);
        runner.adb(Some("ABC123"), &["reboot"]);
        assert_eq!(runner.run_capture("adb", None, &["devices"]), None);
        assert_eq!(runner.fastboot_capture(None, &["devices"]), None);
    }

    #[test]
    fn test_missing_tool_typed_error() {
        let dir = TempDir::new().unwrap();
        let runner = ToolRunner::new(dir.path());

        let err = runner.try_run("adb", None, &["devices"]).unwrap_err();
        assert!(matches!(err, ToolError::NotFound { ref path } if path == &dir.path().join("adb")));

        let err = runner.try_capture("fastboot", None, &["devices"]).unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));
    }

    #[test]
    fn test_runner_keeps_tool_dir() {
        let runner = ToolRunner::new("/opt/platform-tools");
        assert_eq!(runner.tool_dir(), Path::new("/opt/platform-tools"));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::fs;
        use std::thread;

        fn sh() -> ToolRunner {
            ToolRunner::new("/bin")
        }

        #[test]
        fn test_capture_returns_stdout() {
            let out = sh().run_capture("sh", None, &["-c", "printf X"]);
            assert_eq!(out.as_deref(), Some("X"));
        }

        #[test]
        fn test_stderr_only_yields_empty_string() {
            let out = sh().run_capture("sh", None, &["-c", "printf oops >&2"]);
            assert_eq!(out.as_deref(), Some(""));
        }

        #[test]
        fn test_try_capture_keeps_stderr_and_status() {
            let captured = sh()
                .try_capture("sh", None, &["-c", "printf out; printf err >&2; exit 3"])
                .unwrap();
            assert_eq!(captured.stdout, "out");
            assert_eq!(captured.stderr, "err");
            assert_eq!(captured.status.code(), Some(3));
        }

        #[test]
        fn test_nonzero_exit_still_returns_output() {
            let out = sh().run_capture("sh", None, &["-c", "printf partial; exit 1"]);
            assert_eq!(out.as_deref(), Some("partial"));
        }

        #[test]
        fn test_quotes_reach_child_intact() {
            let arg = r#"say "hello" to "device""#;
            let out = sh().run_capture("sh", None, &["-c", r#"printf '%s' "$1""#, "sh", arg]);
            assert_eq!(out.as_deref(), Some(arg));
        }

        #[test]
        fn test_serial_is_passed_before_arguments() {
            let runner = ToolRunner::new("/bin");
            let out = runner
                .run_capture("echo", Some("ABC123"), &["shell", "ls"])
                .unwrap();
            assert_eq!(out.trim_end(), "-s ABC123 shell ls");

            let out = runner.run_capture("echo", None, &["devices"]).unwrap();
            assert_eq!(out.trim_end(), "devices");
        }

        #[test]
        fn test_child_runs_in_tool_folder() {
            let out = sh().run_capture("sh", None, &["-c", "pwd"]).unwrap();
            assert_eq!(
                fs::canonicalize(out.trim_end()).unwrap(),
                fs::canonicalize("/bin").unwrap()
            );
        }

        #[test]
        fn test_try_run_waits_for_exit() {
            let status = sh().try_run("sh", None, &["-c", "exit 7"]).unwrap();
            assert_eq!(status.code(), Some(7));
        }

        #[test]
        fn test_non_executable_tool_is_spawn_failure() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("adb"), b"not a program").unwrap();
            let runner = ToolRunner::new(dir.path());

            let err = runner.try_run("adb", Some("ABC123"), &["devices"]).unwrap_err();
            match err {
                ToolError::Spawn { command, .. } => {
                    assert!(command.contains("adb"));
                    assert!(command.ends_with("-s ABC123 devices"));
                }
                other => panic!("unexpected error: {other}"),
            }

            runner.adb(None, &["devices"]);
            assert_eq!(runner.adb_capture(None, &["devices"]), None);
        }

        #[test]
        fn test_concurrent_runs_for_different_devices() {
            let runner = ToolRunner::new("/bin");
            let handles: Vec<_> = ["SERIAL_A", "SERIAL_B"]
                .into_iter()
                .map(|serial| {
                    let runner = runner.clone();
                    thread::spawn(move || runner.try_run("echo", Some(serial), &["wait-for-device"]))
                })
                .collect();

            for handle in handles {
                let status = handle.join().unwrap().unwrap();
                assert!(status.success());
            }
        }

        #[test]
        fn test_concurrent_captures_do_not_mix_output() {
            let runner = ToolRunner::new("/bin");
            let handles: Vec<_> = ["SERIAL_A", "SERIAL_B"]
                .into_iter()
                .map(|serial| {
                    let runner = runner.clone();
                    thread::spawn(move || {
                        (serial, runner.run_capture("echo", Some(serial), &["get-state"]))
                    })
                })
                .collect();

            for handle in handles {
                let (serial, out) = handle.join().unwrap();
                assert_eq!(out.unwrap().trim_end(), format!("-s {serial} get-state"));
            }
        }
    }
}
