//! Clipboard helpers run as short-lived external processes.
//!
//! The text is written to the helper's stdin from a separate thread, so a
//! helper that never reads its input still hits the timeout instead of
//! blocking the caller. The helper is expected to exit with a success status.

use std::io::{self, Read, Write};
use std::process::{Child, ChildStderr, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use super::ClipboardMechanism;
use crate::error::MechanismError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to wait on the stdin writer or stderr reader once the helper exited.
const IO_GRACE: Duration = Duration::from_millis(500);

/// An external program that reads clipboard content from stdin.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandClipboard {
    /// A helper with no timeout.
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout: None,
        }
    }

    /// Kill the helper if it has not exited after `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn spawn(&self) -> Result<Child, MechanismError> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    MechanismError::unavailable(format!("{} not found", self.program))
                }
                _ => MechanismError::Unexpected(e),
            })
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, MechanismError> {
        let Some(timeout) = self.timeout else {
            let status = child.wait();
            return reap_on_error(child, status);
        };
        let deadline = Instant::now() + timeout;
        loop {
            let polled = child.try_wait();
            if let Some(status) = reap_on_error(child, polled)? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                // The process may exit between try_wait and kill.
                let _ = child.kill();
                let reaped = child.wait();
                reap_on_error(child, reaped)?;
                return Err(MechanismError::execution_failure(format!(
                    "{} timed out after {:?}",
                    self.program, timeout
                )));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn describe_failure(&self, status: ExitStatus, child: &mut Child) -> String {
        let stderr = child
            .stderr
            .take()
            .map(drain)
            .and_then(|rx| rx.recv_timeout(IO_GRACE).ok())
            .unwrap_or_default();
        let mut reason = match status.code() {
            Some(code) => format!("{} exited with status {}", self.program, code),
            None => format!("{} terminated by signal", self.program),
        };
        let stderr = stderr.trim();
        if !stderr.is_empty() {
            reason.push_str(": ");
            reason.push_str(stderr);
        }
        reason
    }
}

impl ClipboardMechanism for CommandClipboard {
    fn name(&self) -> &str {
        &self.name
    }

    fn try_copy(&self, text: &str) -> Result<(), MechanismError> {
        let mut child = self.spawn()?;
        let written = child
            .stdin
            .take()
            .map(|stdin| feed(stdin, text.as_bytes().to_vec()));

        let status = self.wait(&mut child)?;
        if !status.success() {
            return Err(MechanismError::execution_failure(
                self.describe_failure(status, &mut child),
            ));
        }
        // stderr is left unread on success: xclip and wl-copy fork a selection
        // owner that inherits the pipe and keeps it open.
        match written.map(|rx| rx.recv_timeout(IO_GRACE)) {
            None => Ok(()),
            Some(Ok(result)) => result.map_err(MechanismError::Unexpected),
            Some(Err(_)) => Err(MechanismError::execution_failure(format!(
                "{} exited without reading its input",
                self.program
            ))),
        }
    }
}

/// Write `bytes` to the helper on a background thread, then close the pipe.
fn feed(mut stdin: ChildStdin, bytes: Vec<u8>) -> Receiver<io::Result<()>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let written = stdin.write_all(&bytes);
        drop(stdin);
        let _ = tx.send(written);
    });
    rx
}

/// Read the helper's stderr on a background thread.
fn drain(mut pipe: ChildStderr) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut out = String::new();
        let _ = pipe.read_to_string(&mut out);
        let _ = tx.send(out);
    });
    rx
}

/// Pass `result` through; on error kill and reap `child` first.
fn reap_on_error<T>(child: &mut Child, result: io::Result<T>) -> Result<T, MechanismError> {
    result.map_err(|e| {
        let _ = child.kill();
        let _ = child.wait();
        MechanismError::Unexpected(e)
    })
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;

    use super::*;

    fn sh(script: &str) -> CommandClipboard {
        CommandClipboard::new("sh", "sh", &["-c", script])
    }

    #[test]
    fn missing_program_is_unavailable() {
        let helper = CommandClipboard::new("nope", "passgen-no-such-helper", &[]);
        let err = helper.try_copy("x").unwrap_err();
        assert!(matches!(err, MechanismError::Unavailable { .. }));
        assert!(err.to_string().contains("passgen-no-such-helper not found"));
    }

    #[test]
    fn text_arrives_on_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("clip.txt");
        let target_str = target.to_str().unwrap();
        let helper = CommandClipboard::new("file", "sh", &["-c", r#"cat > "$0""#, target_str]);

        helper.try_copy("p@ss W0rd").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "p@ss W0rd");
    }

    #[test]
    fn large_text_arrives_on_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("clip.txt");
        let target_str = target.to_str().unwrap();
        let helper = CommandClipboard::new("file", "sh", &["-c", r#"cat > "$0""#, target_str])
            .with_timeout(Some(Duration::from_secs(10)));

        let text = "x".repeat(1 << 20);
        helper.try_copy(&text).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap().len(), 1 << 20);
    }

    #[test]
    fn nonzero_exit_is_execution_failure() {
        let err = sh("cat >/dev/null; echo 'no display' >&2; exit 3")
            .try_copy("x")
            .unwrap_err();
        match err {
            MechanismError::ExecutionFailure { reason } => {
                assert!(reason.contains("status 3"), "{reason}");
                assert!(reason.contains("no display"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn early_exit_without_reading_is_execution_failure() {
        let err = sh("exit 1").try_copy("x").unwrap_err();
        assert!(matches!(err, MechanismError::ExecutionFailure { .. }));
    }

    #[test]
    fn stderr_held_open_after_failure_does_not_hang() {
        // The background sleep inherits stderr and outlives the shell.
        let started = Instant::now();
        let err = sh("sleep 5 & exit 1").try_copy("x").unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(err.to_string().contains("status 1"));
    }

    #[test]
    fn hung_helper_is_killed_after_timeout() {
        let helper = CommandClipboard::new("sleepy", "sleep", &["5"])
            .with_timeout(Some(Duration::from_millis(100)));
        let started = Instant::now();
        let err = helper.try_copy("x").unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn helper_ignoring_large_input_still_times_out() {
        // 1 MiB is far beyond the pipe buffer, so the write can never finish.
        let helper = CommandClipboard::new("sleepy", "sleep", &["5"])
            .with_timeout(Some(Duration::from_millis(100)));
        let text = "x".repeat(1 << 20);
        let started = Instant::now();
        let err = helper.try_copy(&text).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(err.to_string().contains("timed out"), "{err}");
    }

    #[test]
    fn wait_error_kills_and_reaps_child() {
        let mut child = Command::new("sleep")
            .arg("5")
            .stdin(Stdio::null())
            .spawn()
            .unwrap();
        let err = reap_on_error::<()>(&mut child, Err(io::Error::other("wait failed")))
            .unwrap_err();
        assert!(matches!(err, MechanismError::Unexpected(_)));
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn succeeds_within_timeout() {
        let helper = CommandClipboard::new("cat", "cat", &[])
            .with_timeout(Some(Duration::from_secs(5)));
        helper.try_copy("secret").unwrap();
    }
}
