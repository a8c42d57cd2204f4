//! Timeout-bounded subprocess execution with line-wise output capture.
//!
//! Both output streams are drained on reader threads concurrently with the
//! wait. Capture must be incremental: if the child is killed on timeout,
//! everything written up to that point is still available to the caller,
//! and a full pipe buffer can never deadlock the child.

use crate::error::{CoreResult, PipelineError};

use log::debug;
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Captured output of one engine invocation, line by line.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl EngineOutput {
    /// Both streams joined into one text. The measurement report may appear
    /// on either channel depending on the engine build.
    pub fn combined_text(&self) -> String {
        let mut text = self.stdout.join("\n");
        if !text.is_empty() && !self.stderr.is_empty() {
            text.push('\n');
        }
        text.push_str(&self.stderr.join("\n"));
        text
    }

    /// The last `n` diagnostic lines, for error messages.
    pub fn stderr_tail(&self, n: usize) -> String {
        let start = self.stderr.len().saturating_sub(n);
        self.stderr[start..].join("\n")
    }
}

/// Outcome of a bounded wait on a subprocess.
#[derive(Debug)]
pub enum RunOutcome {
    /// The process exited on its own with this status.
    Completed(ExitStatus, EngineOutput),

    /// The timeout expired; the process was killed and reaped. The output
    /// captured before the kill is preserved.
    TimedOut(EngineOutput),
}

/// Runs a command to completion or until `timeout` expires.
///
/// On timeout the child is killed and then reaped, so no orphan process is
/// left behind. Exit status interpretation is left to the caller.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> CoreResult<RunOutcome> {
    debug!("Running: {:?}", cmd);

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| PipelineError::CommandStart {
            command: format!("{:?}", cmd.get_program()),
            source: e,
        })?;

    let stdout_handle = child.stdout.take().map(|r| spawn_line_reader(r, "STDOUT"));
    let stderr_handle = child.stderr.take().map(|r| spawn_line_reader(r, "STDERR"));

    let start = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if start.elapsed() >= timeout {
            break None;
        }
        thread::sleep(Duration::from_millis(100));
    };

    let timed_out = status.is_none();
    if timed_out {
        let _ = child.kill();
        // Reap the killed child so it cannot linger as a zombie.
        let _ = child.wait();
    }

    let output = EngineOutput {
        stdout: join_reader(stdout_handle),
        stderr: join_reader(stderr_handle),
    };

    match status {
        Some(status) => Ok(RunOutcome::Completed(status, output)),
        None => Ok(RunOutcome::TimedOut(output)),
    }
}

fn spawn_line_reader<R: Read + Send + 'static>(
    reader: R,
    label: &'static str,
) -> JoinHandle<Vec<String>> {
    thread::spawn(move || {
        let mut lines = Vec::new();
        for line in BufReader::new(reader).lines().map_while(Result::ok) {
            debug!("{}: {}", label, line);
            lines.push(line);
        }
        lines
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<String>>>) -> Vec<String> {
    handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default()
}
