//! Child-process invocation of the external solver.
//!
//! The solver is an opaque, replaceable collaborator with a fixed contract:
//! it reads one JSON object from stdin, writes one JSON diagnostic object to
//! stdout, and exits. Each invocation gets a freshly started process (no
//! reuse or pooling), so a crash in one run cannot corrupt another.
//!
//! Failures never escape as control flow. Both kinds are returned as
//! [`ExtractionFailure`] values:
//!
//! - process error: spawn failure, non-zero exit, or timeout (stderr becomes
//!   the diagnostic message)
//! - malformed output: exit 0 but stdout is not a valid diagnostic object

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::domain::{DiagnosticRecord, ExtractionFailure, FailureKind, ParameterRecord};
use crate::error::AppError;

/// How often a running solver process is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Maximum stderr excerpt length carried into a failure message.
const STDERR_EXCERPT_CHARS: usize = 400;

/// Handle for invoking the solver, one child process per call.
#[derive(Debug, Clone)]
pub struct SolverGateway {
    command: Vec<String>,
    timeout: Duration,
}

impl SolverGateway {
    pub fn new(command: Vec<String>, timeout: Duration) -> Result<Self, AppError> {
        if command.is_empty() || command[0].is_empty() {
            return Err(AppError::new(2, "Solver command is empty."));
        }
        Ok(Self { command, timeout })
    }

    /// Build a gateway from a whitespace-separated command line, e.g.
    /// `"python solver.py"`.
    ///
    /// Splitting is plain whitespace tokenization, no shell quoting. Wrap the
    /// solver in a script if it needs arguments with spaces.
    pub fn parse(command_line: &str, timeout: Duration) -> Result<Self, AppError> {
        let command: Vec<String> = command_line.split_whitespace().map(str::to_string).collect();
        if command.is_empty() {
            return Err(AppError::new(
                2,
                format!("Solver command '{command_line}' contains no tokens."),
            ));
        }
        Self::new(command, timeout)
    }

    /// Run the solver once for `record` and validate its diagnostic output.
    pub fn invoke(&self, record: &ParameterRecord) -> Result<DiagnosticRecord, ExtractionFailure> {
        let input = match serde_json::to_string(record) {
            Ok(s) => s,
            Err(e) => {
                return Err(failure(
                    record,
                    FailureKind::ProcessError,
                    format!("failed to encode solver stdin: {e}"),
                ));
            }
        };

        let mut child = match Command::new(&self.command[0])
            .args(&self.command[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return Err(failure(
                    record,
                    FailureKind::ProcessError,
                    format!("failed to spawn solver '{}': {e}", self.command[0]),
                ));
            }
        };

        // Feed stdin and close the pipe so the solver sees EOF. A write error
        // here usually means the solver already exited; the exit status below
        // decides how that run is classified.
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(input.as_bytes());
        }

        // Both pipes are drained on their own threads while we wait, so a
        // chatty solver cannot deadlock on a full pipe buffer.
        let stdout = spawn_pipe_reader(child.stdout.take());
        let stderr = spawn_pipe_reader(child.stderr.take());

        let status = match wait_with_timeout(&mut child, self.timeout) {
            Ok(status) => status,
            Err(elapsed) => {
                // Kill and reap so a wedged solver cannot stall the batch.
                // The reader threads are dropped, not joined: a grandchild
                // process could still hold the pipes open.
                let _ = child.kill();
                let _ = child.wait();
                drop(stdout);
                drop(stderr);
                return Err(failure(
                    record,
                    FailureKind::ProcessError,
                    format!("solver timed out after {:.1}s", elapsed.as_secs_f64()),
                ));
            }
        };

        let stdout = drain(stdout);
        let stderr = drain(stderr);

        if !status.success() {
            return Err(failure(
                record,
                FailureKind::ProcessError,
                format!("solver exited with {status}: {}", stderr_excerpt(&stderr)),
            ));
        }

        match parse_solver_output(&stdout) {
            Ok(out) => Ok(DiagnosticRecord {
                record: record.clone(),
                max_r: out.max_r,
                peak_r2: out.peak_r2,
                max_r_time: out.max_r_time,
                violations: out.violations,
            }),
            Err(message) => Err(failure(record, FailureKind::MalformedOutput, message)),
        }
    }
}

/// Wire shape of the solver's stdout object.
///
/// `max_R`, `peak_R2` and `violations` are required; `max_R_time` is the
/// optional peak timestamp (the detector has a documented fallback when the
/// solver does not report one).
#[derive(Debug, Deserialize)]
struct SolverOutput {
    #[serde(rename = "max_R")]
    max_r: f64,
    #[serde(rename = "peak_R2")]
    peak_r2: f64,
    violations: Vec<(f64, f64)>,
    #[serde(rename = "max_R_time", default)]
    max_r_time: Option<f64>,
}

fn parse_solver_output(stdout: &str) -> Result<SolverOutput, String> {
    let out: SolverOutput = serde_json::from_str(stdout.trim())
        .map_err(|e| format!("solver stdout is not a valid diagnostic object: {e}"))?;

    if !out.max_r.is_finite() {
        return Err(format!("non-finite max_R: {}", out.max_r));
    }
    if !out.peak_r2.is_finite() {
        return Err(format!("non-finite peak_R2: {}", out.peak_r2));
    }
    if let Some(t) = out.max_r_time {
        if !t.is_finite() {
            return Err(format!("non-finite max_R_time: {t}"));
        }
    }

    let mut prev_time = f64::NEG_INFINITY;
    for (idx, &(time, magnitude)) in out.violations.iter().enumerate() {
        if !time.is_finite() || !magnitude.is_finite() {
            return Err(format!("non-finite violation sample at index {idx}"));
        }
        if time < prev_time {
            return Err(format!(
                "violation times not ascending at index {idx} ({time} after {prev_time})"
            ));
        }
        prev_time = time;
    }

    Ok(out)
}

fn failure(record: &ParameterRecord, kind: FailureKind, message: String) -> ExtractionFailure {
    ExtractionFailure {
        kind,
        message,
        record: record.clone(),
    }
}

fn spawn_pipe_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            buf
        })
    })
}

fn drain(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus, Duration> {
    let start = Instant::now();
    loop {
        if let Ok(Some(status)) = child.try_wait() {
            return Ok(status);
        }
        if start.elapsed() >= timeout {
            return Err(start.elapsed());
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Collapse stderr to a single-line excerpt for failure messages.
fn stderr_excerpt(stderr: &str) -> String {
    let flat: String = stderr.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return "(no stderr output)".to_string();
    }
    if flat.chars().count() <= STDERR_EXCERPT_CHARS {
        return flat;
    }
    let truncated: String = flat.chars().take(STDERR_EXCERPT_CHARS).collect();
    format!("{truncated}…")
}
