//! C6 — Executor.
//!
//! Grounded in `codex-rs/core/src/exec.rs`: `tokio::process`,
//! `Instant`-based timing, concurrent bounded-buffer stream capture,
//! best-effort kill-on-timeout. Generalized away from codex's
//! sandbox-policy plumbing down to a plain `ExecutionResult`.

mod dry_run;
mod lexer;

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use cmdforge_core::cancel::CancellationToken;
use cmdforge_core::error::ErrorKind;
use cmdforge_core::model::Command;
use cmdforge_core::model::DryRunResult;
use cmdforge_core::model::ErrorDetail;
use cmdforge_core::model::ExecutionResult;
use cmdforge_core::traits::Executor;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tracing::instrument;

/// Upper bound on captured stdout/stderr per stream; output beyond this
/// is still drained (so the child never blocks on a full pipe) but
/// discarded.
const MAX_STREAM_OUTPUT_BYTES: usize = 1024 * 1024;

/// Conventional exit code reported when the deadline fires, matching the
/// `timeout(1)` convention.
const TIMEOUT_EXIT_CODE: i32 = 124;

pub struct ProcessExecutor {
    default_timeout: Duration,
    default_working_directory: Option<PathBuf>,
}

impl ProcessExecutor {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            default_working_directory: None,
        }
    }

    pub fn with_default_working_directory(mut self, dir: PathBuf) -> Self {
        self.default_working_directory = Some(dir);
        self
    }

    fn effective_working_directory(&self, command: &Command) -> PathBuf {
        command
            .working_directory
            .clone()
            .or_else(|| self.default_working_directory.clone())
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
    }
}

async fn read_bounded<R: AsyncRead + Unpin>(mut reader: R, max_bytes: usize) -> Vec<u8> {
    let mut chunk = [0u8; 8192];
    let mut captured = Vec::new();
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if captured.len() < max_bytes {
                    let remaining = max_bytes - captured.len();
                    captured.extend_from_slice(&chunk[..n.min(remaining)]);
                }
            }
            Err(_) => break,
        }
    }
    captured
}

fn not_validated(command: &Command, start: Instant) -> ExecutionResult {
    ExecutionResult {
        command_id: command.id,
        exit_code: ExecutionResult::NEVER_STARTED,
        stdout: Vec::new(),
        stderr: Vec::new(),
        duration: start.elapsed(),
        error: Some(ErrorDetail {
            kind: ErrorKind::Validation,
            message: "command has not passed safety validation".to_string(),
        }),
    }
}

fn parse_error(command: &Command, start: Instant, message: String) -> ExecutionResult {
    ExecutionResult {
        command_id: command.id,
        exit_code: ExecutionResult::NEVER_STARTED,
        stdout: Vec::new(),
        stderr: Vec::new(),
        duration: start.elapsed(),
        error: Some(ErrorDetail { kind: ErrorKind::Validation, message }),
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    #[instrument(skip(self, token, command), fields(command_id = command.id))]
    async fn execute(&self, token: &CancellationToken, command: &Command) -> ExecutionResult {
        let start = Instant::now();

        if !command.validated {
            return not_validated(command, start);
        }

        let tokens = match lexer::tokenize(&command.generated) {
            Ok(t) if !t.is_empty() => t,
            Ok(_) => return parse_error(command, start, "command is empty".to_string()),
            Err(e) => return parse_error(command, start, e.to_string()),
        };

        let program = tokens[0].clone();
        let args = &tokens[1..];
        let timeout = if command.timeout > Duration::ZERO { command.timeout } else { self.default_timeout };
        let working_directory = self.effective_working_directory(command);

        let mut env: HashMap<String, String> = std::env::vars().collect();
        env.extend(command.environment.clone());

        let mut builder = tokio::process::Command::new(&program);
        builder
            .args(args)
            .envs(&env)
            .current_dir(&working_directory)
            .kill_on_drop(true)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match builder.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return ExecutionResult {
                    command_id: command.id,
                    exit_code: ExecutionResult::NEVER_STARTED,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                    duration: start.elapsed(),
                    error: Some(ErrorDetail {
                        kind: ErrorKind::Execution,
                        message: format!("executable not found: {program}"),
                    }),
                }
            }
            Err(e) => {
                return ExecutionResult {
                    command_id: command.id,
                    exit_code: ExecutionResult::NEVER_STARTED,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                    duration: start.elapsed(),
                    error: Some(ErrorDetail {
                        kind: ErrorKind::Execution,
                        message: format!("failed to spawn {program}: {e}"),
                    }),
                }
            }
        };

        let stdout_handle = child.stdout.take().unwrap();
        let stderr_handle = child.stderr.take().unwrap();
        let stdout_task = tokio::spawn(read_bounded(stdout_handle, MAX_STREAM_OUTPUT_BYTES));
        let stderr_task = tokio::spawn(read_bounded(stderr_handle, MAX_STREAM_OUTPUT_BYTES));

        enum Outcome {
            Exited(std::io::Result<std::process::ExitStatus>),
            TimedOut,
            Cancelled,
        }

        let outcome = tokio::select! {
            status = child.wait() => Outcome::Exited(status),
            _ = tokio::time::sleep(timeout) => Outcome::TimedOut,
            _ = token.cancelled() => Outcome::Cancelled,
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        match outcome {
            Outcome::Exited(Ok(status)) => ExecutionResult {
                command_id: command.id,
                exit_code: status.code().unwrap_or(ExecutionResult::NEVER_STARTED),
                stdout,
                stderr,
                duration: start.elapsed(),
                error: None,
            },
            Outcome::Exited(Err(e)) => ExecutionResult {
                command_id: command.id,
                exit_code: ExecutionResult::NEVER_STARTED,
                stdout,
                stderr,
                duration: start.elapsed(),
                error: Some(ErrorDetail {
                    kind: ErrorKind::Execution,
                    message: format!("wait on child process failed: {e}"),
                }),
            },
            Outcome::TimedOut | Outcome::Cancelled => {
                let _ = child.start_kill();
                ExecutionResult {
                    command_id: command.id,
                    exit_code: TIMEOUT_EXIT_CODE,
                    stdout,
                    stderr,
                    duration: start.elapsed(),
                    error: Some(ErrorDetail {
                        kind: ErrorKind::Timeout,
                        message: "command exceeded its deadline".to_string(),
                    }),
                }
            }
        }
    }

    fn dry_run(&self, command: &Command) -> DryRunResult {
        let default_dir = self.default_working_directory.clone().unwrap_or_else(|| PathBuf::from("."));
        dry_run::dry_run(command, &default_dir)
    }
}
