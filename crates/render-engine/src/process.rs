//! External process invocation.

use std::process::Stdio;

use recast_common::error::{RecastError, RecastResult};

/// Result of one finished transcoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,

    pub success: bool,

    /// Captured diagnostic output.
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn succeeded() -> Self {
        Self {
            code: Some(0),
            success: true,
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            success: false,
            stderr: stderr.into(),
        }
    }

    /// Human-readable exit description.
    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Trait for transcoder backends.
#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Program name used in diagnostics.
    fn program(&self) -> &str;

    /// Run the program with `args` and wait for it to exit.
    ///
    /// A non-zero exit is reported through [`ProcessOutcome`], not as an
    /// error; `Err` means the process could not be run at all.
    async fn run(&self, args: &[String]) -> RecastResult<ProcessOutcome>;
}

/// Runs a local ffmpeg binary.
///
/// Children are killed when the future running them is dropped, so a
/// cancelled pipeline does not leave encoders behind.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    binary: String,
}

impl FfmpegRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Check if the binary can be executed.
    pub async fn is_available(&self) -> bool {
        tokio::process::Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[async_trait::async_trait]
impl ProcessRunner for FfmpegRunner {
    fn program(&self) -> &str {
        &self.binary
    }

    async fn run(&self, args: &[String]) -> RecastResult<ProcessOutcome> {
        let started = std::time::Instant::now();
        let child = tokio::process::Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RecastError::external_tool(&self.binary, "not started", format!("Failed to start: {e}"))
            })?;

        tracing::debug!(pid = child.id(), args_len = args.len(), "ffmpeg process started");

        let output = child.wait_with_output().await.map_err(|e| {
            RecastError::external_tool(&self.binary, "unknown", format!("Failed to wait: {e}"))
        })?;

        let outcome = ProcessOutcome {
            code: output.status.code(),
            success: output.status.success(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis(),
            success = outcome.success,
            "ffmpeg process exited"
        );
        Ok(outcome)
    }
}
