//! Test executor
//!
//! Runs an external test toolchain against a generated test file in an
//! isolated process with a bounded wall-clock timeout, then hands the raw
//! output to the parser. A failing test suite is a normal, successfully
//! observed outcome; only environment and timeout problems are errors.

pub mod parser;
pub mod result;

pub use parser::parse_test_output;
pub use result::{TestCaseResult, TestRunResult, TestStatus};

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::config::EvalConfig;
use crate::process::{run_with_timeout, RunOutcome};

/// Test-execution errors.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("test file not found: {0}")]
    NotFound(PathBuf),

    #[error("test run timed out after {0} seconds")]
    Timeout(u64),

    #[error("test toolchain not found: {0}")]
    ToolchainMissing(String),

    #[error("failed to run tests: {0}")]
    ExecutionFailed(#[from] std::io::Error),
}

/// Runs the configured test toolchain against one test file.
pub struct TestRunner {
    test_file: PathBuf,
    test_command: Vec<String>,
    test_args: Vec<String>,
    timeout: Duration,
    debug: bool,
}

impl TestRunner {
    /// Create a runner for one test file using the shared configuration.
    pub fn new(test_file: impl Into<PathBuf>, config: &EvalConfig) -> Self {
        Self {
            test_file: test_file.into(),
            test_command: config.test_command.clone(),
            test_args: config.test_args.clone(),
            timeout: config.timeout(),
            debug: config.debug,
        }
    }

    /// Override the timeout for this runner.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the test file and return structured results.
    ///
    /// The working directory is the test file's containing directory so
    /// that relative imports and resources resolve. Never returns an error
    /// for a non-zero exit code; the parsed result records it instead.
    pub fn run(&self) -> Result<TestRunResult, RunnerError> {
        if !self.test_file.exists() {
            return Err(RunnerError::NotFound(self.test_file.clone()));
        }

        let (program, prefix_args) = self
            .test_command
            .split_first()
            .ok_or_else(|| RunnerError::ToolchainMissing("empty test command".to_string()))?;

        let working_dir = self
            .test_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut command = Command::new(program);
        command
            .args(prefix_args)
            .args(&self.test_args)
            .arg(&self.test_file)
            .current_dir(working_dir);

        if self.debug {
            eprintln!(
                "[runner] running: {} {:?} {} (timeout {}s)",
                program,
                prefix_args,
                self.test_file.display(),
                self.timeout.as_secs()
            );
        }

        let outcome = run_with_timeout(&mut command, self.timeout).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RunnerError::ToolchainMissing(program.clone())
            } else {
                RunnerError::ExecutionFailed(e)
            }
        })?;

        match outcome {
            RunOutcome::Completed(output) => {
                let result =
                    parse_test_output(&output.stdout, &output.stderr, output.exit_code);
                if self.debug {
                    eprintln!(
                        "[runner] parsed: passed={} failed={} errors={} exit={}",
                        result.passed, result.failed, result.errors, result.exit_code
                    );
                }
                Ok(result)
            }
            RunOutcome::TimedOut => Err(RunnerError::Timeout(self.timeout.as_secs())),
        }
    }
}
