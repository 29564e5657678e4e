//! Structured test-run results

use serde::{Deserialize, Serialize};

/// Status of one named test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Passed,
    Failed,
    Error,
    Unknown,
}

/// One named test's outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseResult {
    /// Fully-qualified test identifier (`file::test` form when available).
    pub name: String,
    pub status: TestStatus,
    /// Best-effort extracted failure message; empty unless the test failed
    /// or errored, and may be empty even then when extraction finds nothing.
    #[serde(default)]
    pub reason: String,
}

/// Outcome of one test-execution invocation.
///
/// Immutable after construction; the runner creates it and the scorer and
/// report generation consume it read-only. `total == passed+failed+errors`
/// when parsing succeeded; when the output could not be interpreted,
/// `parse_degraded` is set, all counts are zero and `parse_error` records
/// why. Callers must treat `total == 0` as "no scoreable data", not as
/// "all passed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRunResult {
    pub passed: u32,
    pub failed: u32,
    pub errors: u32,
    pub total: u32,
    /// True iff the process exited 0 with no failed or errored tests.
    pub success: bool,
    pub exit_code: i32,
    /// Unparsed captured stdout, retained for audit and debugging.
    pub raw_output: String,
    /// Unparsed captured stderr.
    pub raw_error_output: String,
    /// Per-test records in order of appearance in the output.
    pub details: Vec<TestCaseResult>,
    /// Set when the output could not be interpreted and counts fell back
    /// to zero.
    #[serde(default)]
    pub parse_degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl TestRunResult {
    /// A degraded result carrying only the exit code and raw streams.
    pub fn degraded(stdout: &str, stderr: &str, exit_code: i32, note: String) -> Self {
        Self {
            passed: 0,
            failed: 0,
            errors: 0,
            total: 0,
            success: exit_code == 0,
            exit_code,
            raw_output: stdout.to_string(),
            raw_error_output: stderr.to_string(),
            details: Vec::new(),
            parse_degraded: true,
            parse_error: Some(note),
        }
    }

    /// True when the run produced at least one counted test.
    pub fn has_scoreable_data(&self) -> bool {
        self.total > 0
    }

    /// Pass rate in percent; zero when no tests were counted.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.passed) / f64::from(self.total) * 100.0
        }
    }

    /// Human-readable one-line summary of the run.
    pub fn coverage_summary(&self) -> String {
        if self.total == 0 {
            return "No tests found".to_string();
        }

        let mut summary = format!(
            "{}/{} tests passed ({:.1}%)",
            self.passed,
            self.total,
            self.pass_rate()
        );
        if self.failed > 0 {
            summary.push_str(&format!(", {} failed", self.failed));
        }
        if self.errors > 0 {
            summary.push_str(&format!(", {} errors", self.errors));
        }
        summary
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
