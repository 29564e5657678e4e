//! Test-output parser
//!
//! Converts the raw text output of a test run into a structured
//! `TestRunResult`. This is a pure function and it never fails: scoring a
//! batch of machine-generated code must not crash over one malformed
//! output, so any internal parse failure degrades to zeroed counts with a
//! `parse_degraded` flag instead of an error.
//!
//! The summary counts are scraped with a last-match-wins rule over the
//! concatenated streams. That rule can pick up an unrelated number if the
//! toolchain's summary-line format ever changes; it is preserved as-is for
//! compatibility with existing output.

use regex_lite::Regex;

use super::result::{TestCaseResult, TestRunResult, TestStatus};

/// Maximum number of reason lines collected per failing test.
const MAX_REASON_LINES: usize = 5;

/// Parse captured test output into a structured result.
///
/// `success` is true iff the exit code is 0 and no failed or errored tests
/// were counted. A non-zero exit code is a normal observed outcome here,
/// not an error.
pub fn parse_test_output(stdout: &str, stderr: &str, exit_code: i32) -> TestRunResult {
    match try_parse(stdout, stderr, exit_code) {
        Ok(result) => result,
        Err(note) => TestRunResult::degraded(stdout, stderr, exit_code, note),
    }
}

fn try_parse(stdout: &str, stderr: &str, exit_code: i32) -> Result<TestRunResult, String> {
    // The toolchain does not reliably separate the two streams; the summary
    // line can land on either.
    let combined = format!("{}\n{}", stdout, stderr);

    let passed = extract_count(&combined, "passed")?;
    let failed = extract_count(&combined, "failed")?;
    let errors = extract_count(&combined, "error")?;

    let total = passed + failed + errors;
    let success = exit_code == 0 && failed == 0 && errors == 0;

    Ok(TestRunResult {
        passed,
        failed,
        errors,
        total,
        success,
        exit_code,
        raw_output: stdout.to_string(),
        raw_error_output: stderr.to_string(),
        details: extract_details(stdout),
        parse_degraded: false,
        parse_error: None,
    })
}

/// Extract a test count for one keyword, e.g. "5 passed" or "2 errors".
///
/// The last occurrence wins: progress lines can mention intermediate
/// counts, while the summary line is expected to be the final one. The
/// keyword's plural form matches by prefix. No match means zero.
fn extract_count(output: &str, keyword: &str) -> Result<u32, String> {
    let pattern = format!(r"(\d+)\s+{}", keyword);
    let re = Regex::new(&pattern).map_err(|e| format!("bad count pattern: {}", e))?;

    let mut count = 0u32;
    for captures in re.captures_iter(output) {
        let digits = &captures[1];
        count = digits
            .parse::<u32>()
            .map_err(|_| format!("unparseable {} count: {}", keyword, digits))?;
    }
    Ok(count)
}

/// Extract per-test records from stdout.
///
/// Result lines look like `test_file.py::test_name PASSED`. The status
/// markers are checked in the fixed order PASSED, FAILED, ERROR; only one
/// is expected per line but the order resolves ambiguity deterministically.
fn extract_details(stdout: &str) -> Vec<TestCaseResult> {
    let mut details = Vec::new();

    for line in stdout.lines() {
        if !line.contains("::") {
            continue;
        }
        let status = if line.contains(" PASSED") {
            TestStatus::Passed
        } else if line.contains(" FAILED") {
            TestStatus::Failed
        } else if line.contains(" ERROR") {
            TestStatus::Error
        } else {
            continue;
        };

        let name = match line.split_whitespace().next() {
            Some(token) => token.to_string(),
            None => continue,
        };

        let reason = match status {
            TestStatus::Failed | TestStatus::Error => {
                extract_failure_reason(stdout, short_name(&name))
            }
            _ => String::new(),
        };

        details.push(TestCaseResult {
            name,
            status,
            reason,
        });
    }

    details
}

/// The bare test name, as it appears in the FAILURES section separators.
fn short_name(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}

/// States of the failure-reason extraction machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReasonState {
    /// Looking for the FAILURES section header.
    Searching,
    /// Inside the FAILURES section, looking for this test's separator.
    InFailuresSection,
    /// Collecting reason lines for this test.
    InTestBlock,
}

/// Extract a human-readable failure reason for one test.
///
/// Walks the FAILURES section (header tolerates 2 or 3 `=` on each side),
/// finds the separator line naming the test, then collects up to
/// `MAX_REASON_LINES` subsequent lines that either carry the `E ` prefix
/// (stripped) or mention an assertion/error keyword, stopping at the next
/// separator or test-result line. An empty result is acceptable degraded
/// behavior, not an error.
fn extract_failure_reason(output: &str, test_name: &str) -> String {
    let mut state = ReasonState::Searching;
    let mut reasons: Vec<String> = Vec::new();

    for line in output.lines() {
        match state {
            ReasonState::Searching => {
                if line.contains("== FAILURES ==") {
                    state = ReasonState::InFailuresSection;
                }
            }
            ReasonState::InFailuresSection => {
                if line.contains(test_name) && line.contains('_') {
                    state = ReasonState::InTestBlock;
                }
            }
            ReasonState::InTestBlock => {
                let trimmed = line.trim();

                // Next block or summary section ends collection.
                if line.starts_with('_')
                    || line.starts_with('=')
                    || (!trimmed.is_empty() && trimmed.contains("::") && trimmed.contains("test_"))
                {
                    break;
                }

                if let Some(stripped) = trimmed.strip_prefix("E ") {
                    reasons.push(stripped.trim_start().to_string());
                } else if !trimmed.is_empty()
                    && !trimmed.starts_with('-')
                    && has_error_keyword(trimmed)
                {
                    reasons.push(trimmed.to_string());
                }

                if reasons.len() >= MAX_REASON_LINES {
                    break;
                }
            }
        }
    }

    reasons.join(" | ")
}

fn has_error_keyword(line: &str) -> bool {
    ["assert", "Error", "Exception", "Failed", "in "]
        .iter()
        .any(|keyword| line.contains(keyword))
}
