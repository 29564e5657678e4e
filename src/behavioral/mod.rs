//! Behavioral validation
//!
//! Runs a generated program through declarative CLI scenarios and checks
//! its observable behavior: exit codes, stdout content, stderr silence.
//! Validation never aborts a batch; a scenario that times out or fails to
//! launch is recorded as failed and the remaining scenarios still run.

pub mod report;
pub mod spec;

pub use report::render_markdown;
pub use spec::{
    ApiCapability, BehavioralRequirements, BehavioralTestSpec, Expectations, RequiredFeature,
    SpecError,
};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::config::EvalConfig;
use crate::process::{run_with_timeout, RunOutcome};

/// Stdout is truncated to this many characters when recorded as the
/// observed value of a failed content check.
const ACTUAL_SNIPPET_CHARS: usize = 200;

/// What a single check asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    ExitCode,
    StdoutContains,
    StdoutNotContains,
    StderrEmpty,
}

/// Outcome of one expectation check within a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckKind,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

/// Outcome of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub description: String,
    pub command: Vec<String>,
    pub weight: f64,
    pub passed: bool,
    pub checks: Vec<CheckResult>,
    pub stdout: String,
    pub stderr: String,
    /// None when the scenario never produced an exit code (timeout, spawn failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate validation outcome across all scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Sum of the weights of passing scenarios.
    pub score: f64,
    /// Sum of all scenario weights.
    pub total_weight: f64,
    pub passed: u32,
    pub failed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub results: Vec<ScenarioResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_name: Option<String>,
    #[serde(default)]
    pub api_capabilities: Vec<ApiCapability>,
    #[serde(default)]
    pub required_features: Vec<RequiredFeature>,
}

impl ValidationReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Score as a percentage of the total weight, 0 when weightless.
    pub fn score_percent(&self) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        self.score / self.total_weight * 100.0
    }
}

/// Runs behavioral scenarios against a generated program.
pub struct BehavioralValidator {
    requirements: BehavioralRequirements,
    interpreter: String,
    timeout: Duration,
    debug: bool,
}

impl BehavioralValidator {
    pub fn new(requirements: BehavioralRequirements, config: &EvalConfig) -> Self {
        Self {
            requirements,
            interpreter: config.interpreter.clone(),
            timeout: config.behavioral_timeout(),
            debug: config.debug,
        }
    }

    /// Validate the program against every scenario.
    ///
    /// Always returns a report. A missing program or an empty scenario
    /// list yields a zero score with `error` set rather than a failure.
    pub fn validate(&self, program: &Path, working_dir: Option<&Path>) -> ValidationReport {
        if !program.exists() {
            return self.empty_report(
                self.requirements.total_weight().max(100.0),
                format!("program not found: {}", program.display()),
            );
        }
        if self.requirements.behavioral_tests.is_empty() {
            return self.empty_report(0.0, "no behavioral tests defined".to_string());
        }

        let mut results = Vec::with_capacity(self.requirements.behavioral_tests.len());
        let mut score = 0.0;
        let mut passed = 0;
        let mut failed = 0;

        for scenario in &self.requirements.behavioral_tests {
            let result = self.run_scenario(scenario, program, working_dir);
            if self.debug {
                eprintln!(
                    "[behavioral] {} -> {}",
                    result.name,
                    if result.passed { "pass" } else { "fail" }
                );
            }
            if result.passed {
                score += result.weight;
                passed += 1;
            } else {
                failed += 1;
            }
            results.push(result);
        }

        ValidationReport {
            score,
            total_weight: self.requirements.total_weight(),
            passed,
            failed,
            error: None,
            results,
            api_name: self.requirements.api_name.clone(),
            api_capabilities: self.requirements.api_capabilities.clone(),
            required_features: self.requirements.required_features.clone(),
        }
    }

    fn empty_report(&self, total_weight: f64, error: String) -> ValidationReport {
        ValidationReport {
            score: 0.0,
            total_weight,
            passed: 0,
            failed: 0,
            error: Some(error),
            results: Vec::new(),
            api_name: self.requirements.api_name.clone(),
            api_capabilities: self.requirements.api_capabilities.clone(),
            required_features: self.requirements.required_features.clone(),
        }
    }

    fn run_scenario(
        &self,
        scenario: &BehavioralTestSpec,
        program: &Path,
        working_dir: Option<&Path>,
    ) -> ScenarioResult {
        let mut command = Command::new(&self.interpreter);
        command.arg(program).args(&scenario.command);
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let output = match run_with_timeout(&mut command, self.timeout) {
            Ok(RunOutcome::Completed(output)) => output,
            Ok(RunOutcome::TimedOut) => {
                return failed_scenario(
                    scenario,
                    format!("timed out after {}s", self.timeout.as_secs()),
                );
            }
            Err(e) => {
                return failed_scenario(scenario, format!("failed to launch program: {e}"));
            }
        };

        let checks = evaluate_checks(&scenario.expected, &output.stdout, &output.stderr, output.exit_code);
        let passed = checks.iter().all(|c| c.passed);

        ScenarioResult {
            name: scenario.name.clone(),
            description: scenario.description.clone(),
            command: scenario.command.clone(),
            weight: scenario.weight,
            passed,
            checks,
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: Some(output.exit_code),
            error: None,
        }
    }
}

fn failed_scenario(scenario: &BehavioralTestSpec, error: String) -> ScenarioResult {
    ScenarioResult {
        name: scenario.name.clone(),
        description: scenario.description.clone(),
        command: scenario.command.clone(),
        weight: scenario.weight,
        passed: false,
        checks: Vec::new(),
        stdout: String::new(),
        stderr: String::new(),
        exit_code: None,
        error: Some(error),
    }
}

fn evaluate_checks(
    expected: &Expectations,
    stdout: &str,
    stderr: &str,
    exit_code: i32,
) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    checks.push(CheckResult {
        check: CheckKind::ExitCode,
        expected: expected.exit_code.to_string(),
        actual: exit_code.to_string(),
        passed: exit_code == expected.exit_code,
    });

    let stdout_lower = stdout.to_lowercase();
    for needle in &expected.stdout_contains {
        let passed = stdout_lower.contains(&needle.to_lowercase());
        checks.push(CheckResult {
            check: CheckKind::StdoutContains,
            expected: needle.clone(),
            actual: if passed {
                needle.clone()
            } else {
                snippet(stdout)
            },
            passed,
        });
    }
    for needle in &expected.stdout_not_contains {
        let passed = !stdout_lower.contains(&needle.to_lowercase());
        checks.push(CheckResult {
            check: CheckKind::StdoutNotContains,
            expected: format!("absent: {needle}"),
            actual: if passed {
                "absent".to_string()
            } else {
                snippet(stdout)
            },
            passed,
        });
    }

    if let Some(want_empty) = expected.stderr_empty {
        let is_empty = stderr.trim().is_empty();
        checks.push(CheckResult {
            check: CheckKind::StderrEmpty,
            expected: want_empty.to_string(),
            actual: is_empty.to_string(),
            passed: is_empty == want_empty,
        });
    }

    checks
}

fn snippet(text: &str) -> String {
    text.chars().take(ACTUAL_SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // Scenarios run through `sh` so the suite has no interpreter
    // dependency beyond a POSIX shell.
    fn sh_config() -> EvalConfig {
        EvalConfig {
            interpreter: "sh".to_string(),
            behavioral_timeout_seconds: 5,
            ..Default::default()
        }
    }

    fn scenario(name: &str, args: &[&str], expected: Expectations, weight: f64) -> BehavioralTestSpec {
        BehavioralTestSpec {
            name: name.to_string(),
            description: String::new(),
            command: args.iter().map(|s| s.to_string()).collect(),
            expected,
            weight,
        }
    }

    fn write_program(dir: &TempDir, script: &str) -> std::path::PathBuf {
        let path = dir.path().join("tool.sh");
        fs::write(&path, script).unwrap();
        path
    }

    #[test]
    fn test_missing_program_scores_zero() {
        let requirements = BehavioralRequirements {
            behavioral_tests: vec![scenario("x", &[], Expectations::default(), 50.0)],
            ..Default::default()
        };
        let validator = BehavioralValidator::new(requirements, &sh_config());
        let report = validator.validate(Path::new("/nonexistent/tool.sh"), None);

        assert_eq!(report.score, 0.0);
        assert_eq!(report.total_weight, 100.0);
        assert!(report.error.as_deref().unwrap().contains("not found"));
        assert!(report.results.is_empty());
    }

    #[test]
    fn test_no_scenarios_is_flagged() {
        let dir = TempDir::new().unwrap();
        let program = write_program(&dir, "exit 0");
        let validator = BehavioralValidator::new(BehavioralRequirements::default(), &sh_config());
        let report = validator.validate(&program, None);

        assert_eq!(report.score, 0.0);
        assert_eq!(report.total_weight, 0.0);
        assert!(report.error.is_some());
    }

    #[test]
    fn test_weighted_scoring_across_scenarios() {
        let dir = TempDir::new().unwrap();
        // Echoes its first argument; exits nonzero on "bad".
        let program = write_program(&dir, "echo \"got: $1\"\n[ \"$1\" = bad ] && exit 1\nexit 0\n");

        let requirements = BehavioralRequirements {
            behavioral_tests: vec![
                scenario(
                    "echoes_arg",
                    &["hello"],
                    Expectations {
                        exit_code: 0,
                        stdout_contains: vec!["GOT: HELLO".to_string()],
                        ..Default::default()
                    },
                    10.0,
                ),
                scenario(
                    "wrong_exit",
                    &["bad"],
                    Expectations {
                        exit_code: 0,
                        ..Default::default()
                    },
                    20.0,
                ),
                scenario(
                    "rejects_bad",
                    &["bad"],
                    Expectations {
                        exit_code: 1,
                        ..Default::default()
                    },
                    30.0,
                ),
            ],
            ..Default::default()
        };

        let validator = BehavioralValidator::new(requirements, &sh_config());
        let report = validator.validate(&program, None);

        assert_eq!(report.score, 40.0);
        assert_eq!(report.total_weight, 60.0);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert!(report.error.is_none());
        assert!((report.score_percent() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_stdout_matching_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let program = write_program(&dir, "echo 'Usage: tool [OPTIONS]'\n");

        let requirements = BehavioralRequirements {
            behavioral_tests: vec![scenario(
                "help_text",
                &[],
                Expectations {
                    exit_code: 0,
                    stdout_contains: vec!["usage".to_string()],
                    stdout_not_contains: vec!["traceback".to_string()],
                    stderr_empty: Some(true),
                    ..Default::default()
                },
                10.0,
            )],
            ..Default::default()
        };

        let validator = BehavioralValidator::new(requirements, &sh_config());
        let report = validator.validate(&program, None);
        assert_eq!(report.passed, 1);
        let checks = &report.results[0].checks;
        assert_eq!(checks.len(), 4);
        assert!(checks.iter().all(|c| c.passed));
    }

    #[test]
    fn test_failed_check_records_snippet() {
        let dir = TempDir::new().unwrap();
        let program = write_program(&dir, "echo 'something else entirely'\n");

        let requirements = BehavioralRequirements {
            behavioral_tests: vec![scenario(
                "wants_usage",
                &[],
                Expectations {
                    exit_code: 0,
                    stdout_contains: vec!["usage".to_string()],
                    ..Default::default()
                },
                10.0,
            )],
            ..Default::default()
        };

        let validator = BehavioralValidator::new(requirements, &sh_config());
        let report = validator.validate(&program, None);
        let failed_check = report.results[0]
            .checks
            .iter()
            .find(|c| c.check == CheckKind::StdoutContains)
            .unwrap();
        assert!(!failed_check.passed);
        assert!(failed_check.actual.contains("something else"));
        assert!(failed_check.actual.len() <= ACTUAL_SNIPPET_CHARS);
    }

    #[test]
    fn test_timeout_fails_scenario_but_batch_continues() {
        let dir = TempDir::new().unwrap();
        let program = write_program(&dir, "if [ \"$1\" = hang ]; then sleep 30; fi\necho done\n");

        let config = EvalConfig {
            interpreter: "sh".to_string(),
            behavioral_timeout_seconds: 1,
            ..Default::default()
        };
        let requirements = BehavioralRequirements {
            behavioral_tests: vec![
                scenario("hangs", &["hang"], Expectations::default(), 10.0),
                scenario(
                    "quick",
                    &["ok"],
                    Expectations {
                        exit_code: 0,
                        stdout_contains: vec!["done".to_string()],
                        ..Default::default()
                    },
                    15.0,
                ),
            ],
            ..Default::default()
        };

        let validator = BehavioralValidator::new(requirements, &config);
        let report = validator.validate(&program, None);

        assert_eq!(report.failed, 1);
        assert_eq!(report.passed, 1);
        assert_eq!(report.score, 15.0);
        let hung = &report.results[0];
        assert!(hung.error.as_deref().unwrap().contains("timed out"));
        assert!(hung.exit_code.is_none());
        assert!(hung.checks.is_empty());
    }

    #[test]
    fn test_working_directory_applied() {
        let dir = TempDir::new().unwrap();
        let program = write_program(&dir, "pwd\n");
        let workdir = TempDir::new().unwrap();

        let requirements = BehavioralRequirements {
            behavioral_tests: vec![scenario(
                "cwd",
                &[],
                Expectations {
                    exit_code: 0,
                    stdout_contains: vec![workdir.path().to_string_lossy().to_string()],
                    ..Default::default()
                },
                1.0,
            )],
            ..Default::default()
        };

        let validator = BehavioralValidator::new(requirements, &sh_config());
        let report = validator.validate(&program, Some(workdir.path()));
        assert_eq!(report.passed, 1);
    }
}
