//! Gradient scoring
//!
//! Converts structured test results (and optional code-quality signals)
//! into a 0-100 score. The gradient function is deterministic: pass rate
//! contributes up to 90 points (truncated, not rounded) and the quality
//! bonus up to 10, so a perfect suite without quality signals scores 90.

pub mod compare;

pub use compare::{compare_evaluations, ComparisonResult, RoundScore, Trend};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::runner::TestRunResult;

/// Scoring errors.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("program not found: {0}")]
    ProgramNotFound(PathBuf),

    #[error("no evaluations to compare")]
    NoData,
}

/// Optional code-quality signals contributing the bonus points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeQualityMetrics {
    /// Program length in lines.
    pub code_length: u32,
    pub has_error_handling: bool,
    pub has_documentation: bool,
    pub follows_conventions: bool,
}

/// Detailed breakdown carried alongside the score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationDetails {
    pub passed: u32,
    pub failed: u32,
    pub errors: u32,
    pub total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_quality_metrics: Option<CodeQualityMetrics>,
}

/// Scorer output. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Final score in [0, 100].
    pub score: u32,
    /// Percentage of tests passed, in [0, 100].
    pub pass_rate: f64,
    /// True iff the score reached the fixed 50-point threshold.
    pub success: bool,
    /// Human-readable explanation of the score.
    pub reasoning: String,
    pub details: EvaluationDetails,
}

impl EvaluationResult {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Evaluates test results into scores.
pub struct Evaluator {
    debug: bool,
}

impl Evaluator {
    pub fn new(config: &crate::config::EvalConfig) -> Self {
        Self {
            debug: config.debug,
        }
    }

    /// Evaluate a generated program against its test results.
    ///
    /// The only fatal precondition is a missing program file; zero tests
    /// or missing metrics degrade to a zero-ish score with an explanatory
    /// reasoning string.
    pub fn evaluate(
        &self,
        program_path: &Path,
        test_results: &TestRunResult,
        metrics: Option<&CodeQualityMetrics>,
    ) -> Result<EvaluationResult, ScoreError> {
        if !program_path.exists() {
            return Err(ScoreError::ProgramNotFound(program_path.to_path_buf()));
        }

        let pass_rate = test_results.pass_rate();
        let score = gradient_score(pass_rate, metrics);

        if self.debug {
            eprintln!(
                "[scorer] pass_rate={:.1} score={} total={}",
                pass_rate, score, test_results.total
            );
        }

        Ok(EvaluationResult {
            score,
            pass_rate,
            success: score >= 50,
            reasoning: reasoning(
                score,
                pass_rate,
                test_results.passed,
                test_results.failed,
                test_results.errors,
                test_results.total,
            ),
            details: EvaluationDetails {
                passed: test_results.passed,
                failed: test_results.failed,
                errors: test_results.errors,
                total: test_results.total,
                code_quality_metrics: metrics.cloned(),
            },
        })
    }

    /// Score from test results alone, without quality metrics.
    pub fn calculate_score(&self, test_results: &TestRunResult) -> u32 {
        if test_results.total == 0 {
            return 0;
        }
        gradient_score(test_results.pass_rate(), None)
    }
}

/// Gradient score: `min(100, floor(pass_rate * 0.9) + quality_bonus)`.
pub fn gradient_score(pass_rate: f64, metrics: Option<&CodeQualityMetrics>) -> u32 {
    // Truncation, not rounding: pass rate alone caps at 90.
    let base_score = (pass_rate * 0.9) as u32;
    let bonus = quality_bonus(metrics);
    (base_score + bonus).min(100)
}

/// Quality bonus in [0, 10].
pub fn quality_bonus(metrics: Option<&CodeQualityMetrics>) -> u32 {
    let Some(metrics) = metrics else {
        return 0;
    };

    let mut bonus = 0;
    if (50..=500).contains(&metrics.code_length) {
        bonus += 2;
    }
    if metrics.has_error_handling {
        bonus += 3;
    }
    if metrics.has_documentation {
        bonus += 3;
    }
    if metrics.follows_conventions {
        bonus += 2;
    }
    bonus.min(10)
}

/// Human-readable reasoning for a score.
fn reasoning(score: u32, pass_rate: f64, passed: u32, failed: u32, errors: u32, total: u32) -> String {
    if total == 0 {
        return "No tests were executed. Unable to evaluate.".to_string();
    }

    let (level, description) = if score >= 80 {
        (
            "Excellent",
            "The generated code demonstrates strong functionality with high test coverage.",
        )
    } else if score >= 60 {
        ("Good", "The generated code works well with most tests passing.")
    } else if score >= 40 {
        (
            "Moderate",
            "The generated code has partial functionality with some test failures.",
        )
    } else if score >= 20 {
        (
            "Poor",
            "The generated code has limited functionality with many test failures.",
        )
    } else {
        ("Failed", "The generated code does not function properly.")
    };

    let mut text = format!("{} ({}/100): {}\n", level, score, description);
    text.push_str(&format!(
        "Test Results: {}/{} passed ({:.1}%)",
        passed, total, pass_rate
    ));
    if failed > 0 {
        text.push_str(&format!(", {} failed", failed));
    }
    if errors > 0 {
        text.push_str(&format!(", {} errors", errors));
    }
    text
}

/// One-line production-readiness label for a score, for display only.
pub fn score_interpretation(score: u32) -> &'static str {
    if score >= 80 {
        "Excellent - Production ready"
    } else if score >= 60 {
        "Good - Ready with minor fixes"
    } else if score >= 40 {
        "Moderate - Needs significant work"
    } else if score >= 20 {
        "Poor - Major issues"
    } else {
        "Failed - Does not work"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvalConfig;
    use crate::runner::parse_test_output;
    use std::fs;
    use tempfile::TempDir;

    fn all_true_metrics() -> CodeQualityMetrics {
        CodeQualityMetrics {
            code_length: 100,
            has_error_handling: true,
            has_documentation: true,
            follows_conventions: true,
        }
    }

    #[test]
    fn test_gradient_fixed_points() {
        assert_eq!(gradient_score(0.0, None), 0);
        assert_eq!(gradient_score(50.0, None), 45);
        assert_eq!(gradient_score(100.0, None), 90);
    }

    #[test]
    fn test_gradient_truncates() {
        // 55% * 0.9 = 49.5 -> 49, not 50
        assert_eq!(gradient_score(55.0, None), 49);
    }

    #[test]
    fn test_gradient_monotonic() {
        let mut previous = 0;
        for rate in 0..=100 {
            let score = gradient_score(rate as f64, None);
            assert!(score >= previous, "score dipped at pass rate {}", rate);
            previous = score;
        }
    }

    #[test]
    fn test_quality_bonus_bounds() {
        assert_eq!(quality_bonus(None), 0);
        assert_eq!(quality_bonus(Some(&CodeQualityMetrics::default())), 0);
        assert_eq!(quality_bonus(Some(&all_true_metrics())), 10);

        let partial = CodeQualityMetrics {
            code_length: 100,
            has_error_handling: true,
            ..Default::default()
        };
        assert_eq!(quality_bonus(Some(&partial)), 5);
    }

    #[test]
    fn test_score_capped_at_100() {
        assert_eq!(gradient_score(100.0, Some(&all_true_metrics())), 100);
        // 95% -> 85 base + 10 bonus = 95
        assert_eq!(gradient_score(95.0, Some(&all_true_metrics())), 95);
    }

    #[test]
    fn test_evaluate_requires_program() {
        let evaluator = Evaluator::new(&EvalConfig::default());
        let results = parse_test_output("1 passed in 0.01s", "", 0);
        let err = evaluator
            .evaluate(Path::new("/nonexistent/cli_tool.py"), &results, None)
            .unwrap_err();
        assert!(matches!(err, ScoreError::ProgramNotFound(_)));
    }

    #[test]
    fn test_evaluate_full_pass() {
        let dir = TempDir::new().unwrap();
        let program = dir.path().join("cli_tool.py");
        fs::write(&program, "print('hi')").unwrap();

        let evaluator = Evaluator::new(&EvalConfig::default());
        let results = parse_test_output("4 passed in 0.1s", "", 0);
        let evaluation = evaluator.evaluate(&program, &results, None).unwrap();

        assert_eq!(evaluation.score, 90);
        assert_eq!(evaluation.pass_rate, 100.0);
        assert!(evaluation.success);
        assert!(evaluation.reasoning.starts_with("Excellent (90/100):"));
        assert!(evaluation.reasoning.contains("4/4 passed (100.0%)"));
    }

    #[test]
    fn test_evaluate_zero_tests_reasoning() {
        let dir = TempDir::new().unwrap();
        let program = dir.path().join("cli_tool.py");
        fs::write(&program, "print('hi')").unwrap();

        let evaluator = Evaluator::new(&EvalConfig::default());
        let results = parse_test_output("no recognizable output", "", 0);
        let evaluation = evaluator.evaluate(&program, &results, None).unwrap();

        assert_eq!(evaluation.score, 0);
        assert_eq!(
            evaluation.reasoning,
            "No tests were executed. Unable to evaluate."
        );
        assert!(!evaluation.success);
    }

    #[test]
    fn test_reasoning_mentions_failures_and_errors() {
        let text = reasoning(45, 50.0, 2, 1, 1, 4);
        assert!(text.starts_with("Moderate (45/100):"));
        assert!(text.contains("2/4 passed (50.0%)"));
        assert!(text.contains(", 1 failed"));
        assert!(text.contains(", 1 errors"));
    }

    #[test]
    fn test_success_threshold() {
        // Threshold is on the score, not the pass rate: 55% pass -> 49.
        let dir = TempDir::new().unwrap();
        let program = dir.path().join("cli_tool.py");
        fs::write(&program, "x").unwrap();

        let evaluator = Evaluator::new(&EvalConfig::default());
        let results = parse_test_output("11 passed, 9 failed in 0.5s", "", 1);
        let evaluation = evaluator.evaluate(&program, &results, None).unwrap();
        assert_eq!(evaluation.pass_rate, 55.0);
        assert_eq!(evaluation.score, 49);
        assert!(!evaluation.success);
    }

    #[test]
    fn test_calculate_score_zero_total() {
        let evaluator = Evaluator::new(&EvalConfig::default());
        let results = parse_test_output("nothing", "", 0);
        assert_eq!(evaluator.calculate_score(&results), 0);
    }

    #[test]
    fn test_interpretation_bands() {
        assert_eq!(score_interpretation(90), "Excellent - Production ready");
        assert_eq!(score_interpretation(80), "Excellent - Production ready");
        assert_eq!(score_interpretation(79), "Good - Ready with minor fixes");
        assert_eq!(score_interpretation(60), "Good - Ready with minor fixes");
        assert_eq!(score_interpretation(40), "Moderate - Needs significant work");
        assert_eq!(score_interpretation(20), "Poor - Major issues");
        assert_eq!(score_interpretation(19), "Failed - Does not work");
    }

    #[test]
    fn test_evaluation_json_round_trip() {
        let evaluation = EvaluationResult {
            score: 72,
            pass_rate: 80.0,
            success: true,
            reasoning: "Good (72/100): ok".to_string(),
            details: EvaluationDetails {
                passed: 4,
                failed: 1,
                errors: 0,
                total: 5,
                code_quality_metrics: Some(all_true_metrics()),
            },
        };
        let json = evaluation.to_json().unwrap();
        let parsed = EvaluationResult::from_json(&json).unwrap();
        assert_eq!(parsed.score, 72);
        assert!(parsed.details.code_quality_metrics.is_some());
    }
}
