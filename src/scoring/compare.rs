//! Cross-round score comparison.
//!
//! Takes the scored rounds of a multi-round run in order and reports
//! best/worst rounds, the average, and a coarse trend. Ties go to the
//! earliest round.

use serde::{Deserialize, Serialize};

use super::{EvaluationResult, ScoreError};

/// Direction of score movement across rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

/// A round label with its score, in run order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundScore {
    pub round: String,
    pub score: u32,
}

/// Summary of a multi-round comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub best_round: String,
    pub best_score: u32,
    pub worst_round: String,
    pub worst_score: u32,
    pub average_score: f64,
    /// Last round's score minus the first round's. Negative means regression.
    pub improvement: i64,
    pub trend: Trend,
    pub all_scores: Vec<RoundScore>,
}

/// Compare scored rounds, preserving input order for trend and ties.
pub fn compare_evaluations(
    rounds: &[(String, EvaluationResult)],
) -> Result<ComparisonResult, ScoreError> {
    let (first, rest) = rounds.split_first().ok_or(ScoreError::NoData)?;

    let mut best = first;
    let mut worst = first;
    let mut sum: u64 = first.1.score as u64;

    // Strict comparisons so the earliest round wins ties.
    for round in rest {
        if round.1.score > best.1.score {
            best = round;
        }
        if round.1.score < worst.1.score {
            worst = round;
        }
        sum += round.1.score as u64;
    }

    let first_score = first.1.score as i64;
    let last_score = rounds[rounds.len() - 1].1.score as i64;
    let improvement = last_score - first_score;

    let trend = if rounds.len() < 2 {
        Trend::InsufficientData
    } else if improvement > 0 {
        Trend::Improving
    } else if improvement < 0 {
        Trend::Declining
    } else {
        Trend::Stable
    };

    Ok(ComparisonResult {
        best_round: best.0.clone(),
        best_score: best.1.score,
        worst_round: worst.0.clone(),
        worst_score: worst.1.score,
        average_score: sum as f64 / rounds.len() as f64,
        improvement,
        trend,
        all_scores: rounds
            .iter()
            .map(|(round, evaluation)| RoundScore {
                round: round.clone(),
                score: evaluation.score,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::EvaluationDetails;

    fn scored(round: &str, score: u32) -> (String, EvaluationResult) {
        (
            round.to_string(),
            EvaluationResult {
                score,
                pass_rate: score as f64,
                success: score >= 50,
                reasoning: String::new(),
                details: EvaluationDetails {
                    passed: 0,
                    failed: 0,
                    errors: 0,
                    total: 0,
                    code_quality_metrics: None,
                },
            },
        )
    }

    #[test]
    fn test_empty_input_is_error() {
        let err = compare_evaluations(&[]).unwrap_err();
        assert!(matches!(err, ScoreError::NoData));
    }

    #[test]
    fn test_single_round() {
        let result = compare_evaluations(&[scored("round_1", 70)]).unwrap();
        assert_eq!(result.best_round, "round_1");
        assert_eq!(result.worst_round, "round_1");
        assert_eq!(result.improvement, 0);
        assert_eq!(result.trend, Trend::InsufficientData);
        assert_eq!(result.average_score, 70.0);
    }

    #[test]
    fn test_improving_trend() {
        let rounds = [scored("round_1", 40), scored("round_2", 60), scored("round_3", 85)];
        let result = compare_evaluations(&rounds).unwrap();
        assert_eq!(result.best_round, "round_3");
        assert_eq!(result.best_score, 85);
        assert_eq!(result.worst_round, "round_1");
        assert_eq!(result.improvement, 45);
        assert_eq!(result.trend, Trend::Improving);
        assert_eq!(result.all_scores.len(), 3);
    }

    #[test]
    fn test_declining_trend_negative_improvement() {
        let rounds = [scored("round_1", 80), scored("round_2", 50)];
        let result = compare_evaluations(&rounds).unwrap();
        assert_eq!(result.improvement, -30);
        assert_eq!(result.trend, Trend::Declining);
    }

    #[test]
    fn test_stable_trend_ignores_middle_rounds() {
        // Trend only looks at the endpoints.
        let rounds = [scored("round_1", 60), scored("round_2", 90), scored("round_3", 60)];
        let result = compare_evaluations(&rounds).unwrap();
        assert_eq!(result.trend, Trend::Stable);
        assert_eq!(result.best_round, "round_2");
        assert_eq!(result.average_score, 70.0);
    }

    #[test]
    fn test_ties_go_to_earliest_round() {
        let rounds = [scored("round_1", 75), scored("round_2", 75), scored("round_3", 75)];
        let result = compare_evaluations(&rounds).unwrap();
        assert_eq!(result.best_round, "round_1");
        assert_eq!(result.worst_round, "round_1");
    }
}
