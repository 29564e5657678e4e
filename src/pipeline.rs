//! End-to-end evaluation of a single unit.
//!
//! Stages the generated sources into an isolated workspace, runs the
//! test suite, and scores the results. The workspace is torn down when
//! the unit outcome is returned.

use serde::{Deserialize, Serialize};

use crate::config::EvalConfig;
use crate::runner::{RunnerError, TestRunResult, TestRunner};
use crate::scoring::{EvaluationResult, Evaluator, ScoreError};
use crate::workspace::EvalWorkspace;

/// Pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to stage workspace: {0}")]
    Stage(#[from] std::io::Error),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Everything produced by evaluating one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitOutcome {
    pub unit_id: String,
    pub test_results: TestRunResult,
    pub evaluation: EvaluationResult,
}

/// Evaluate one generated program against its generated test suite.
pub fn evaluate_unit(
    program_source: &str,
    test_source: &str,
    config: &EvalConfig,
) -> Result<UnitOutcome, PipelineError> {
    let workspace = EvalWorkspace::stage(program_source, test_source)?;

    let runner = TestRunner::new(workspace.tests_path().to_path_buf(), config);
    let test_results = runner.run()?;

    let evaluator = Evaluator::new(config);
    let evaluation = evaluator.evaluate(workspace.program_path(), &test_results, None)?;

    Ok(UnitOutcome {
        unit_id: workspace.unit_id().to_string(),
        test_results,
        evaluation,
    })
}
