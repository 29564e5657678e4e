//! Readiness Eval - test execution and scoring for generated code
//!
//! This crate implements the evaluation half of a code-generation
//! harness: it stages generated programs into isolated workspaces, runs
//! their test suites under a timeout, parses the runner's output into
//! structured results, validates CLI behavior against declarative
//! scenarios, and reduces everything to a 0-100 readiness score.

pub mod behavioral;
pub mod config;
pub mod extract;
pub mod pipeline;
pub mod process;
pub mod runner;
pub mod scoring;
pub mod workspace;

pub use behavioral::{BehavioralRequirements, BehavioralValidator, ValidationReport};
pub use config::EvalConfig;
pub use pipeline::{evaluate_unit, UnitOutcome};
pub use runner::{TestRunResult, TestRunner};
pub use scoring::{compare_evaluations, EvaluationResult, Evaluator};
pub use workspace::EvalWorkspace;
