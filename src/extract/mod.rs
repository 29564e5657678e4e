//! Artifact extraction
//!
//! Pulls the generated program and its test suite out of a model
//! response. Fenced code blocks are preferred; when the response carries
//! fewer than two Python blocks, the extractor falls back to well-known
//! files written into the working directory. A partial extraction (one
//! artifact but not both) may be retried a bounded number of times; the
//! [`ExtractionPhase`] state machine enforces the cap.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Well-known filename the generated program is expected under when the
/// response writes files instead of emitting code blocks.
pub const PROGRAM_FILE: &str = "cli_tool.py";
/// Well-known filename for the generated test suite.
pub const TEST_FILE: &str = "test_cli_tool.py";

/// Upper bound on retries after a partial extraction.
pub const MAX_PARTIAL_RETRIES: u32 = 2;

/// Extraction errors.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Fewer than two artifacts could be recovered. `found` counts how
    /// many were (0 or 1).
    #[error("incomplete extraction: found {found} of 2 artifacts")]
    Insufficient { found: u32 },
}

impl ExtractError {
    /// True when exactly one artifact was recovered, making a retry
    /// worthwhile.
    pub fn is_partial(&self) -> bool {
        matches!(self, ExtractError::Insufficient { found: 1 })
    }
}

/// A fenced code block from a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language tag after the opening fence, "text" when absent.
    pub language: String,
    pub code: String,
}

/// The program and test sources recovered from a response.
#[derive(Debug, Clone)]
pub struct GeneratedArtifacts {
    pub code: String,
    pub tests: String,
}

/// Parse triple-backtick fenced code blocks out of a response.
///
/// An unclosed trailing fence is dropped rather than capturing the rest
/// of the response.
pub fn extract_code_blocks(response: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut language: Option<String> = None;
    let mut body = String::new();

    for line in response.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("```") {
            match language.take() {
                Some(lang) => {
                    blocks.push(CodeBlock {
                        language: lang,
                        code: std::mem::take(&mut body),
                    });
                }
                None => {
                    let tag = rest.trim();
                    language = Some(if tag.is_empty() {
                        "text".to_string()
                    } else {
                        tag.to_string()
                    });
                }
            }
        } else if language.is_some() {
            body.push_str(line);
            body.push('\n');
        }
    }

    blocks
}

/// Recover the program and test artifacts from a response.
///
/// Strategy: two or more Python code blocks win outright (first is the
/// program, second the tests); otherwise the well-known files in
/// `workdir` are consulted for whatever the blocks missed.
pub fn extract_artifacts(response: &str, workdir: &Path) -> Result<GeneratedArtifacts, ExtractError> {
    let mut python = extract_code_blocks(response)
        .into_iter()
        .filter(|b| b.language == "python" || b.language == "py");

    let first = python.next();
    let second = python.next();

    if let (Some(first), Some(second)) = (&first, &second) {
        return Ok(GeneratedArtifacts {
            code: first.code.clone(),
            tests: second.code.clone(),
        });
    }

    // Fall back to files the response may have written directly.
    let code = first
        .map(|b| b.code)
        .or_else(|| std::fs::read_to_string(workdir.join(PROGRAM_FILE)).ok());
    let tests = second
        .map(|b| b.code)
        .or_else(|| std::fs::read_to_string(workdir.join(TEST_FILE)).ok());

    match (code, tests) {
        (Some(code), Some(tests)) => Ok(GeneratedArtifacts { code, tests }),
        (Some(_), None) | (None, Some(_)) => Err(ExtractError::Insufficient { found: 1 }),
        (None, None) => Err(ExtractError::Insufficient { found: 0 }),
    }
}

/// What one extraction attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Both artifacts recovered.
    Complete,
    /// Exactly one artifact recovered.
    Partial,
    /// Neither artifact recovered.
    Empty,
}

/// Retry state for artifact extraction.
///
/// Partial results earn a bounded number of retries; an empty result
/// exhausts immediately. Terminal states absorb further outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPhase {
    Attempting,
    PartialRetry(u32),
    Succeeded,
    Exhausted,
}

impl ExtractionPhase {
    pub fn new() -> Self {
        ExtractionPhase::Attempting
    }

    /// Advance the state machine with the outcome of the latest attempt.
    pub fn advance(self, outcome: AttemptOutcome) -> Self {
        match (self, outcome) {
            (ExtractionPhase::Succeeded, _) => ExtractionPhase::Succeeded,
            (ExtractionPhase::Exhausted, _) => ExtractionPhase::Exhausted,
            (_, AttemptOutcome::Complete) => ExtractionPhase::Succeeded,
            (_, AttemptOutcome::Empty) => ExtractionPhase::Exhausted,
            (ExtractionPhase::Attempting, AttemptOutcome::Partial) => {
                ExtractionPhase::PartialRetry(1)
            }
            (ExtractionPhase::PartialRetry(n), AttemptOutcome::Partial) => {
                if n >= MAX_PARTIAL_RETRIES {
                    ExtractionPhase::Exhausted
                } else {
                    ExtractionPhase::PartialRetry(n + 1)
                }
            }
        }
    }

    /// True when another extraction attempt should be made.
    pub fn should_retry(&self) -> bool {
        matches!(self, ExtractionPhase::Attempting | ExtractionPhase::PartialRetry(_))
    }
}

impl Default for ExtractionPhase {
    fn default() -> Self {
        Self::new()
    }
}
