//! Behavioral requirements schema.
//!
//! Declarative description of the CLI scenarios a generated program must
//! satisfy, loaded from a TOML file. Each scenario carries a weight; the
//! validator's score is the sum of the weights of passing scenarios.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors loading a requirements file.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("requirements file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read requirements file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse requirements file: {0}")]
    Parse(String),
}

/// Top-level behavioral requirements document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehavioralRequirements {
    /// Display name for the API or tool under validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_name: Option<String>,
    #[serde(default)]
    pub api_capabilities: Vec<ApiCapability>,
    #[serde(default)]
    pub required_features: Vec<RequiredFeature>,
    #[serde(default)]
    pub behavioral_tests: Vec<BehavioralTestSpec>,
}

impl BehavioralRequirements {
    /// Load requirements from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        if !path.exists() {
            return Err(SpecError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| SpecError::Parse(e.to_string()))
    }

    /// Sum of all scenario weights.
    pub fn total_weight(&self) -> f64 {
        self.behavioral_tests.iter().map(|t| t.weight).sum()
    }
}

/// An API surface the generated program is expected to expose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCapability {
    pub name: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub endpoint: String,
}

fn default_method() -> String {
    "GET".to_string()
}

/// A feature the program must provide, with a reviewer-facing priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredFeature {
    pub feature: String,
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: String,
}

fn default_priority() -> String {
    "medium".to_string()
}

/// One weighted CLI scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralTestSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Arguments passed to the program after its path.
    pub command: Vec<String>,
    pub expected: Expectations,
    pub weight: f64,
}

/// Expected observable behavior for one scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expectations {
    #[serde(default)]
    pub exit_code: i32,
    /// Substrings that must appear in stdout, matched case-insensitively.
    #[serde(default)]
    pub stdout_contains: Vec<String>,
    /// Substrings that must not appear in stdout, matched case-insensitively.
    #[serde(default)]
    pub stdout_not_contains: Vec<String>,
    /// When set, asserts whether stderr is empty after trimming.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr_empty: Option<bool>,
}
