//! Evaluation configuration
//!
//! A single `EvalConfig` value object is built once at startup and passed
//! by parameter into the test runner, behavioral validator and scorer.
//! There is no ambient global configuration. Values come from built-in
//! defaults, optionally overlaid by a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wall-clock timeout for one test-suite execution.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 180;

/// Default per-scenario timeout for behavioral validation.
pub const DEFAULT_BEHAVIORAL_TIMEOUT_SECONDS: u64 = 30;

/// Evaluation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Command that runs a test file (argv prefix; args and the test file
    /// path are appended).
    pub test_command: Vec<String>,

    /// Extra arguments inserted before the test file path.
    pub test_args: Vec<String>,

    /// Interpreter used to run a generated program for behavioral checks.
    pub interpreter: String,

    /// Maximum wall-clock time for one test-suite execution, in seconds.
    pub timeout_seconds: u64,

    /// Maximum wall-clock time for one behavioral scenario, in seconds.
    pub behavioral_timeout_seconds: u64,

    /// Directory where evaluation artifacts are written.
    pub results_dir: PathBuf,

    /// Emit component-tagged diagnostics to stderr.
    pub debug: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            test_command: vec![
                "python3".to_string(),
                "-m".to_string(),
                "pytest".to_string(),
            ],
            test_args: vec!["-v".to_string(), "--tb=short".to_string()],
            interpreter: "python3".to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            behavioral_timeout_seconds: DEFAULT_BEHAVIORAL_TIMEOUT_SECONDS,
            results_dir: PathBuf::from("results"),
            debug: false,
        }
    }
}

/// TOML overlay with every field optional; unset fields keep defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigOverlay {
    pub test_command: Option<Vec<String>>,
    pub test_args: Option<Vec<String>>,
    pub interpreter: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub behavioral_timeout_seconds: Option<u64>,
    pub results_dir: Option<PathBuf>,
    pub debug: Option<bool>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(String),

    #[error("timeout_seconds must be in (0, 86400], got {value}")]
    TimeoutOutOfBounds { value: u64 },

    #[error("behavioral_timeout_seconds must be in (0, {max}], got {value}")]
    BehavioralTimeoutOutOfBounds { value: u64, max: u64 },

    #[error("test_command must not be empty")]
    EmptyTestCommand,

    #[error("interpreter must not be empty")]
    EmptyInterpreter,
}

impl EvalConfig {
    /// Load configuration from a TOML file, overlaying built-in defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let overlay: ConfigOverlay =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config = Self::default().with_overlay(overlay);
        config.validate()?;
        Ok(config)
    }

    /// Apply an overlay on top of this configuration.
    pub fn with_overlay(mut self, overlay: ConfigOverlay) -> Self {
        if let Some(v) = overlay.test_command {
            self.test_command = v;
        }
        if let Some(v) = overlay.test_args {
            self.test_args = v;
        }
        if let Some(v) = overlay.interpreter {
            self.interpreter = v;
        }
        if let Some(v) = overlay.timeout_seconds {
            self.timeout_seconds = v;
        }
        if let Some(v) = overlay.behavioral_timeout_seconds {
            self.behavioral_timeout_seconds = v;
        }
        if let Some(v) = overlay.results_dir {
            self.results_dir = v;
        }
        if let Some(v) = overlay.debug {
            self.debug = v;
        }
        self
    }

    /// Validate configuration bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.test_command.is_empty() {
            return Err(ConfigError::EmptyTestCommand);
        }
        if self.interpreter.trim().is_empty() {
            return Err(ConfigError::EmptyInterpreter);
        }

        // timeout_seconds must be in (0, 86400]
        if self.timeout_seconds == 0 || self.timeout_seconds > 86400 {
            return Err(ConfigError::TimeoutOutOfBounds {
                value: self.timeout_seconds,
            });
        }

        // behavioral timeout must be in (0, timeout_seconds]
        if self.behavioral_timeout_seconds == 0
            || self.behavioral_timeout_seconds > self.timeout_seconds
        {
            return Err(ConfigError::BehavioralTimeoutOutOfBounds {
                value: self.behavioral_timeout_seconds,
                max: self.timeout_seconds,
            });
        }

        Ok(())
    }

    /// Test-suite timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Behavioral per-scenario timeout as a `Duration`.
    pub fn behavioral_timeout(&self) -> Duration {
        Duration::from_secs(self.behavioral_timeout_seconds)
    }

    /// Human-readable configuration summary.
    pub fn summary(&self) -> String {
        format!(
            "Configuration Summary:\n  Test command: {}\n  Interpreter: {}\n  Test timeout: {}s\n  Behavioral timeout: {}s\n  Results directory: {}\n  Debug: {}",
            self.test_command.join(" "),
            self.interpreter,
            self.timeout_seconds,
            self.behavioral_timeout_seconds,
            self.results_dir.display(),
            self.debug,
        )
    }
}
