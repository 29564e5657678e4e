//! Per-unit evaluation workspaces.
//!
//! Each evaluation unit gets its own temporary directory with the
//! generated program and test suite staged under their well-known
//! names. The directory is removed when the workspace is dropped, so
//! units never see each other's files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use ulid::Ulid;

use crate::extract::{PROGRAM_FILE, TEST_FILE};

/// An isolated staging directory for one evaluation unit.
pub struct EvalWorkspace {
    unit_id: String,
    dir: TempDir,
    program_path: PathBuf,
    tests_path: PathBuf,
}

impl EvalWorkspace {
    /// Create a workspace and write the program and test sources into it.
    pub fn stage(code: &str, tests: &str) -> io::Result<Self> {
        let dir = TempDir::new()?;
        let program_path = dir.path().join(PROGRAM_FILE);
        let tests_path = dir.path().join(TEST_FILE);
        fs::write(&program_path, code)?;
        fs::write(&tests_path, tests)?;

        Ok(Self {
            unit_id: Ulid::new().to_string(),
            dir,
            program_path,
            tests_path,
        })
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn program_path(&self) -> &Path {
        &self.program_path
    }

    pub fn tests_path(&self) -> &Path {
        &self.tests_path
    }
}
