//! Shared helpers for the integration suite.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use taxform::test_utils::fixtures;
use tempfile::TempDir;

/// A temporary directory holding the files one CLI run works on.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Workspace with the basic template, valid and invalid data and the
    /// adjustment map written to `template.xml`, `data.json`, `invalid.json`
    /// and `map.xml`.
    pub fn with_basic_files() -> Self {
        let workspace = Self::new();
        workspace.write("template.xml", fixtures::BASIC_TEMPLATE);
        workspace.write("data.json", fixtures::BASIC_DATA);
        workspace.write("invalid.json", fixtures::INVALID_DATA);
        workspace.write("map.xml", fixtures::ADJUSTMENT_MAP);
        workspace
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.file(name)).unwrap()
    }

    /// A `taxform` command running inside the workspace with a clean
    /// environment for configuration and logging.
    pub fn taxform(&self) -> Command {
        let mut cmd = Command::cargo_bin("taxform").unwrap();
        cmd.current_dir(self.path())
            .env_remove("TAXFORM_CONFIG")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}
