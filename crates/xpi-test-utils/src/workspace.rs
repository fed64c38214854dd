//! [`TestWorkspace`] scratch directory for end-to-end scenarios.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::XpiBuilder;

/// A temporary directory with helpers for packages and manifests.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the workspace.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Build `xpi` and write it to `name`.
    pub fn write_xpi(&self, name: &str, xpi: XpiBuilder) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, xpi.build()).unwrap();
        path
    }

    /// Write `content` to `name`.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `value` as JSON to `name`.
    pub fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        self.write_file(name, &serde_json::to_string_pretty(value).unwrap())
    }

    /// Read `name` as text.
    pub fn read_file(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap()
    }

    /// Read and parse `name` as JSON.
    pub fn read_json(&self, name: &str) -> Value {
        serde_json::from_str(&self.read_file(name)).unwrap()
    }

    /// Sorted names of the top-level files in the workspace.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
