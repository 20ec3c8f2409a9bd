//! Testing utilities and fixtures for ferry
//!
//! Scratch directories, payload trees, directory comparisons and an
//! in-memory job scheduler for driving remote copies without a platform.

use anyhow::Result;
use ferry_core::Resource;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub mod assertions;
pub mod fixtures;
pub mod scheduler;

pub use assertions::{assert_dirs_equal, list_tree};
pub use scheduler::ScriptedScheduler;

/// Temporary directory removed on drop
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `name` inside the directory, without creating it
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// [`Resource`] for `name` inside the directory
    pub fn resource(&self, name: &str) -> Resource {
        Resource::from_path(self.join(name))
    }

    /// Write `content` to `name`, creating parent directories
    pub fn create_file(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    pub fn create_dir(&self, name: &str) -> Result<PathBuf> {
        let path = self.join(name);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }
}
