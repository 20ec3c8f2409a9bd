//! Payload trees used by archive and copy tests

use crate::TestDir;
use anyhow::Result;
use std::path::PathBuf;

/// Directory `name` holding two small files, `a` and `b`
pub fn create_two_file_dir(test_dir: &TestDir, name: &str) -> Result<PathBuf> {
    let root = test_dir.create_dir(name)?;
    test_dir.create_file(&format!("{}/a", name), b"contents of a\n")?;
    test_dir.create_file(&format!("{}/b", name), b"contents of b\n")?;
    Ok(root)
}

/// Directory `name` with nested folders, a binary file and a larger log
pub fn create_dataset_dir(test_dir: &TestDir, name: &str) -> Result<PathBuf> {
    let root = test_dir.create_dir(name)?;
    test_dir.create_file(&format!("{}/train/labels.csv", name), b"id,label\n1,cat\n2,dog\n")?;
    test_dir.create_file(&format!("{}/train/images/0001.jpg", name), &[0xFF, 0xD8, 0xFF, 0xE0])?;
    test_dir.create_file(&format!("{}/README.md", name), b"# Dataset\n")?;
    test_dir.create_file(&format!("{}/run.log", name), "line\n".repeat(4096).as_bytes())?;
    Ok(root)
}
