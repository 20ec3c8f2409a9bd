//! Directory comparisons

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Sorted paths below `root`, relative to it, directories included
pub fn list_tree(root: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;
        entries.push(relative.to_path_buf());
    }
    entries.sort();
    Ok(entries)
}

/// Assert both trees hold the same relative paths with the same file contents
pub fn assert_dirs_equal(expected: &Path, actual: &Path) -> Result<()> {
    let expected_entries = list_tree(expected)?;
    let actual_entries = list_tree(actual)?;
    assert_eq!(
        expected_entries, actual_entries,
        "Trees differ: {} vs {}",
        expected.display(),
        actual.display()
    );

    for relative in &expected_entries {
        let left = expected.join(relative);
        let right = actual.join(relative);
        assert_eq!(
            left.is_file(),
            right.is_file(),
            "File type mismatch for {}",
            relative.display()
        );
        if left.is_file() {
            assert_eq!(
                std::fs::read(&left)?,
                std::fs::read(&right)?,
                "Content mismatch for {}",
                relative.display()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestDir;

    #[test]
    fn test_list_tree_is_relative_and_sorted() {
        let test_dir = TestDir::new().unwrap();
        test_dir.create_file("b.txt", b"b").unwrap();
        test_dir.create_file("a/c.txt", b"c").unwrap();

        let tree = list_tree(test_dir.path()).unwrap();
        assert_eq!(
            tree,
            vec![PathBuf::from("a"), PathBuf::from("a/c.txt"), PathBuf::from("b.txt")]
        );
    }

    #[test]
    #[should_panic(expected = "Content mismatch")]
    fn test_content_mismatch_panics() {
        let left = TestDir::new().unwrap();
        let right = TestDir::new().unwrap();
        left.create_file("f", b"one").unwrap();
        right.create_file("f", b"two").unwrap();
        assert_dirs_equal(left.path(), right.path()).unwrap();
    }
}
