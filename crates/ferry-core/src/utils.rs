//! Filesystem helpers shared by archive managers and copiers

use crate::{Resource, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Make sure the directory a resource lives in exists.
///
/// For a file resource the parent directory is created, for a directory
/// resource the directory itself.
pub async fn ensure_folder_exists(resource: &Resource) -> Result<()> {
    let path = resource.as_path();
    let folder = if resource.filename().is_some() {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => return Ok(()),
        }
    } else {
        path
    };
    fs::create_dir_all(&folder).await?;
    Ok(())
}

/// Absolute form of `path`, resolved against the current directory
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Split a path into the directory to run an archiver in and the entry name to pass it
pub fn split_parent(path: &Path) -> (PathBuf, PathBuf) {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            (parent.to_path_buf(), PathBuf::from(name))
        }
        (_, Some(name)) => (PathBuf::from("."), PathBuf::from(name)),
        _ => (path.to_path_buf(), PathBuf::from(".")),
    }
}

/// Hard-link `source` to `target`, copying when linking is not possible
pub async fn link_or_copy(source: &Path, target: &Path) -> Result<()> {
    if fs::hard_link(source, target).await.is_err() {
        fs::copy(source, target).await?;
    }
    Ok(())
}

/// Copy a file or a directory tree from `source` to `destination`
pub async fn copy_path(source: &Path, destination: &Path) -> Result<()> {
    let metadata = fs::metadata(source).await?;
    if metadata.is_file() {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        let copied = fs::copy(source, destination).await?;
        debug!("Copied {} bytes from {:?} to {:?}", copied, source, destination);
        return Ok(());
    }

    let source = source.to_path_buf();
    let destination = destination.to_path_buf();
    tokio::task::spawn_blocking(move || copy_tree(&source, &destination))
        .await
        .map_err(std::io::Error::other)?
}

fn copy_tree(source: &Path, destination: &Path) -> Result<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(std::io::Error::other)?;
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
