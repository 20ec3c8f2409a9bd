//! Single-file gzip support through `gzip`/`gunzip`
//!
//! gzip always writes its output next to its input (`<name>.gz` when
//! compressing, the name without `.gz` when extracting). The input is staged
//! in a temporary directory beside the requested destination, the tool runs
//! there, and the result is renamed into place. The staging directory is
//! removed on every exit path, so a failed run never leaves a partial file at
//! the destination.

use super::{ensure_family, ArchiveFamily, ArchiveManager};
use crate::tool::run_tool;
use crate::utils::link_or_copy;
use crate::{Error, Resource, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;
use tracing::debug;

/// Handles `.gz` files
#[derive(Debug, Clone)]
pub struct GzipManager {
    gzip: String,
    gunzip: String,
}

impl GzipManager {
    pub fn new(gzip: &str, gunzip: &str) -> Self {
        Self {
            gzip: gzip.to_string(),
            gunzip: gunzip.to_string(),
        }
    }
}

/// Scratch directory created next to `target` so the final rename stays on one filesystem
fn staging_dir_for(target: &Path) -> Result<TempDir> {
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(tempfile::Builder::new()
        .prefix(".ferry-gzip-")
        .tempdir_in(parent)?)
}

fn file_name_of(path: &Path) -> Result<PathBuf> {
    path.file_name()
        .map(PathBuf::from)
        .ok_or_else(|| Error::Validation(format!("{} does not name a file", path.display())))
}

#[async_trait]
impl ArchiveManager for GzipManager {
    async fn compress(&self, source: &Resource, destination: &Resource) -> Result<Resource> {
        ensure_family(self, "compress into", destination)?;

        let source_path = source.as_path();
        if fs::metadata(&source_path).await?.is_dir() {
            return Err(Error::Validation(
                "gzip does not support folder compression, use .tar.gz extension instead."
                    .to_string(),
            ));
        }

        let target = destination.as_path();
        let staging = staging_dir_for(&target)?;
        let staged = staging.path().join(file_name_of(&source_path)?);
        link_or_copy(&source_path, &staged).await?;

        let args = vec![
            "-k".to_string(),
            "-f".to_string(),
            staged.to_string_lossy().into_owned(),
        ];
        run_tool(&self.gzip, &args).await?;

        let mut produced = staged.into_os_string();
        produced.push(".gz");
        debug!("Moving {:?} to {:?}", produced, target);
        fs::rename(&produced, &target).await?;
        Ok(destination.clone())
    }

    async fn extract(&self, source: &Resource, destination: &Resource) -> Result<Resource> {
        ensure_family(self, "extract", source)?;

        let source_path = source.as_path();
        let archive_name = file_name_of(&source_path)?;
        let extracted_name = archive_name.with_extension("");

        let requested = destination.as_path();
        let requested_is_dir = fs::metadata(&requested)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);
        let target = if destination.filename().is_none() || requested_is_dir {
            requested.join(&extracted_name)
        } else {
            requested
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let staging = staging_dir_for(&target)?;
        let staged = staging.path().join(&archive_name);
        link_or_copy(&source_path, &staged).await?;

        let args = vec![
            "-k".to_string(),
            "-f".to_string(),
            staged.to_string_lossy().into_owned(),
        ];
        run_tool(&self.gunzip, &args).await?;

        let produced = staging.path().join(&extracted_name);
        debug!("Moving {:?} to {:?}", produced, target);
        fs::rename(&produced, &target).await?;
        Ok(Resource::from_path(target))
    }

    fn family(&self) -> ArchiveFamily {
        ArchiveFamily::Gz
    }

    fn name(&self) -> &'static str {
        "GzipManager"
    }
}
