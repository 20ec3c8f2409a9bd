//! Tar family support through the `tar` tool

use super::{ensure_family, ArchiveFamily, ArchiveManager, ArchiveType};
use crate::tool::run_tool;
use crate::utils::{absolute_path, split_parent};
use crate::{Resource, Result};
use async_trait::async_trait;
use tokio::fs;

/// Handles `.tar`, `.tar.gz`/`.tgz` and `.tar.bz2`/`.tbz2`/`.tbz`
#[derive(Debug, Clone)]
pub struct TarManager {
    program: String,
}

impl TarManager {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

fn compress_flag(archive_type: ArchiveType) -> &'static str {
    match archive_type {
        ArchiveType::TarGz => "zcf",
        ArchiveType::TarBz => "jcf",
        _ => "cf",
    }
}

fn extract_flag(archive_type: ArchiveType) -> &'static str {
    match archive_type {
        ArchiveType::TarGz => "zxvf",
        ArchiveType::TarBz => "jxvf",
        _ => "xvf",
    }
}

#[async_trait]
impl ArchiveManager for TarManager {
    async fn compress(&self, source: &Resource, destination: &Resource) -> Result<Resource> {
        ensure_family(self, "compress into", destination)?;

        let archive = absolute_path(&destination.as_path())?;
        let (workdir, entry) = split_parent(&source.as_path());
        // Keeps an archive written inside the source tree out of itself
        let exclude = format!("--exclude={}", destination.filename().unwrap_or_default());
        let args = vec![
            compress_flag(destination.archive_type()).to_string(),
            archive.to_string_lossy().into_owned(),
            exclude,
            "-C".to_string(),
            workdir.to_string_lossy().into_owned(),
            entry.to_string_lossy().into_owned(),
        ];
        run_tool(&self.program, &args).await?;
        Ok(destination.clone())
    }

    async fn extract(&self, source: &Resource, destination: &Resource) -> Result<Resource> {
        ensure_family(self, "extract", source)?;

        let archive = absolute_path(&source.as_path())?;
        let target = destination.as_path();
        fs::create_dir_all(&target).await?;
        let args = vec![
            extract_flag(source.archive_type()).to_string(),
            archive.to_string_lossy().into_owned(),
            "-C".to_string(),
            target.to_string_lossy().into_owned(),
        ];
        run_tool(&self.program, &args).await?;
        Ok(destination.clone())
    }

    fn family(&self) -> ArchiveFamily {
        ArchiveFamily::Tar
    }

    fn name(&self) -> &'static str {
        "TarManager"
    }
}
