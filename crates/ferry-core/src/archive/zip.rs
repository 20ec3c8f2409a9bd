//! Zip support through `zip`/`unzip`

use super::{ensure_family, ArchiveFamily, ArchiveManager};
use crate::tool::{run_tool, run_tool_in};
use crate::utils::{absolute_path, split_parent};
use crate::{Resource, Result};
use async_trait::async_trait;
use tokio::fs;

/// Handles `.zip` archives
#[derive(Debug, Clone)]
pub struct ZipManager {
    zip: String,
    unzip: String,
}

impl ZipManager {
    pub fn new(zip: &str, unzip: &str) -> Self {
        Self {
            zip: zip.to_string(),
            unzip: unzip.to_string(),
        }
    }
}

#[async_trait]
impl ArchiveManager for ZipManager {
    async fn compress(&self, source: &Resource, destination: &Resource) -> Result<Resource> {
        ensure_family(self, "compress into", destination)?;

        let archive = absolute_path(&destination.as_path())?;
        let (workdir, entry) = split_parent(&source.as_path());
        let args = vec![
            "-r".to_string(),
            archive.to_string_lossy().into_owned(),
            entry.to_string_lossy().into_owned(),
        ];
        run_tool_in(&self.zip, &args, Some(&workdir)).await?;
        Ok(destination.clone())
    }

    async fn extract(&self, source: &Resource, destination: &Resource) -> Result<Resource> {
        ensure_family(self, "extract", source)?;

        let target = destination.as_path();
        fs::create_dir_all(&target).await?;
        // -o: never stop at an overwrite prompt, stdin is closed
        let args = vec![
            "-o".to_string(),
            source.url().to_string(),
            "-d".to_string(),
            target.to_string_lossy().into_owned(),
        ];
        run_tool(&self.unzip, &args).await?;
        Ok(destination.clone())
    }

    fn family(&self) -> ArchiveFamily {
        ArchiveFamily::Zip
    }

    fn name(&self) -> &'static str {
        "ZipManager"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_non_zip_source() {
        let manager = ZipManager::new("zip", "unzip");
        let err = manager
            .extract(&Resource::new("/tmp/in.tar"), &Resource::new("/tmp/out/"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains(".zip"));
    }
}
