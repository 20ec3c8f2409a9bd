//! Archive operations module
//!
//! Compression and extraction are delegated to external tools. Each archive
//! family has its own [`ArchiveManager`]; [`Archiver`] picks the manager from
//! the archive type of the destination (compress) or the source (extract).

pub mod gzip;
pub mod registry;
pub mod tar;
pub mod zip;

pub use registry::{all_extensions, is_member, is_not_member, ArchiveFamily, ArchiveType};

use crate::config::ArchiveTools;
use crate::utils::{copy_path, ensure_folder_exists};
use crate::{Error, Resource, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

/// Compress/extract capability of one archive family
#[async_trait]
pub trait ArchiveManager: Send + Sync {
    /// Compress `source` into `destination`
    async fn compress(&self, source: &Resource, destination: &Resource) -> Result<Resource>;

    /// Extract `source` into `destination`
    async fn extract(&self, source: &Resource, destination: &Resource) -> Result<Resource>;

    /// Family of archive types this manager handles
    fn family(&self) -> ArchiveFamily;

    /// Name used in logs and error messages
    fn name(&self) -> &'static str;
}

/// Fail with [`Error::UnsupportedArchiveFamily`] if `resource` is outside the manager's family
pub(crate) fn ensure_family(
    manager: &dyn ArchiveManager,
    operation: &'static str,
    resource: &Resource,
) -> Result<()> {
    let family = manager.family();
    if is_not_member(resource.archive_type(), family) {
        return Err(Error::UnsupportedArchiveFamily {
            operation,
            manager: manager.name(),
            resource: resource.url().to_string(),
            archive_type: resource.archive_type().to_string(),
            supported: family.extensions(),
        });
    }
    Ok(())
}

/// Entry point for archive conversions, configured with the tools to run
#[derive(Debug, Clone, Default)]
pub struct Archiver {
    tools: ArchiveTools,
}

impl Archiver {
    pub fn new(tools: ArchiveTools) -> Self {
        Self { tools }
    }

    /// Resolve the manager for the archive type of `archive`
    pub fn select_manager(&self, archive: &Resource) -> Result<Box<dyn ArchiveManager>> {
        match archive.archive_type().family() {
            Some(ArchiveFamily::Tar) => Ok(Box::new(tar::TarManager::new(&self.tools.tar))),
            Some(ArchiveFamily::Gz) => Ok(Box::new(gzip::GzipManager::new(
                &self.tools.gzip,
                &self.tools.gunzip,
            ))),
            Some(ArchiveFamily::Zip) => Ok(Box::new(zip::ZipManager::new(
                &self.tools.zip,
                &self.tools.unzip,
            ))),
            None => Err(Error::UnsupportedArchiveType {
                resource: archive.url().to_string(),
                supported: all_extensions(),
            }),
        }
    }

    /// Compress `source` into `destination`, inferring the format from the destination.
    ///
    /// When the source is already an archive file of the destination's type
    /// it is copied as-is. A directory is never an archive, whatever its name.
    pub async fn compress(&self, source: &Resource, destination: &Resource) -> Result<Resource> {
        ensure_folder_exists(destination).await?;

        let source_type = source.archive_type();
        let same_type = source_type != ArchiveType::Unsupported
            && source_type == destination.archive_type();
        if same_type && fs::metadata(source.as_path()).await?.is_file() {
            info!("Skipping compression step - source is already archive of the same type");
            copy_path(&source.as_path(), &destination.as_path()).await?;
            return Ok(destination.clone());
        }

        let manager = self.select_manager(destination)?;
        debug!(
            "Compressing {} into {} with {}",
            source,
            destination,
            manager.name()
        );
        manager.compress(source, destination).await
    }

    /// Extract `source` into `destination`, inferring the format from the source
    pub async fn extract(&self, source: &Resource, destination: &Resource) -> Result<Resource> {
        ensure_folder_exists(destination).await?;

        let manager = self.select_manager(source)?;
        debug!(
            "Extracting {} into {} with {}",
            source,
            destination,
            manager.name()
        );
        manager.extract(source, destination).await
    }
}

/// Compress with the default tool set
pub async fn compress(source: &Resource, destination: &Resource) -> Result<Resource> {
    Archiver::default().compress(source, destination).await
}

/// Extract with the default tool set
pub async fn extract(source: &Resource, destination: &Resource) -> Result<Resource> {
    Archiver::default().extract(source, destination).await
}
