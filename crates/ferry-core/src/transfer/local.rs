//! Copies the local machine can perform, with optional archive conversion

use super::{Conversion, Copier, ProviderCopier};
use crate::archive::Archiver;
use crate::{Error, Resource, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tempfile::TempDir;
use tracing::info;

/// Copier for local/local, local/cloud and cloud/local routes.
///
/// Intermediate archives and extracted trees live in a temporary directory
/// under `temp_root` that is removed when the copy finishes or fails.
#[derive(Debug, Clone)]
pub struct LocalCopier {
    source: Resource,
    destination: Resource,
    conversion: Conversion,
    temp_root: PathBuf,
    archiver: Archiver,
}

impl LocalCopier {
    pub fn new(
        source: Resource,
        destination: Resource,
        conversion: Conversion,
        temp_root: PathBuf,
        archiver: Archiver,
    ) -> Result<Self> {
        let reachable = |resource: &Resource| resource.is_local() || resource.cloud_provider().is_some();
        if !reachable(&source) || !reachable(&destination) || !(source.is_local() || destination.is_local()) {
            return Err(Error::Validation(format!(
                "Local copy needs a local path on at least one side, got {} and {}",
                source, destination
            )));
        }
        Ok(Self {
            source,
            destination,
            conversion,
            temp_root,
            archiver,
        })
    }

    fn scoped_temp_dir(&self) -> Result<TempDir> {
        std::fs::create_dir_all(&self.temp_root)?;
        Ok(tempfile::Builder::new()
            .prefix("ferry-")
            .tempdir_in(&self.temp_root)?)
    }

    fn source_archive_name(&self) -> Result<String> {
        self.source.filename().map(str::to_string).ok_or_else(|| {
            Error::Validation(format!("Can't infer archive type from source {}", self.source))
        })
    }

    fn destination_archive_name(&self) -> Result<String> {
        self.destination.filename().map(str::to_string).ok_or_else(|| {
            Error::Validation(format!(
                "Can't infer archive type from destination {}",
                self.destination
            ))
        })
    }

    async fn local_to_local(&self) -> Result<String> {
        let result = match self.conversion {
            Conversion::Extract => {
                self.source_archive_name()?;
                self.archiver.extract(&self.source, &self.destination).await?
            }
            Conversion::Compress => {
                self.destination_archive_name()?;
                self.archiver.compress(&self.source, &self.destination).await?
            }
            Conversion::None => {
                let copier = ProviderCopier::new(self.source.clone(), self.destination.clone())?;
                return copier.perform_copy().await;
            }
        };
        Ok(result.url().to_string())
    }

    async fn local_to_cloud(&self) -> Result<String> {
        let temp_dir = self.scoped_temp_dir()?;
        let upload = match self.conversion {
            Conversion::Extract => {
                self.source_archive_name()?;
                let staging = Resource::from_path(temp_dir.path().join("extracted"));
                self.archiver.extract(&self.source, &staging).await?
            }
            Conversion::Compress => {
                let archive_name = self.destination_archive_name()?;
                let staging = Resource::from_path(temp_dir.path().join(archive_name));
                self.archiver.compress(&self.source, &staging).await?
            }
            Conversion::None => self.source.clone(),
        };
        let copier = ProviderCopier::new(upload, self.destination.clone())?;
        copier.perform_copy().await
    }

    async fn cloud_to_local(&self) -> Result<String> {
        let temp_dir = self.scoped_temp_dir()?;
        let result = match self.conversion {
            Conversion::Extract => {
                let archive_name = self.source_archive_name()?;
                let download = Resource::from_path(temp_dir.path().join(archive_name));
                ProviderCopier::new(self.source.clone(), download.clone())?
                    .perform_copy()
                    .await?;
                self.archiver.extract(&download, &self.destination).await?
            }
            Conversion::Compress => {
                self.destination_archive_name()?;
                let name = self.source.filename().unwrap_or("data").to_string();
                let download = Resource::from_path(temp_dir.path().join(name));
                ProviderCopier::new(self.source.clone(), download.clone())?
                    .perform_copy()
                    .await?;
                self.archiver.compress(&download, &self.destination).await?
            }
            Conversion::None => {
                return ProviderCopier::new(self.source.clone(), self.destination.clone())?
                    .perform_copy()
                    .await;
            }
        };
        Ok(result.url().to_string())
    }
}

#[async_trait]
impl Copier for LocalCopier {
    async fn perform_copy(&self) -> Result<String> {
        info!(
            "Copying {} to {} ({:?})",
            self.source, self.destination, self.conversion
        );
        match (self.source.is_local(), self.destination.is_local()) {
            (true, true) => self.local_to_local().await,
            (true, false) => self.local_to_cloud().await,
            _ => self.cloud_to_local().await,
        }
    }
}
