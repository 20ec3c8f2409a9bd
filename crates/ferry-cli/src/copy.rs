//! Route resolution for `ferry data cp`

use anyhow::Result;
use ferry_core::archive::Archiver;
use ferry_core::config::Config;
use ferry_core::transfer::{Conversion, Copier, LocalCopier};
use ferry_core::{CloudProvider, Error, Resource, UrlType};
use ferry_remote::{CommandScheduler, JobOptions, JobSettings, PollSettings, RemoteCopier};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Endpoint kinds as far as routing is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Local,
    Cloud,
    Web,
    Storage,
    Disk,
}

impl Endpoint {
    fn of(resource: &Resource) -> Option<Self> {
        match resource.url_type() {
            UrlType::PlatformStorage => Some(Endpoint::Storage),
            UrlType::Disk => Some(Endpoint::Disk),
            UrlType::Cloud => match resource.cloud_provider() {
                Some(CloudProvider::Web) => Some(Endpoint::Web),
                _ => Some(Endpoint::Cloud),
            },
            UrlType::Other if resource.is_local() => Some(Endpoint::Local),
            UrlType::Other => None,
        }
    }

    fn is_platform(self) -> bool {
        matches!(self, Endpoint::Storage | Endpoint::Disk)
    }

    fn is_cloud(self) -> bool {
        matches!(self, Endpoint::Cloud | Endpoint::Web)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::Local => "LOCAL_FS",
            Endpoint::Cloud => "CLOUD",
            Endpoint::Web => "WEB",
            Endpoint::Storage => "PLATFORM_STORAGE",
            Endpoint::Disk => "DISK",
        };
        f.write_str(name)
    }
}

/// Pairs no copier can serve
fn is_forbidden(source: Endpoint, destination: Endpoint) -> bool {
    (source.is_cloud() && destination.is_cloud())
        || (source.is_platform() && destination == Endpoint::Local)
        || (source == Endpoint::Local && destination.is_platform())
        || (source == Endpoint::Storage && destination == Endpoint::Storage)
        || (source == Endpoint::Disk && destination == Endpoint::Disk)
        || destination == Endpoint::Web
}

/// Options of one copy request
#[derive(Debug, Clone, Default)]
pub struct CopyRequest {
    pub compress: bool,
    pub extract: bool,
    pub volumes: Vec<String>,
    pub env: Vec<String>,
    pub preset: Option<String>,
    pub life_span: Option<Duration>,
}

/// A validated copy between two endpoints
#[derive(Debug)]
pub struct CopyOperation {
    source: Resource,
    destination: Resource,
    source_kind: Endpoint,
    destination_kind: Endpoint,
    request: CopyRequest,
}

/// Copier picked for a route
pub enum ResolvedCopier {
    Local(LocalCopier),
    Remote(RemoteCopier),
}

impl ResolvedCopier {
    pub fn name(&self) -> &'static str {
        match self {
            ResolvedCopier::Local(_) => "LocalCopier",
            ResolvedCopier::Remote(_) => "RemoteCopier",
        }
    }

    pub async fn run(self) -> Result<String> {
        match self {
            ResolvedCopier::Local(copier) => Ok(copier.perform_copy().await?),
            ResolvedCopier::Remote(copier) => Ok(copier.perform_copy().await?),
        }
    }
}

impl CopyOperation {
    pub fn new(source: &str, destination: &str, request: CopyRequest) -> Result<Self> {
        let source = Resource::new(source);
        let destination = Resource::new(destination);
        let source_kind = Endpoint::of(&source).ok_or_else(|| Error::UnsupportedUrl {
            role: "source",
            url: source.to_string(),
        })?;
        let destination_kind = Endpoint::of(&destination).ok_or_else(|| Error::UnsupportedUrl {
            role: "destination",
            url: destination.to_string(),
        })?;

        if is_forbidden(source_kind, destination_kind) {
            return Err(Error::Validation(format!(
                "Copy from {} to {} is unsupported",
                source_kind, destination_kind
            ))
            .into());
        }
        info!("Copy from {} to {} is supported", source_kind, destination_kind);

        Ok(Self {
            source,
            destination,
            source_kind,
            destination_kind,
            request,
        })
    }

    /// Pick the copier serving this route
    pub fn resolve(&self, config: &Config) -> Result<ResolvedCopier> {
        let conversion = Conversion::from_flags(self.request.compress, self.request.extract);
        let is_local_route = self.source_kind == Endpoint::Local || self.destination_kind == Endpoint::Local;

        if is_local_route {
            let copier = LocalCopier::new(
                self.source.clone(),
                self.destination.clone(),
                conversion,
                config.local.temp_root(),
                Archiver::new(config.archive.clone()),
            )?;
            return Ok(ResolvedCopier::Local(copier));
        }

        let options = JobOptions {
            compress: self.request.compress,
            extract: self.request.extract,
            volumes: self.request.volumes.clone(),
            env: self.request.env.clone(),
            preset: self.request.preset.clone(),
            life_span: self.request.life_span,
        };
        let poll = PollSettings {
            interval: config.remote.poll_interval()?,
            timeout: config.remote.timeout()?,
        };
        let scheduler = Arc::new(CommandScheduler::new(&config.remote.scheduler_command));
        let copier = RemoteCopier::new(
            self.source.url(),
            self.destination.url(),
            &options,
            &JobSettings::from_config(config),
            scheduler,
        )?
        .with_poll_settings(poll);
        Ok(ResolvedCopier::Remote(copier))
    }

    pub async fn run(&self, config: &Config) -> Result<String> {
        info!("Resolving copier...");
        let copier = self.resolve(config)?;
        info!("Using {}", copier.name());
        copier.run().await
    }
}
