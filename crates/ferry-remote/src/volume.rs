//! Mapping platform urls into job volumes
//!
//! A remote copy job sees platform storage and disks only through volume
//! mounts. The mapper rewrites such urls into paths inside the job container
//! and produces the mount specifications (`<locator>:<mountPoint>:<mode>`)
//! the scheduler needs to make them visible there. Cloud and other urls are
//! reachable from inside the job directly and pass through unchanged.

use crate::Result;
use ferry_core::config::MountConfig;
use ferry_core::resource::{filename_from_url, strip_filename};
use ferry_core::{Error, UrlType};
use std::fmt;
use tracing::debug;

/// Mode used for mounts derived from transfer endpoints
pub const DEFAULT_MOUNT_MODE: &str = "rw";

/// Mount points for one side of a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPrefixes {
    pub storage: String,
    pub disk: String,
}

/// Mount points for both sides; they must not overlap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountLayout {
    pub source: MountPrefixes,
    pub destination: MountPrefixes,
}

impl Default for MountLayout {
    fn default() -> Self {
        Self::from(&MountConfig::default())
    }
}

impl From<&MountConfig> for MountLayout {
    fn from(config: &MountConfig) -> Self {
        Self {
            source: MountPrefixes {
                storage: config.source_storage.clone(),
                disk: config.source_disk.clone(),
            },
            destination: MountPrefixes {
                storage: config.destination_storage.clone(),
                disk: config.destination_disk.clone(),
            },
        }
    }
}

/// Result of mapping one url into the job's mount namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMapping {
    /// Path to use in place of the url inside the job
    pub rewritten_path: String,
    /// Mount specifications needed to make the path visible
    pub mount_specs: Vec<String>,
}

/// Both endpoints of a transfer mapped into one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedEndpoints {
    pub source: String,
    pub destination: String,
    /// Source mounts first, then destination mounts
    pub mount_specs: Vec<String>,
}

/// Parsed `disk:<diskId>[/<pathOnDisk>][:<mode>]` url
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskUrl {
    pub scheme: String,
    pub disk_id: String,
    pub path_on_disk: Option<String>,
    pub mode: String,
}

impl DiskUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = |why: &str| Error::Validation(format!("Invalid disk url {}: {}", url, why));

        let (scheme, rest) = url.split_once(':').ok_or_else(|| invalid("missing scheme"))?;
        if scheme != "disk" {
            return Err(invalid("scheme must be disk").into());
        }

        let (rest, mode) = match rest.rsplit_once(':') {
            Some((head, mode)) if mode == "ro" || mode == "rw" => (head, mode),
            Some((_, mode)) => return Err(invalid(&format!("unknown mode '{}'", mode)).into()),
            None => (rest, DEFAULT_MOUNT_MODE),
        };

        let rest = rest.trim_start_matches("//");
        let (disk_id, path_on_disk) = match rest.find('/') {
            Some(idx) => (&rest[..idx], Some(&rest[idx..])),
            None => (rest, None),
        };
        if disk_id.is_empty() {
            return Err(invalid("missing disk id").into());
        }
        let path_on_disk = path_on_disk
            .filter(|path| *path != "/")
            .map(|path| path.trim_end_matches('/').to_string());

        Ok(Self {
            scheme: scheme.to_string(),
            disk_id: disk_id.to_string(),
            path_on_disk,
            mode: mode.to_string(),
        })
    }

    /// Locator of the disk volume, `scheme:diskId`
    pub fn locator(&self) -> String {
        format!("{}:{}", self.scheme, self.disk_id)
    }
}

/// Map a single url into a path inside the job plus the mounts it needs.
///
/// Platform storage files are mounted as-is when `mount_files` is set.
/// Otherwise the parent prefix is mounted, since an object that does not
/// exist yet can't be mounted but the directory that will hold it can.
pub fn map_endpoint(url: &str, prefixes: &MountPrefixes, mount_files: bool) -> Result<VolumeMapping> {
    let mapping = match UrlType::classify(url) {
        UrlType::PlatformStorage => {
            let root = &prefixes.storage;
            match filename_from_url(url) {
                Some(filename) => {
                    let (locator, mount_point) = if mount_files {
                        (url.to_string(), format!("{}/{}", root, filename))
                    } else {
                        (strip_filename(url), format!("{}/", root))
                    };
                    VolumeMapping {
                        rewritten_path: format!("{}/{}", root, filename),
                        mount_specs: vec![mount_spec(&locator, &mount_point, DEFAULT_MOUNT_MODE)],
                    }
                }
                None => {
                    let mount_point = format!("{}/", root);
                    VolumeMapping {
                        mount_specs: vec![mount_spec(url, &mount_point, DEFAULT_MOUNT_MODE)],
                        rewritten_path: mount_point,
                    }
                }
            }
        }
        UrlType::Disk => {
            let disk = DiskUrl::parse(url)?;
            debug!("Parsed disk url {} into {:?}", url, disk);
            let mount_point = format!("{}/", prefixes.disk);
            let rewritten_path = match &disk.path_on_disk {
                Some(path) => format!("{}{}", prefixes.disk, path),
                None => mount_point.clone(),
            };
            VolumeMapping {
                rewritten_path,
                mount_specs: vec![mount_spec(&disk.locator(), &mount_point, &disk.mode)],
            }
        }
        UrlType::Cloud | UrlType::Other => VolumeMapping {
            rewritten_path: url.to_string(),
            mount_specs: Vec::new(),
        },
    };
    Ok(mapping)
}

/// Map source and destination of a transfer into one job
pub fn map_into_volumes(source: &str, destination: &str, layout: &MountLayout) -> Result<MappedEndpoints> {
    let source_mapping = map_endpoint(source, &layout.source, true)?;
    let destination_mapping = map_endpoint(destination, &layout.destination, false)?;

    let mut mount_specs = source_mapping.mount_specs;
    mount_specs.extend(destination_mapping.mount_specs);
    Ok(MappedEndpoints {
        source: source_mapping.rewritten_path,
        destination: destination_mapping.rewritten_path,
        mount_specs,
    })
}

fn mount_spec(locator: &str, mount_point: &str, mode: &str) -> String {
    format!("{}:{}:{}", locator, mount_point, mode)
}

/// Volume or disk mount of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub locator: String,
    pub mount_point: String,
    pub read_only: bool,
}

impl fmt::Display for VolumeMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.read_only { "ro" } else { "rw" };
        write!(f, "{}:{}:{}", self.locator, self.mount_point, mode)
    }
}

/// Secret exposed to a job as a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFile {
    /// `secret:<name>`
    pub locator: String,
    pub path: String,
}

impl fmt::Display for SecretFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.locator, self.path)
    }
}

/// Volume declarations sorted by the kind of mount they describe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedVolumes {
    pub volumes: Vec<VolumeMount>,
    pub disk_volumes: Vec<VolumeMount>,
    pub secret_files: Vec<SecretFile>,
}

/// Parse `<locator>:<mountPoint>[:<mode>]` declarations, keeping their order
pub fn parse_volumes<S: AsRef<str>>(declarations: &[S]) -> Result<ParsedVolumes> {
    let mut parsed = ParsedVolumes::default();
    for declaration in declarations {
        let declaration = declaration.as_ref();
        let invalid =
            |why: &str| Error::Validation(format!("Invalid volume '{}': {}", declaration, why));

        let mut parts: Vec<&str> = declaration.split(':').collect();
        if parts.len() < 3 {
            return Err(invalid("expected <locator>:<mount point>[:<mode>]").into());
        }

        if parts[0] == "secret" {
            if parts.len() != 3 || !parts[2].starts_with('/') {
                return Err(invalid("expected secret:<name>:<absolute path>").into());
            }
            parsed.secret_files.push(SecretFile {
                locator: format!("secret:{}", parts[1]),
                path: parts[2].to_string(),
            });
            continue;
        }

        let read_only = match parts.last().copied() {
            Some("ro") => {
                parts.pop();
                true
            }
            Some("rw") => {
                parts.pop();
                false
            }
            _ => false,
        };
        let mount_point = parts.pop().unwrap_or_default();
        if parts.len() < 2 || !mount_point.starts_with('/') {
            return Err(invalid("mount point must be an absolute path").into());
        }
        let mount = VolumeMount {
            locator: parts.join(":"),
            mount_point: mount_point.to_string(),
            read_only,
        };

        match parts[0] {
            "storage" => parsed.volumes.push(mount),
            "disk" => parsed.disk_volumes.push(mount),
            other => return Err(invalid(&format!("unsupported volume scheme '{}'", other)).into()),
        }
    }
    Ok(parsed)
}
