//! Transfer endpoints and their classification

use crate::archive::ArchiveType;
use percent_encoding::percent_decode_str;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Kind of location a url points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlType {
    /// Platform-managed object storage (`storage:`)
    PlatformStorage,
    /// Platform block disk (`disk:`)
    Disk,
    /// Third-party cloud object store or web origin
    Cloud,
    /// Local filesystem path or an unrecognized scheme
    Other,
}

/// Provider behind a [`UrlType::Cloud`] url
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudProvider {
    S3,
    Gcs,
    Azure,
    Web,
}

/// Scheme table for url classification
const SCHEMES: &[(&str, UrlType)] = &[
    ("storage", UrlType::PlatformStorage),
    ("disk", UrlType::Disk),
    ("s3", UrlType::Cloud),
    ("gs", UrlType::Cloud),
    ("azure+https", UrlType::Cloud),
    ("http", UrlType::Cloud),
    ("https", UrlType::Cloud),
];

impl UrlType {
    /// Classify a url by its scheme prefix, defaulting to [`UrlType::Other`]
    pub fn classify(url: &str) -> Self {
        match scheme_of(url) {
            Some(scheme) => SCHEMES
                .iter()
                .find(|(name, _)| *name == scheme)
                .map(|(_, url_type)| *url_type)
                .unwrap_or(UrlType::Other),
            None => UrlType::Other,
        }
    }

    /// Upper-case name used in user-facing messages
    pub fn name(&self) -> &'static str {
        match self {
            UrlType::PlatformStorage => "PLATFORM_STORAGE",
            UrlType::Disk => "DISK",
            UrlType::Cloud => "CLOUD",
            UrlType::Other => "OTHER",
        }
    }
}

impl fmt::Display for UrlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl CloudProvider {
    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "s3" => Some(CloudProvider::S3),
            "gs" => Some(CloudProvider::Gcs),
            "azure+https" => Some(CloudProvider::Azure),
            "http" | "https" => Some(CloudProvider::Web),
            _ => None,
        }
    }
}

/// Lower-cased scheme of `url`, or `None` for plain filesystem paths.
///
/// Single-letter schemes are Windows drive letters, not urls.
fn scheme_of(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme().len() > 1 => Some(parsed.scheme().to_string()),
        _ => None,
    }
}

/// Name part of the url if it points to a file, `None` for directories and prefixes
pub fn filename_from_url(url: &str) -> Option<String> {
    let last = match scheme_of(url) {
        None => {
            if url.ends_with('/') || url.ends_with(std::path::MAIN_SEPARATOR) {
                return None;
            }
            Path::new(url)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())?
        }
        Some(_) => {
            let parsed = Url::parse(url).ok()?;
            let segment = parsed.path().rsplit('/').next()?;
            percent_decode_str(segment).decode_utf8_lossy().into_owned()
        }
    };
    if last.is_empty() {
        None
    } else {
        Some(last)
    }
}

/// Url of the prefix containing the object `url` points to
pub fn strip_filename(url: &str) -> String {
    match url.rfind('/') {
        Some(idx) => url[..idx].to_string(),
        None => match url.find(':') {
            Some(idx) => url[..=idx].to_string(),
            None => String::new(),
        },
    }
}

/// One side of a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    url: String,
    url_type: UrlType,
    filename: Option<String>,
    archive_type: ArchiveType,
}

impl Resource {
    /// Create a resource and derive its classification from `url`
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let url_type = UrlType::classify(&url);
        let filename = filename_from_url(&url);
        let archive_type = filename
            .as_deref()
            .map(ArchiveType::classify)
            .unwrap_or(ArchiveType::Unsupported);
        Self {
            url,
            url_type,
            filename,
            archive_type,
        }
    }

    /// Create a resource for a local filesystem path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::new(path.as_ref().to_string_lossy().into_owned())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn url_type(&self) -> UrlType {
        self.url_type
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn archive_type(&self) -> ArchiveType {
        self.archive_type
    }

    /// Whether the url is a plain filesystem path
    pub fn is_local(&self) -> bool {
        scheme_of(&self.url).is_none()
    }

    /// Provider for cloud urls
    pub fn cloud_provider(&self) -> Option<CloudProvider> {
        scheme_of(&self.url).and_then(|scheme| CloudProvider::from_scheme(&scheme))
    }

    /// Local filesystem view of the resource
    pub fn as_path(&self) -> PathBuf {
        PathBuf::from(&self.url)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_schemes() {
        assert_eq!(UrlType::classify("storage:proj/data"), UrlType::PlatformStorage);
        assert_eq!(UrlType::classify("storage://cluster/user/data"), UrlType::PlatformStorage);
        assert_eq!(UrlType::classify("disk:disk-123/path"), UrlType::Disk);
        assert_eq!(UrlType::classify("s3://bucket/key"), UrlType::Cloud);
        assert_eq!(UrlType::classify("gs://bucket/key"), UrlType::Cloud);
        assert_eq!(UrlType::classify("azure+https://acc.blob/c/k"), UrlType::Cloud);
        assert_eq!(UrlType::classify("https://example.com/f.zip"), UrlType::Cloud);
        assert_eq!(UrlType::classify("/tmp/data"), UrlType::Other);
        assert_eq!(UrlType::classify("relative/dir/"), UrlType::Other);
        assert_eq!(UrlType::classify("ftp://host/file"), UrlType::Other);
        assert_eq!(UrlType::classify(""), UrlType::Other);
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(filename_from_url("/tmp/data/file.csv").as_deref(), Some("file.csv"));
        assert_eq!(filename_from_url("/tmp/data/"), None);
        assert_eq!(filename_from_url("storage:proj/data/file.csv").as_deref(), Some("file.csv"));
        assert_eq!(filename_from_url("storage:proj/data/"), None);
        assert_eq!(filename_from_url("gs://bucket/out/file.tar").as_deref(), Some("file.tar"));
        assert_eq!(filename_from_url("gs://bucket"), None);
        assert_eq!(filename_from_url("s3://bucket/prefix/"), None);
    }

    #[test]
    fn test_filename_with_spaces_is_decoded() {
        assert_eq!(
            filename_from_url("storage://cluster/my data/file 1.csv").as_deref(),
            Some("file 1.csv")
        );
        assert_eq!(
            filename_from_url("storage:proj/my data/file 1.csv").as_deref(),
            Some("file 1.csv")
        );
        assert_eq!(
            filename_from_url("gs://bucket/my%20file.tar.gz").as_deref(),
            Some("my file.tar.gz")
        );
        assert_eq!(
            Resource::new("gs://bucket/my file.tar.gz").archive_type(),
            ArchiveType::TarGz
        );
    }

    #[test]
    fn test_strip_filename() {
        assert_eq!(strip_filename("storage:proj/data/file.csv"), "storage:proj/data");
        assert_eq!(strip_filename("storage:file.csv"), "storage:");
    }

    #[test]
    fn test_resource_derivation() {
        let resource = Resource::new("gs://bucket/out/file.tar.gz");
        assert_eq!(resource.url_type(), UrlType::Cloud);
        assert_eq!(resource.cloud_provider(), Some(CloudProvider::Gcs));
        assert_eq!(resource.filename(), Some("file.tar.gz"));
        assert_eq!(resource.archive_type(), ArchiveType::TarGz);
        assert!(!resource.is_local());

        let local = Resource::new("/data/dir/");
        assert!(local.is_local());
        assert_eq!(local.filename(), None);
        assert_eq!(local.archive_type(), ArchiveType::Unsupported);
        assert_eq!(local.cloud_provider(), None);
    }
}
