//! Archive formats recognized from file extensions

use std::fmt;

/// Archive format derived from a file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveType {
    TarPlain,
    TarGz,
    TarBz,
    Gz,
    Zip,
    /// No known extension, or a directory
    Unsupported,
}

/// Group of archive types handled by one external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFamily {
    Tar,
    Gz,
    Zip,
}

/// Extension table, longest suffix first so `.tar.gz` wins over `.gz`
const EXTENSIONS: &[(&str, ArchiveType)] = &[
    (".tar.bz2", ArchiveType::TarBz),
    (".tar.gz", ArchiveType::TarGz),
    (".tbz2", ArchiveType::TarBz),
    (".tar", ArchiveType::TarPlain),
    (".tgz", ArchiveType::TarGz),
    (".tbz", ArchiveType::TarBz),
    (".zip", ArchiveType::Zip),
    (".gz", ArchiveType::Gz),
];

impl ArchiveType {
    /// Classify a file name (or a url ending in one) by its extension
    pub fn classify(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        EXTENSIONS
            .iter()
            .find(|(ext, _)| name.len() > ext.len() && name.ends_with(ext))
            .map(|(_, archive_type)| *archive_type)
            .unwrap_or(ArchiveType::Unsupported)
    }

    /// Family this type belongs to, if any
    pub fn family(&self) -> Option<ArchiveFamily> {
        match self {
            ArchiveType::TarPlain | ArchiveType::TarGz | ArchiveType::TarBz => {
                Some(ArchiveFamily::Tar)
            }
            ArchiveType::Gz => Some(ArchiveFamily::Gz),
            ArchiveType::Zip => Some(ArchiveFamily::Zip),
            ArchiveType::Unsupported => None,
        }
    }

    /// Recognized suffixes for this type
    pub fn extensions(&self) -> Vec<&'static str> {
        EXTENSIONS
            .iter()
            .filter(|(_, archive_type)| archive_type == self)
            .map(|(ext, _)| *ext)
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArchiveType::TarPlain => "TAR_PLAIN",
            ArchiveType::TarGz => "TAR_GZ",
            ArchiveType::TarBz => "TAR_BZ",
            ArchiveType::Gz => "GZ",
            ArchiveType::Zip => "ZIP",
            ArchiveType::Unsupported => "UNSUPPORTED",
        }
    }
}

impl fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ArchiveFamily {
    /// Recognized suffixes for every type in the family
    pub fn extensions(&self) -> Vec<&'static str> {
        EXTENSIONS
            .iter()
            .filter(|(_, archive_type)| is_member(*archive_type, *self))
            .map(|(ext, _)| *ext)
            .collect()
    }
}

/// Whether `archive_type` belongs to `family`
pub fn is_member(archive_type: ArchiveType, family: ArchiveFamily) -> bool {
    archive_type.family() == Some(family)
}

/// Negation of [`is_member`], used to reject types a manager can't handle
pub fn is_not_member(archive_type: ArchiveType, family: ArchiveFamily) -> bool {
    !is_member(archive_type, family)
}

/// Every recognized suffix
pub fn all_extensions() -> Vec<&'static str> {
    EXTENSIONS.iter().map(|(ext, _)| *ext).collect()
}
