//! Ferry - moving data between local paths, platform storage and cloud buckets
//!
//! This library provides the pieces that run on the local machine: endpoint
//! classification, archive format detection, tool-backed compression and
//! extraction, and the copiers for same-machine reachable routes.

pub mod archive;
pub mod config;
pub mod error;
pub mod resource;
pub mod tool;
pub mod transfer;
pub mod utils;

pub use error::{Error, Result};

// Re-export commonly used types
pub use archive::{compress, extract, ArchiveFamily, ArchiveManager, ArchiveType, Archiver};
pub use resource::{CloudProvider, Resource, UrlType};
