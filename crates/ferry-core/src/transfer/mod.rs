//! Copiers for routes the local machine can serve on its own
//!
//! - [`provider::ProviderCopier`]: one plain copy between a local path and a
//!   cloud location using the provider's command-line tool
//! - [`local::LocalCopier`]: local/local, local/cloud and cloud/local copies
//!   with optional compression or extraction through a scoped temp directory

pub mod local;
pub mod provider;

pub use local::LocalCopier;
pub use provider::ProviderCopier;

use crate::Result;
use async_trait::async_trait;

/// Something that moves data from a source to a destination
#[async_trait]
pub trait Copier: Send + Sync {
    /// Perform the copy and return the url of the copied resource
    async fn perform_copy(&self) -> Result<String>;
}

/// Format conversion requested for a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    None,
    Compress,
    Extract,
}

impl Conversion {
    /// Extraction takes precedence when both flags are set
    pub fn from_flags(compress: bool, extract: bool) -> Self {
        if extract {
            Conversion::Extract
        } else if compress {
            Conversion::Compress
        } else {
            Conversion::None
        }
    }
}
