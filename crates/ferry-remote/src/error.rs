use ferry_core::UrlType;
use std::time::Duration;
use thiserror::Error;

/// Exit status reported when the scheduler gives no exit code for a failed job
pub const EXIT_PLATFORM_ERROR: i32 = 100;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error(transparent)]
    Core(#[from] ferry_core::Error),

    #[error(
        "Can only copy between {} and {}, got {source_type} to {destination_type}",
        UrlType::PlatformStorage,
        UrlType::Cloud
    )]
    UnsupportedRoute {
        source_type: UrlType,
        destination_type: UrlType,
    },

    #[error("Copy job failed: error code {exit_code}{}", reason_suffix(.reason))]
    RemoteJobFailed {
        exit_code: i32,
        reason: Option<String>,
        description: Option<String>,
    },

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Job {job_id} did not finish within {after:?}; it keeps running remotely")]
    Timeout { job_id: String, after: Duration },
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|reason| format!(" ({})", reason))
        .unwrap_or_default()
}

impl RemoteError {
    /// Exit status of the remote worker, for errors that carry one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RemoteError::RemoteJobFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RemoteError>;
