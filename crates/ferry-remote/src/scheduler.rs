//! Boundary to the external job scheduler

use crate::job::RemoteJobConfig;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a submitted job
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    pub id: String,
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Job lifecycle as reported by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }
}

/// Snapshot of a job's status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub state: JobState,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub exit_code: Option<i32>,
}

impl JobStatus {
    pub fn new(state: JobState) -> Self {
        Self {
            state,
            reason: None,
            description: None,
            exit_code: None,
        }
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Chunks of a job's output
pub type LogStream = BoxStream<'static, Result<Bytes>>;

/// Accepts job configs and exposes status and output of the started jobs
#[async_trait]
pub trait JobScheduler: Send + Sync {
    async fn submit(&self, config: &RemoteJobConfig) -> Result<JobHandle>;

    async fn status(&self, job: &JobHandle) -> Result<JobStatus>;

    /// Attach to the job's output. The stream ends when the job stops
    /// producing output, which may happen before it is terminal.
    async fn logs(&self, job: &JobHandle) -> Result<LogStream>;
}
