//! In-memory job scheduler with scripted outcomes

use async_trait::async_trait;
use bytes::Bytes;
use ferry_remote::{
    JobHandle, JobScheduler, JobState, JobStatus, LogStream, RemoteError, RemoteJobConfig,
};
use futures_util::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Scheduler that records submissions and replays scripted statuses.
///
/// Statuses are returned in order; the last one repeats once the script is
/// exhausted. Log chunks are delivered on the first attach only.
pub struct ScriptedScheduler {
    statuses: Mutex<VecDeque<JobStatus>>,
    logs: Mutex<Vec<Bytes>>,
    submitted: Mutex<Vec<RemoteJobConfig>>,
    reject_submission: Option<String>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedScheduler {
    pub fn new(statuses: Vec<JobStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            logs: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            reject_submission: None,
        }
    }

    /// Job that runs once and exits with `exit_code`
    pub fn finishing_with(exit_code: i32) -> Self {
        let state = if exit_code == 0 {
            JobState::Succeeded
        } else {
            JobState::Failed
        };
        Self::new(vec![
            JobStatus::new(JobState::Running),
            JobStatus::new(state).with_exit_code(exit_code),
        ])
    }

    /// Job that never reaches a terminal state
    pub fn never_finishing() -> Self {
        Self::new(vec![JobStatus::new(JobState::Running)])
    }

    /// Scheduler refusing every submission with `message`
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            reject_submission: Some(message.into()),
            ..Self::new(Vec::new())
        }
    }

    pub fn with_logs(self, chunks: &[&str]) -> Self {
        *lock(&self.logs) = chunks.iter().map(|chunk| Bytes::from(chunk.to_string())).collect();
        self
    }

    /// Configs submitted so far
    pub fn submitted(&self) -> Vec<RemoteJobConfig> {
        lock(&self.submitted).clone()
    }
}

#[async_trait]
impl JobScheduler for ScriptedScheduler {
    async fn submit(&self, config: &RemoteJobConfig) -> ferry_remote::Result<JobHandle> {
        if let Some(message) = &self.reject_submission {
            return Err(RemoteError::Scheduler(message.clone()));
        }
        let mut submitted = lock(&self.submitted);
        submitted.push(config.clone());
        Ok(JobHandle {
            id: format!("job-{}", submitted.len()),
        })
    }

    async fn status(&self, _job: &JobHandle) -> ferry_remote::Result<JobStatus> {
        let mut statuses = lock(&self.statuses);
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        status.ok_or_else(|| RemoteError::Scheduler("No scripted status left".to_string()))
    }

    async fn logs(&self, _job: &JobHandle) -> ferry_remote::Result<LogStream> {
        let chunks = std::mem::take(&mut *lock(&self.logs));
        Ok(stream::iter(chunks.into_iter().map(Ok)).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_last_status_repeats() {
        let scheduler = ScriptedScheduler::finishing_with(4);
        let job = JobHandle { id: "job-1".to_string() };
        assert_eq!(scheduler.status(&job).await.unwrap().state, JobState::Running);
        for _ in 0..2 {
            let status = scheduler.status(&job).await.unwrap();
            assert_eq!(status.state, JobState::Failed);
            assert_eq!(status.exit_code, Some(4));
        }
    }

    #[tokio::test]
    async fn test_logs_delivered_once() {
        let scheduler = ScriptedScheduler::never_finishing().with_logs(&["a", "b"]);
        let job = JobHandle { id: "job-1".to_string() };
        let first: Vec<_> = scheduler.logs(&job).await.unwrap().collect().await;
        assert_eq!(first.len(), 2);
        let second: Vec<_> = scheduler.logs(&job).await.unwrap().collect().await;
        assert!(second.is_empty());
    }
}
