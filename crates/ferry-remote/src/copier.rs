//! Copies between platform storage and cloud storage through a remote job

use crate::error::EXIT_PLATFORM_ERROR;
use crate::job::{JobOptions, JobSettings, RemoteJobConfig};
use crate::scheduler::{JobHandle, JobScheduler, JobState, JobStatus};
use crate::{RemoteError, Result};
use ferry_core::UrlType;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

/// Polling behavior while following a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Stop following after this long; the job itself keeps running
    pub timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: None,
        }
    }
}

/// Copier that runs the copy as a job next to platform storage.
///
/// Platform storage and cloud storage can't see each other from the local
/// machine, so the job mounts the platform side as volumes and reaches the
/// cloud side directly.
pub struct RemoteCopier {
    source: String,
    destination: String,
    job_config: RemoteJobConfig,
    scheduler: Arc<dyn JobScheduler>,
    poll: PollSettings,
}

impl std::fmt::Debug for RemoteCopier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCopier")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("job_config", &self.job_config)
            .field("poll", &self.poll)
            .finish()
    }
}

/// Fail unless the pair is platform storage to cloud or back
pub fn ensure_remote_route(source: &str, destination: &str) -> Result<()> {
    let source_type = UrlType::classify(source);
    let destination_type = UrlType::classify(destination);
    match (source_type, destination_type) {
        (UrlType::PlatformStorage, UrlType::Cloud) | (UrlType::Cloud, UrlType::PlatformStorage) => Ok(()),
        _ => Err(RemoteError::UnsupportedRoute {
            source_type,
            destination_type,
        }),
    }
}

impl RemoteCopier {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        options: &JobOptions,
        settings: &JobSettings,
        scheduler: Arc<dyn JobScheduler>,
    ) -> Result<Self> {
        let source = source.into();
        let destination = destination.into();
        ensure_remote_route(&source, &destination)?;
        let job_config = RemoteJobConfig::build(&source, &destination, options, settings)?;
        Ok(Self {
            source,
            destination,
            job_config,
            scheduler,
            poll: PollSettings::default(),
        })
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn job_config(&self) -> &RemoteJobConfig {
        &self.job_config
    }

    /// Run the copy job, forwarding its output to stdout
    pub async fn perform_copy(self) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        self.perform_copy_to(&mut stdout).await
    }

    /// Run the copy job, forwarding its output to `output`, and return the
    /// destination url once the job succeeded
    pub async fn perform_copy_to<W>(self, output: &mut W) -> Result<String>
    where
        W: AsyncWrite + Unpin + Send,
    {
        info!("Starting job from config: {:?}", self.job_config);
        let job = self.scheduler.submit(&self.job_config).await?;
        info!("Started job {}", job);

        let status = match self.poll.timeout {
            Some(after) => tokio::time::timeout(after, self.follow(&job, output))
                .await
                .map_err(|_| RemoteError::Timeout {
                    job_id: job.id.clone(),
                    after,
                })??,
            None => self.follow(&job, output).await?,
        };

        match exit_code_of(&status) {
            0 => {
                info!("Copy job finished");
                Ok(self.destination)
            }
            exit_code => Err(RemoteError::RemoteJobFailed {
                exit_code,
                reason: status.reason,
                description: status.description,
            }),
        }
    }

    /// Forward output and poll status until the job is terminal
    async fn follow<W>(&self, job: &JobHandle, output: &mut W) -> Result<JobStatus>
    where
        W: AsyncWrite + Unpin + Send,
    {
        loop {
            match self.scheduler.logs(job).await {
                Ok(mut stream) => {
                    while let Some(chunk) = stream.next().await {
                        match chunk {
                            Ok(bytes) => {
                                output.write_all(&bytes).await.map_err(ferry_core::Error::from)?;
                            }
                            Err(e) => {
                                warn!("Output of job {} interrupted: {}", job, e);
                                break;
                            }
                        }
                    }
                    output.flush().await.map_err(ferry_core::Error::from)?;
                }
                Err(e) => warn!("Can't attach to output of job {}: {}", job, e),
            }

            let status = self.scheduler.status(job).await?;
            if status.state.is_terminal() {
                return Ok(status);
            }
            tokio::time::sleep(self.poll.interval).await;
        }
    }
}

/// Exit status of a terminal job; failures without a usable code count as
/// platform errors
fn exit_code_of(status: &JobStatus) -> i32 {
    match (status.state, status.exit_code) {
        (JobState::Succeeded, None) => 0,
        (JobState::Succeeded, Some(code)) => code,
        (_, Some(code)) if code != 0 => code,
        _ => EXIT_PLATFORM_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copier(source: &str, destination: &str) -> Result<RemoteCopier> {
        struct Unreachable;

        #[async_trait::async_trait]
        impl JobScheduler for Unreachable {
            async fn submit(&self, _: &RemoteJobConfig) -> Result<JobHandle> {
                Err(RemoteError::Scheduler("unreachable".to_string()))
            }
            async fn status(&self, _: &JobHandle) -> Result<JobStatus> {
                Err(RemoteError::Scheduler("unreachable".to_string()))
            }
            async fn logs(&self, _: &JobHandle) -> Result<crate::scheduler::LogStream> {
                Err(RemoteError::Scheduler("unreachable".to_string()))
            }
        }

        RemoteCopier::new(
            source,
            destination,
            &JobOptions::default(),
            &JobSettings::default(),
            Arc::new(Unreachable),
        )
    }

    #[test]
    fn test_route_validation() {
        assert!(copier("storage:proj/a.csv", "gs://bucket/a.csv").is_ok());
        assert!(copier("s3://bucket/a.csv", "storage:proj/").is_ok());

        for (source, destination) in [
            ("disk:disk-1/a", "disk:disk-2/b"),
            ("storage:a/b", "storage:c/d"),
            ("storage:a/b", "disk:disk-1"),
            ("/tmp/a", "gs://bucket/a"),
            ("gs://bucket/a", "s3://bucket/a"),
        ] {
            let err = copier(source, destination).unwrap_err();
            assert!(
                matches!(err, RemoteError::UnsupportedRoute { .. }),
                "{} -> {} gave {}",
                source,
                destination,
                err
            );
        }
    }

    #[test]
    fn test_route_error_message() {
        let err = copier("disk:a", "disk:b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Can only copy between PLATFORM_STORAGE and CLOUD, got DISK to DISK"
        );
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_code_of(&JobStatus::new(JobState::Succeeded)), 0);
        assert_eq!(
            exit_code_of(&JobStatus::new(JobState::Failed).with_exit_code(3)),
            3
        );
        assert_eq!(exit_code_of(&JobStatus::new(JobState::Failed)), EXIT_PLATFORM_ERROR);
        assert_eq!(
            exit_code_of(&JobStatus::new(JobState::Cancelled).with_exit_code(0)),
            EXIT_PLATFORM_ERROR
        );
    }

    #[tokio::test]
    async fn test_submission_failure_propagates() {
        let copier = copier("storage:proj/a.csv", "gs://bucket/a.csv").unwrap();
        let err = copier.perform_copy_to(&mut tokio::io::sink()).await.unwrap_err();
        assert!(matches!(err, RemoteError::Scheduler(_)));
    }
}
