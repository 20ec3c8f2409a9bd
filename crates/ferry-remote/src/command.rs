//! Job scheduler backed by the platform's command-line client

use crate::job::RemoteJobConfig;
use crate::scheduler::{JobHandle, JobScheduler, JobState, JobStatus, LogStream};
use crate::{RemoteError, Result};
use async_trait::async_trait;
use ferry_core::tool::run_tool;
use futures_util::StreamExt;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Shells out to `<program> run|status|logs`
#[derive(Debug, Clone)]
pub struct CommandScheduler {
    program: String,
}

#[derive(Debug, Deserialize)]
struct StatusReport {
    status: JobState,
    #[serde(default)]
    history: HistoryReport,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryReport {
    reason: Option<String>,
    description: Option<String>,
    #[serde(alias = "exitCode")]
    exit_code: Option<i32>,
}

impl CommandScheduler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments of the submission command for `config`
    pub fn submit_args(config: &RemoteJobConfig) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--detach".to_string(),
            "--preset".to_string(),
            config.preset_name.clone(),
        ];
        for volume in config.volumes.iter().chain(&config.disk_volumes) {
            args.push("--volume".to_string());
            args.push(volume.to_string());
        }
        for secret in &config.secret_files {
            args.push("--volume".to_string());
            args.push(secret.to_string());
        }
        for (name, value) in config.env.iter().chain(&config.secret_env) {
            args.push("--env".to_string());
            args.push(format!("{}={}", name, value));
        }
        if let Some(life_span) = config.life_span {
            args.push("--life-span".to_string());
            args.push(format!("{}s", life_span.as_secs()));
        }
        if config.pass_config {
            args.push("--pass-config".to_string());
        }
        args.push(config.image.clone());
        args.push(config.command.clone());
        args
    }
}

/// Parse the JSON printed by `<program> status <id> --output json`
pub fn parse_status_report(raw: &str) -> Result<JobStatus> {
    let report: StatusReport = serde_json::from_str(raw)
        .map_err(|e| RemoteError::Scheduler(format!("Unreadable job status: {}", e)))?;
    Ok(JobStatus {
        state: report.status,
        reason: report.history.reason,
        description: report.history.description,
        exit_code: report.history.exit_code,
    })
}

#[async_trait]
impl JobScheduler for CommandScheduler {
    async fn submit(&self, config: &RemoteJobConfig) -> Result<JobHandle> {
        let output = run_tool(&self.program, &Self::submit_args(config)).await?;
        let id = output
            .stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| RemoteError::Scheduler(format!("{} run printed no job id", self.program)))?;
        Ok(JobHandle { id: id.to_string() })
    }

    async fn status(&self, job: &JobHandle) -> Result<JobStatus> {
        let args = vec![
            "status".to_string(),
            job.id.clone(),
            "--output".to_string(),
            "json".to_string(),
        ];
        let output = run_tool(&self.program, &args).await?;
        parse_status_report(&output.stdout)
    }

    async fn logs(&self, job: &JobHandle) -> Result<LogStream> {
        debug!("Attaching to output of job {}", job);
        let mut child = Command::new(&self.program)
            .args(["logs", job.id.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RemoteError::Scheduler(format!("Failed to run {} logs: {}", self.program, e)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RemoteError::Scheduler("Job output is not piped".to_string()))?;

        let stream = ReaderStream::new(stdout).map(move |chunk| {
            // the follower lives as long as its output is consumed
            let _follower = &child;
            chunk.map_err(|e| RemoteError::Core(e.into()))
        });
        Ok(stream.boxed())
    }
}
