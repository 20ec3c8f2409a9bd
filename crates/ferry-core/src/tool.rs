//! Running external command-line tools

use crate::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Output of a successful tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` with `args` and wait for it to exit.
///
/// A non-zero exit status fails with [`Error::ExternalTool`] carrying the
/// captured stderr. The child is killed if the returned future is dropped.
pub async fn run_tool(program: &str, args: &[String]) -> Result<ToolOutput> {
    run_tool_in(program, args, None).await
}

/// Same as [`run_tool`], with the child's working directory set to `cwd`
pub async fn run_tool_in(program: &str, args: &[String], cwd: Option<&Path>) -> Result<ToolOutput> {
    info!("Executing: {} {}", program, args.join(" "));

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command.output().await.map_err(|e| Error::ExternalTool {
        tool: program.to_string(),
        args: args.to_vec(),
        status: "spawn failure".to_string(),
        stderr: e.to_string(),
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !stdout.is_empty() {
        debug!("{} stdout: {}", program, stdout.trim_end());
    }

    if !output.status.success() {
        return Err(Error::ExternalTool {
            tool: program.to_string(),
            args: args.to_vec(),
            status: output.status.to_string(),
            stderr: stderr.trim_end().to_string(),
        });
    }

    Ok(ToolOutput { stdout, stderr })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_tool_captures_stdout() {
        let output = run_tool("echo", &["hello".to_string()]).await.unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_failing_tool_reports_stderr() {
        let args = vec!["-c".to_string(), "echo broken >&2; exit 3".to_string()];
        let err = run_tool("sh", &args).await.unwrap_err();
        match err {
            Error::ExternalTool { tool, stderr, .. } => {
                assert_eq!(tool, "sh");
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_tool_is_external_tool_error() {
        let err = run_tool("ferry-no-such-tool", &[]).await.unwrap_err();
        assert!(matches!(err, Error::ExternalTool { .. }));
    }
}
