//! Plain copies between a local path and a cloud location

use super::Copier;
use crate::tool::run_tool;
use crate::utils::copy_path;
use crate::{CloudProvider, Error, Resource, Result};
use async_trait::async_trait;
use tracing::{info, warn};
use url::Url;

/// Environment variable holding the SAS token for Azure transfers
pub const AZURE_SAS_TOKEN_ENV: &str = "AZURE_SAS_TOKEN";

/// Copier backed by the command-line tool of the cloud side, or a plain
/// filesystem copy when both sides are local
#[derive(Debug, Clone)]
pub struct ProviderCopier {
    source: Resource,
    destination: Resource,
    provider: Option<CloudProvider>,
}

impl ProviderCopier {
    pub fn new(source: Resource, destination: Resource) -> Result<Self> {
        let provider = match (source.cloud_provider(), destination.cloud_provider()) {
            (Some(provider), None) if destination.is_local() => Some(provider),
            (None, Some(CloudProvider::Web)) => {
                return Err(Error::Validation(format!(
                    "Can't upload to web destination {}",
                    destination
                )))
            }
            (None, Some(provider)) if source.is_local() => Some(provider),
            (None, None) if source.is_local() && destination.is_local() => None,
            _ => {
                return Err(Error::Validation(format!(
                    "Unsupported source and destination - can only copy between a local path \
                     and a cloud location, got {} and {}",
                    source, destination
                )))
            }
        };
        Ok(Self {
            source,
            destination,
            provider,
        })
    }

    /// Program and arguments that perform this copy
    pub fn command(&self) -> Result<Option<(String, Vec<String>)>> {
        let source = self.source.url().to_string();
        let destination = self.destination.url().to_string();
        let command = match self.provider {
            None => return Ok(None),
            Some(CloudProvider::S3) => {
                let mut args = vec!["s3".to_string(), "cp".to_string()];
                let local_dir = self.source.is_local() && self.source.as_path().is_dir();
                if source.ends_with('/') || local_dir {
                    args.push("--recursive".to_string());
                }
                args.extend([source, destination]);
                ("aws".to_string(), args)
            }
            Some(CloudProvider::Gcs) => (
                "gsutil".to_string(),
                vec![
                    "-m".to_string(),
                    "cp".to_string(),
                    "-r".to_string(),
                    source,
                    destination,
                ],
            ),
            Some(CloudProvider::Azure) => {
                let azure_side = if self.source.cloud_provider().is_some() {
                    &source
                } else {
                    &destination
                };
                let token = std::env::var(AZURE_SAS_TOKEN_ENV).unwrap_or_default();
                if token.is_empty() {
                    warn!("{} env is not provided", AZURE_SAS_TOKEN_ENV);
                }
                (
                    "rclone".to_string(),
                    vec![
                        "copyto".to_string(),
                        "--azureblob-sas-url".to_string(),
                        azure_sas_url(azure_side, &token)?,
                        rclone_azure_path(&source)?,
                        rclone_azure_path(&destination)?,
                    ],
                )
            }
            Some(CloudProvider::Web) => {
                let parsed = parse_url(&source)?;
                (
                    "rclone".to_string(),
                    vec![
                        "copyto".to_string(),
                        "--http-url".to_string(),
                        parsed.origin().ascii_serialization(),
                        format!(":http:{}", parsed.path()),
                        destination,
                    ],
                )
            }
        };
        Ok(Some(command))
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::Validation(format!("Invalid url {}: {}", raw, e)))
}

/// SAS url for rclone: https scheme, container-only path, token as query
pub fn azure_sas_url(raw: &str, token: &str) -> Result<String> {
    let parsed = parse_url(raw)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::Validation(format!("Azure url {} has no account host", raw)))?;
    let container = parsed.path().trim_start_matches('/').split('/').next().unwrap_or("");
    Ok(format!("https://{}/{}?{}", host, container, token))
}

/// Rewrite `azure+https` urls into rclone's `:azureblob:` remote syntax
pub fn rclone_azure_path(raw: &str) -> Result<String> {
    if raw.starts_with("azure+https:") {
        Ok(format!(":azureblob:{}", parse_url(raw)?.path()))
    } else {
        Ok(raw.to_string())
    }
}

#[async_trait]
impl Copier for ProviderCopier {
    async fn perform_copy(&self) -> Result<String> {
        match self.command()? {
            Some((program, args)) => {
                run_tool(&program, &args).await?;
            }
            None => {
                info!("Copying {} to {}", self.source, self.destination);
                copy_path(&self.source.as_path(), &self.destination.as_path()).await?;
            }
        }
        Ok(self.destination.url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_for(source: &str, destination: &str) -> (String, Vec<String>) {
        ProviderCopier::new(Resource::new(source), Resource::new(destination))
            .unwrap()
            .command()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_s3_prefix_is_recursive() {
        let (program, args) = command_for("s3://bucket/prefix/", "/tmp/ferry-missing-dir");
        assert_eq!(program, "aws");
        assert_eq!(
            args,
            vec!["s3", "cp", "--recursive", "s3://bucket/prefix/", "/tmp/ferry-missing-dir"]
        );

        let (_, args) = command_for("s3://bucket/key.csv", "/tmp/ferry-missing.csv");
        assert!(!args.contains(&"--recursive".to_string()));
    }

    #[test]
    fn test_gcs_command() {
        let (program, args) = command_for("/tmp/ferry-missing.tar", "gs://bucket/out.tar");
        assert_eq!(program, "gsutil");
        assert_eq!(args, vec!["-m", "cp", "-r", "/tmp/ferry-missing.tar", "gs://bucket/out.tar"]);
    }

    #[test]
    fn test_web_source_command() {
        let (program, args) = command_for("https://example.com/data/file.zip", "/tmp/file.zip");
        assert_eq!(program, "rclone");
        assert_eq!(
            args,
            vec![
                "copyto",
                "--http-url",
                "https://example.com",
                ":http:/data/file.zip",
                "/tmp/file.zip"
            ]
        );
    }

    #[test]
    fn test_azure_paths() {
        assert_eq!(
            azure_sas_url("azure+https://acct.blob.core.windows.net/container/dir/f.tar", "sv=1")
                .unwrap(),
            "https://acct.blob.core.windows.net/container?sv=1"
        );
        assert_eq!(
            rclone_azure_path("azure+https://acct.blob.core.windows.net/container/f.tar").unwrap(),
            ":azureblob:/container/f.tar"
        );
        assert_eq!(rclone_azure_path("/tmp/f.tar").unwrap(), "/tmp/f.tar");
    }

    #[test]
    fn test_rejected_routes() {
        assert!(ProviderCopier::new(Resource::new("/tmp/a"), Resource::new("https://x.org/a")).is_err());
        assert!(ProviderCopier::new(Resource::new("gs://b/a"), Resource::new("s3://b/a")).is_err());
        assert!(ProviderCopier::new(Resource::new("storage:a"), Resource::new("/tmp/a")).is_err());
    }

    #[tokio::test]
    async fn test_local_copy() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let source = temp_dir.path().join("a.txt");
        std::fs::write(&source, "payload").unwrap();
        let destination = temp_dir.path().join("b/a.txt");

        let copier =
            ProviderCopier::new(Resource::from_path(&source), Resource::from_path(&destination))
                .unwrap();
        let result = copier.perform_copy().await.unwrap();

        assert_eq!(result, destination.to_string_lossy());
        assert_eq!(std::fs::read_to_string(destination).unwrap(), "payload");
    }
}
