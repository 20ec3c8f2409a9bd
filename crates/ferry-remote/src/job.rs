//! Remote copy job configuration

use crate::env::parse_env;
use crate::volume::{map_into_volumes, parse_volumes, MountLayout, SecretFile, VolumeMount};
use crate::Result;
use ferry_core::config::Config;
use ferry_core::Error;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Entry point the worker image runs to perform the copy
pub const DATA_COPY_COMMAND: &str = "ferry data cp";

/// Caller supplied options of a remote copy
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    pub compress: bool,
    pub extract: bool,
    /// Extra volume declarations, `<locator>:<mountPoint>[:<mode>]`
    pub volumes: Vec<String>,
    /// Extra environment declarations, `NAME=VALUE`
    pub env: Vec<String>,
    pub preset: Option<String>,
    pub life_span: Option<Duration>,
}

/// Deployment wide settings the builder reads; no I/O happens while building
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub image: String,
    pub default_preset: Option<String>,
    pub presets: Vec<String>,
    pub mounts: MountLayout,
}

impl JobSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            image: config.remote.image(),
            default_preset: config.remote.default_preset.clone(),
            presets: config.remote.presets.clone(),
            mounts: MountLayout::from(&config.mounts),
        }
    }

    /// Explicit preset if known, else the configured default, else the first
    /// preset of the deployment
    pub fn resolve_preset(&self, requested: Option<&str>) -> Result<String> {
        if let Some(preset) = requested {
            if !self.presets.is_empty() && !self.presets.iter().any(|known| known == preset) {
                return Err(Error::Validation(format!(
                    "Unknown preset '{}', available presets: {}",
                    preset,
                    self.presets.join(", ")
                ))
                .into());
            }
            return Ok(preset.to_string());
        }
        self.default_preset
            .clone()
            .or_else(|| self.presets.first().cloned())
            .ok_or_else(|| Error::Validation("No preset requested and none configured".to_string()).into())
    }
}

impl Default for JobSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Fully resolved job submission, consumed once by the remote copier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteJobConfig {
    pub image: String,
    pub command: String,
    pub env: BTreeMap<String, String>,
    pub secret_env: BTreeMap<String, String>,
    pub volumes: Vec<VolumeMount>,
    pub disk_volumes: Vec<VolumeMount>,
    pub secret_files: Vec<SecretFile>,
    pub preset_name: String,
    pub life_span: Option<Duration>,
    /// Propagate the caller's platform config into the job
    pub pass_config: bool,
}

impl RemoteJobConfig {
    pub fn build(
        source: &str,
        destination: &str,
        options: &JobOptions,
        settings: &JobSettings,
    ) -> Result<Self> {
        let mapped = map_into_volumes(source, destination, &settings.mounts)?;
        debug!("Patched {} into {}", source, mapped.source);
        debug!("Patched {} into {}", destination, mapped.destination);
        debug!("Created job mountpoints: {:?}", mapped.mount_specs);

        let command = build_data_copy_command(
            &mapped.source,
            &mapped.destination,
            options.compress,
            options.extract,
        )?;

        let mut all_volumes = options.volumes.clone();
        all_volumes.extend(mapped.mount_specs);
        let volumes = parse_volumes(&all_volumes)?;
        let env = parse_env(&options.env)?;
        let preset_name = settings.resolve_preset(options.preset.as_deref())?;

        Ok(Self {
            image: settings.image.clone(),
            command,
            env: env.env,
            secret_env: env.secret_env,
            volumes: volumes.volumes,
            disk_volumes: volumes.disk_volumes,
            secret_files: volumes.secret_files,
            preset_name,
            life_span: options.life_span,
            pass_config: true,
        })
    }
}

/// `ferry data cp [-c] [-x] <source> <destination>`, paths shell-quoted
pub fn build_data_copy_command(
    source: &str,
    destination: &str,
    compress: bool,
    extract: bool,
) -> Result<String> {
    let mut args = Vec::new();
    if compress {
        args.push("-c");
    }
    if extract {
        args.push("-x");
    }
    args.extend([source, destination]);
    let quoted = shlex::try_join(args)
        .map_err(|e| Error::Validation(format!("Cannot quote copy job arguments: {}", e)))?;
    Ok(format!("{} {}", DATA_COPY_COMMAND, quoted))
}
