//! ferry - move data between local paths, cloud buckets and platform storage
//!
//! Copies the local machine can serve run directly, compressing or extracting
//! archives on the way. Copies between platform storage and cloud buckets run
//! as a job on the platform, and the job's exit code becomes ours.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ferry_core::config::Config;
use std::process;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod copy;

use copy::{CopyOperation, CopyRequest};

/// ferry - data copy with on-the-fly compression
#[derive(Parser)]
#[command(name = "ferry")]
#[command(author, version, about = "Copy data between local paths, cloud buckets and platform storage", long_about = None)]
struct Cli {
    /// Enable verbose output for debugging (-v is taken by --volume)
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Data transfer commands
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(long, conflicts_with = "path")]
        show: bool,

        /// Show configuration file path
        #[arg(long, conflicts_with = "show")]
        path: bool,
    },
}

#[derive(Subcommand)]
enum DataCommands {
    /// Copy data from SOURCE to DESTINATION
    Cp(CopyArgs),
}

#[derive(Args)]
struct CopyArgs {
    /// Local path, cloud url (s3://, gs://, azure+https://, https://), storage: or disk: url
    source: String,

    /// Local path, cloud url, storage: or disk: url
    destination: String,

    /// Compress SOURCE into the archive type of DESTINATION
    #[arg(short, long)]
    compress: bool,

    /// Extract the SOURCE archive into DESTINATION
    #[arg(short = 'x', long)]
    extract: bool,

    /// Extra volume for the copy job, STORAGE_OR_DISK_URL:MOUNT_POINT[:MODE]
    #[arg(short = 'v', long = "volume", value_name = "MOUNT")]
    volumes: Vec<String>,

    /// Extra environment variable for the copy job, VAR=VAL
    #[arg(short = 'e', long = "env", value_name = "VAR=VAL")]
    env: Vec<String>,

    /// Preset of the copy job
    #[arg(short, long)]
    preset: Option<String>,

    /// Maximum run time of the copy job, e.g. "2h" or "1d 6h"
    #[arg(long, value_parser = humantime::parse_duration)]
    life_span: Option<Duration>,
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    match run() {
        Ok(_) => process::exit(0),
        Err(e) => {
            error!("Error: {}", e);
            // logging is off with --quiet, errors still go to stderr
            if !tracing::enabled!(tracing::Level::ERROR) {
                eprintln!("Error: {}", e);
            }
            process::exit(map_error_to_exit_code(&e));
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Data {
            command: DataCommands::Cp(args),
        } => {
            let config = Config::load()?;
            let operation = CopyOperation::new(
                &args.source,
                &args.destination,
                CopyRequest {
                    compress: args.compress,
                    extract: args.extract,
                    volumes: args.volumes,
                    env: args.env,
                    preset: args.preset,
                    life_span: args.life_span,
                },
            )?;

            let runtime = tokio::runtime::Runtime::new()?;
            let destination = runtime.block_on(operation.run(&config))?;
            info!("Copied {} to {}", args.source, destination);
        }

        Commands::Config { show, path } => {
            if path {
                println!("{}", Config::config_path()?.display());
            } else if show {
                let config = Config::load()?;
                println!("{}", toml::to_string_pretty(&config)?);
            } else {
                println!("Use --show to display the configuration or --path for its location");
            }
        }
    }

    Ok(())
}

fn map_core_error(err: &ferry_core::Error) -> i32 {
    match err {
        ferry_core::Error::Io(_) => 2,
        ferry_core::Error::Validation(_) => 3,
        ferry_core::Error::UnsupportedUrl { .. } => 3,
        ferry_core::Error::UnsupportedArchiveType { .. } => 3,
        ferry_core::Error::UnsupportedArchiveFamily { .. } => 3,
        ferry_core::Error::ExternalTool { .. } => 1,
        ferry_core::Error::Config(_) => 1,
    }
}

fn map_error_to_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(remote_err) = err.downcast_ref::<ferry_remote::RemoteError>() {
        match remote_err {
            ferry_remote::RemoteError::RemoteJobFailed { exit_code, .. } => *exit_code,
            ferry_remote::RemoteError::Core(core_err) => map_core_error(core_err),
            ferry_remote::RemoteError::UnsupportedRoute { .. } => 3,
            ferry_remote::RemoteError::Scheduler(_) => 1,
            ferry_remote::RemoteError::Timeout { .. } => 1,
        }
    } else if let Some(core_err) = err.downcast_ref::<ferry_core::Error>() {
        map_core_error(core_err)
    } else if err.is::<std::io::Error>() {
        2
    } else {
        1
    }
}
