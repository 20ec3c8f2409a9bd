//! Remote transfer orchestration for Ferry
//!
//! Platform storage and disks are not reachable from the machine running
//! `ferry`, so copies between them and cloud storage run as jobs on the
//! platform. This crate maps endpoints into job volumes, builds the job
//! configuration and follows the job until it finishes.

pub mod command;
pub mod copier;
pub mod env;
pub mod error;
pub mod job;
pub mod scheduler;
pub mod volume;

pub use command::CommandScheduler;
pub use copier::{ensure_remote_route, PollSettings, RemoteCopier};
pub use error::{RemoteError, Result, EXIT_PLATFORM_ERROR};
pub use job::{JobOptions, JobSettings, RemoteJobConfig};
pub use scheduler::{JobHandle, JobScheduler, JobState, JobStatus, LogStream};
pub use volume::{map_endpoint, map_into_volumes, MountLayout, MountPrefixes, VolumeMapping};
