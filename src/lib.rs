//! Core library for the `devicefarm` client.
//!
//! The crate searches a remote device catalogue, keeps device pools in sync
//! with an explicit list of devices, and uploads test artifacts before
//! waiting for the service to finish processing them. All remote calls go
//! through the [`Gateway`] and [`BlobTransfer`] seams so the façade can be
//! exercised without a network.

pub mod blob;
pub mod client;
pub mod config;
pub mod device;
pub mod gateway;
pub mod poller;
pub mod pool;
pub mod repo;
pub mod test_support;
pub mod upload;

pub use blob::{BlobTransfer, HttpBlobTransfer};
pub use client::{ClientError, DeviceFarm, PoolSync};
pub use config::{ConfigError, DeviceFarmConfig};
pub use device::{Device, Platform, filter_devices};
pub use gateway::{
    CreatePoolRequest, DEFAULT_ENDPOINT, Gateway, GatewayFuture, HttpGateway, TransportError,
    UpdatePoolRequest,
};
pub use poller::{PollError, PollSettings, wait_for_completion};
pub use pool::{DevicePool, Rule, build_rules, pool_matches};
pub use repo::{
    CommandOutput, CommandRunner, ProcessCommandRunner, RepoError, StepOutcome, git_branch,
    run_all,
};
pub use upload::{CreateUploadRequest, UploadJob, UploadStatus};
