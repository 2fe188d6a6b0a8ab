//! Remote service gateway abstraction for device, pool, and upload calls.
//!
//! The client façade talks to the remote testing service only through the
//! [`Gateway`] trait, so tests substitute a fake implementation instead of
//! stubbing the network.

mod error;
mod http;

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::device::Device;
use crate::pool::{DevicePool, Rule};
use crate::upload::{CreateUploadRequest, UploadJob};

pub use error::TransportError;
pub use http::{DEFAULT_ENDPOINT, HttpGateway};

/// Future returned by gateway and blob-transfer operations.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send + 'a>>;

/// Parameters for creating a device pool.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolRequest {
    /// Project that will own the pool.
    pub project_arn: String,
    /// Display name of the pool.
    pub name: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Membership rules produced by [`crate::pool::build_rules`].
    pub rules: Vec<Rule>,
}

/// Parameters for replacing the rules of an existing device pool.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePoolRequest {
    /// Handle of the pool being updated.
    pub arn: String,
    /// Display name to keep or set.
    pub name: String,
    /// Optional description to keep or set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replacement membership rules produced by [`crate::pool::build_rules`].
    pub rules: Vec<Rule>,
}

/// Operations the remote testing service must provide.
pub trait Gateway {
    /// Lists every device available for testing.
    fn list_devices(&self) -> GatewayFuture<'_, Vec<Device>>;

    /// Lists the device pools belonging to a project.
    fn list_device_pools<'a>(&'a self, project_arn: &'a str)
    -> GatewayFuture<'a, Vec<DevicePool>>;

    /// Creates a device pool and returns the stored pool.
    fn create_device_pool<'a>(
        &'a self,
        request: &'a CreatePoolRequest,
    ) -> GatewayFuture<'a, DevicePool>;

    /// Updates a device pool and returns the stored pool.
    fn update_device_pool<'a>(
        &'a self,
        request: &'a UpdatePoolRequest,
    ) -> GatewayFuture<'a, DevicePool>;

    /// Reserves an upload slot and returns the job with its presigned URL.
    fn create_upload<'a>(&'a self, request: &'a CreateUploadRequest)
    -> GatewayFuture<'a, UploadJob>;

    /// Fetches the current state of an upload job.
    fn get_upload<'a>(&'a self, arn: &'a str) -> GatewayFuture<'a, UploadJob>;
}
