//! Client façade composing the gateway, blob transfer, and core helpers.
//!
//! [`DeviceFarm`] is the entry point used by the CLI. Pool membership is
//! always expressed through [`build_rules`], and waits are delegated to the
//! completion poller with the gateway's upload status as the accessor.

use std::slice;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::blob::BlobTransfer;
use crate::device::{Device, filter_devices};
use crate::gateway::{CreatePoolRequest, Gateway, TransportError, UpdatePoolRequest};
use crate::poller::{PollError, PollSettings, wait_for_completion};
use crate::pool::{DevicePool, build_rules, pool_matches};
use crate::upload::{CreateUploadRequest, UploadJob};

/// Errors surfaced by multi-step client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A gateway or blob-transfer call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Waiting for upload processing failed or timed out.
    #[error("upload did not complete: {0}")]
    Wait(#[from] PollError<TransportError>),
    /// The artifact could not be read from disk.
    #[error("failed to read artifact {path}: {message}")]
    ReadArtifact {
        /// Path that was being read.
        path: Utf8PathBuf,
        /// I/O error message.
        message: String,
    },
    /// The gateway created an upload without a destination URL.
    #[error("upload {arn} has no destination URL")]
    MissingUploadUrl {
        /// Handle of the upload.
        arn: String,
    },
}

/// Outcome of [`DeviceFarm::ensure_device_pool`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PoolSync {
    /// No pool had the requested name, so one was created.
    Created(DevicePool),
    /// A pool with the name existed but selected different devices.
    Updated(DevicePool),
    /// A pool with the name already selected exactly the requested devices.
    Unchanged(DevicePool),
}

impl PoolSync {
    /// Returns the pool regardless of which action was taken.
    #[must_use]
    pub const fn pool(&self) -> &DevicePool {
        match self {
            Self::Created(pool) | Self::Updated(pool) | Self::Unchanged(pool) => pool,
        }
    }
}

/// High-level operations against the remote testing service.
#[derive(Clone, Debug)]
pub struct DeviceFarm<G, B> {
    gateway: G,
    blob: B,
    poll: PollSettings,
}

impl<G, B> DeviceFarm<G, B>
where
    G: Gateway,
    B: BlobTransfer,
{
    /// Creates a client using the default poll settings.
    #[must_use]
    pub fn new(gateway: G, blob: B) -> Self {
        Self {
            gateway,
            blob,
            poll: PollSettings::default(),
        }
    }

    /// Overrides the poll settings used by [`DeviceFarm::wait_for_uploads`].
    #[must_use]
    pub const fn with_poll_settings(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// Lists devices whose name contains `query` (ignoring case), optionally
    /// restricted to one platform, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the device listing fails.
    pub async fn search_devices(
        &self,
        query: &str,
        android_only: bool,
        ios_only: bool,
    ) -> Result<Vec<Device>, TransportError> {
        let devices = self.gateway.list_devices().await?;
        debug!(listed = devices.len(), query, "filtering device catalogue");
        Ok(filter_devices(devices, query, android_only, ios_only))
    }

    /// Lists the device pools of a project.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the listing fails.
    pub async fn list_device_pools(
        &self,
        project_arn: &str,
    ) -> Result<Vec<DevicePool>, TransportError> {
        self.gateway.list_device_pools(project_arn).await
    }

    /// Creates a pool selecting exactly `identifiers`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the gateway rejects the request.
    pub async fn create_device_pool<S: AsRef<str>>(
        &self,
        project_arn: &str,
        name: &str,
        identifiers: &[S],
    ) -> Result<DevicePool, TransportError> {
        let request = CreatePoolRequest {
            project_arn: project_arn.to_owned(),
            name: name.to_owned(),
            description: None,
            rules: build_rules(identifiers),
        };
        let pool = self.gateway.create_device_pool(&request).await?;
        info!(pool = %pool.arn, name, devices = identifiers.len(), "created device pool");
        Ok(pool)
    }

    /// Replaces the rules of `pool` so it selects exactly `identifiers`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the gateway rejects the request.
    pub async fn update_device_pool<S: AsRef<str>>(
        &self,
        pool: &DevicePool,
        identifiers: &[S],
    ) -> Result<DevicePool, TransportError> {
        let request = UpdatePoolRequest {
            arn: pool.arn.clone(),
            name: pool.name.clone(),
            description: pool.description.clone(),
            rules: build_rules(identifiers),
        };
        let updated = self.gateway.update_device_pool(&request).await?;
        info!(pool = %updated.arn, devices = identifiers.len(), "updated device pool");
        Ok(updated)
    }

    /// Reports whether `pool` selects exactly `identifiers`.
    #[must_use]
    #[expect(
        clippy::unused_self,
        reason = "exposed on the client so callers can work through the façade alone"
    )]
    pub fn device_pool_matches<S: AsRef<str>>(&self, pool: &DevicePool, identifiers: &[S]) -> bool {
        pool_matches(pool, identifiers)
    }

    /// Makes sure the project has a pool named `name` selecting exactly
    /// `identifiers`, creating or updating it as needed.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when listing, creating, or updating fails.
    pub async fn ensure_device_pool<S: AsRef<str>>(
        &self,
        project_arn: &str,
        name: &str,
        identifiers: &[S],
    ) -> Result<PoolSync, TransportError> {
        let existing = self
            .list_device_pools(project_arn)
            .await?
            .into_iter()
            .find(|pool| pool.name == name);

        match existing {
            Some(pool) if self.device_pool_matches(&pool, identifiers) => {
                debug!(pool = %pool.arn, "device pool already up to date");
                Ok(PoolSync::Unchanged(pool))
            }
            Some(pool) => self
                .update_device_pool(&pool, identifiers)
                .await
                .map(PoolSync::Updated),
            None => self
                .create_device_pool(project_arn, name, identifiers)
                .await
                .map(PoolSync::Created),
        }
    }

    /// Reserves an upload slot for an artifact.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the gateway rejects the request.
    pub async fn create_upload(
        &self,
        project_arn: &str,
        name: &str,
        kind: &str,
    ) -> Result<UploadJob, TransportError> {
        let request = CreateUploadRequest {
            project_arn: project_arn.to_owned(),
            name: name.to_owned(),
            kind: kind.to_owned(),
            content_type: None,
        };
        self.gateway.create_upload(&request).await
    }

    /// Sends artifact bytes to a presigned blob-storage URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the transfer fails or is rejected.
    pub async fn upload_to_blob(&self, url: &str, body: Vec<u8>) -> Result<(), TransportError> {
        debug!(bytes = body.len(), "uploading artifact");
        self.blob.put(url, body).await
    }

    /// Waits for every upload in `job_ids` to succeed using the client's
    /// poll settings.
    ///
    /// # Errors
    ///
    /// See [`wait_for_completion`].
    pub async fn wait_for_uploads(&self, job_ids: &[String]) -> Result<(), PollError<TransportError>> {
        self.wait_for_uploads_with(self.poll, job_ids).await
    }

    /// Waits for every upload in `job_ids` to succeed using `settings`.
    ///
    /// # Errors
    ///
    /// See [`wait_for_completion`].
    pub async fn wait_for_uploads_with(
        &self,
        settings: PollSettings,
        job_ids: &[String],
    ) -> Result<(), PollError<TransportError>> {
        let gateway = &self.gateway;
        wait_for_completion(settings, job_ids, move |job_id| async move {
            gateway.get_upload(&job_id).await.map(|job| job.status)
        })
        .await?;
        info!(uploads = job_ids.len(), "uploads processed");
        Ok(())
    }

    /// Uploads a file as a new artifact and waits for processing to finish.
    ///
    /// The upload is named `name`, or after the file when `name` is `None`.
    /// Returns the job as reported once processing succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ReadArtifact`] when the file cannot be read,
    /// [`ClientError::MissingUploadUrl`] when the gateway omits the
    /// destination, and transport or wait errors from the individual steps.
    pub async fn upload_file(
        &self,
        project_arn: &str,
        path: &Utf8Path,
        kind: &str,
        name: Option<&str>,
    ) -> Result<UploadJob, ClientError> {
        let body = tokio::fs::read(path)
            .await
            .map_err(|err| ClientError::ReadArtifact {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        let upload_name = name.map_or_else(
            || path.file_name().unwrap_or(path.as_str()).to_owned(),
            str::to_owned,
        );

        let job = self.create_upload(project_arn, &upload_name, kind).await?;
        let url = job
            .url
            .as_deref()
            .ok_or_else(|| ClientError::MissingUploadUrl {
                arn: job.arn.clone(),
            })?;
        self.upload_to_blob(url, body).await?;
        self.wait_for_uploads(slice::from_ref(&job.arn)).await?;

        Ok(self.gateway.get_upload(&job.arn).await?)
    }
}
