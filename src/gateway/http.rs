//! HTTP gateway speaking the Device Farm JSON target convention.
//!
//! Every call is a `POST` to the endpoint root with the operation named in
//! the `X-Amz-Target` header and a camelCase JSON body. Request signing is
//! not performed here: deployments either front the service with a
//! credential-injecting proxy or configure a bearer token.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::pool::DevicePool;
use crate::upload::{CreateUploadRequest, UploadJob};

use super::{CreatePoolRequest, Gateway, GatewayFuture, TransportError, UpdatePoolRequest};

/// Public Device Farm endpoint (the service only runs in `us-west-2`).
pub const DEFAULT_ENDPOINT: &str = "https://devicefarm.us-west-2.amazonaws.com";

const TARGET_HEADER: &str = "X-Amz-Target";
const TARGET_PREFIX: &str = "DeviceFarm_20150623";
const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Gateway backed by JSON-over-HTTP calls.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListDevicesInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDevicesOutput {
    #[serde(default)]
    devices: Vec<Device>,
    next_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListDevicePoolsInput<'a> {
    arn: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDevicePoolsOutput {
    #[serde(default)]
    device_pools: Vec<DevicePool>,
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevicePoolOutput {
    device_pool: DevicePool,
}

#[derive(Serialize)]
struct GetUploadInput<'a> {
    arn: &'a str,
}

#[derive(Deserialize)]
struct UploadOutput {
    upload: UploadJob,
}

// An empty continuation token ends pagination just like a missing one.
fn continuation(token: Option<String>) -> Option<String> {
    token.filter(|value| !value.is_empty())
}

impl HttpGateway {
    /// Creates a gateway for `endpoint`, sending `auth_token` as a bearer
    /// token when present.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when the HTTP client cannot be
    /// constructed.
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::request("client setup", &err))?;
        let endpoint = endpoint.into().trim_end_matches('/').to_owned();
        Ok(Self {
            client,
            endpoint,
            auth_token,
        })
    }

    /// Returns the endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<Req, Resp>(&self, operation: &str, input: &Req) -> Result<Resp, TransportError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let payload =
            serde_json::to_vec(input).map_err(|err| TransportError::request(operation, &err))?;

        let mut request = self
            .client
            .post(format!("{}/", self.endpoint))
            .header(TARGET_HEADER, format!("{TARGET_PREFIX}.{operation}"))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(payload);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| TransportError::request(operation, &err))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::request(operation, &err))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                operation: operation.to_owned(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|err| TransportError::Decode {
            operation: operation.to_owned(),
            message: err.to_string(),
        })
    }
}

impl Gateway for HttpGateway {
    fn list_devices(&self) -> GatewayFuture<'_, Vec<Device>> {
        Box::pin(async move {
            let mut devices = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let input = ListDevicesInput {
                    next_token: next_token.as_deref(),
                };
                let page: ListDevicesOutput = self.call("ListDevices", &input).await?;
                devices.extend(page.devices);
                next_token = continuation(page.next_token);
                if next_token.is_none() {
                    return Ok(devices);
                }
            }
        })
    }

    fn list_device_pools<'a>(
        &'a self,
        project_arn: &'a str,
    ) -> GatewayFuture<'a, Vec<DevicePool>> {
        Box::pin(async move {
            let mut pools = Vec::new();
            let mut next_token: Option<String> = None;
            loop {
                let input = ListDevicePoolsInput {
                    arn: project_arn,
                    next_token: next_token.as_deref(),
                };
                let page: ListDevicePoolsOutput = self.call("ListDevicePools", &input).await?;
                pools.extend(page.device_pools);
                next_token = continuation(page.next_token);
                if next_token.is_none() {
                    return Ok(pools);
                }
            }
        })
    }

    fn create_device_pool<'a>(
        &'a self,
        request: &'a CreatePoolRequest,
    ) -> GatewayFuture<'a, DevicePool> {
        Box::pin(async move {
            let output: DevicePoolOutput = self.call("CreateDevicePool", request).await?;
            Ok(output.device_pool)
        })
    }

    fn update_device_pool<'a>(
        &'a self,
        request: &'a UpdatePoolRequest,
    ) -> GatewayFuture<'a, DevicePool> {
        Box::pin(async move {
            let output: DevicePoolOutput = self.call("UpdateDevicePool", request).await?;
            Ok(output.device_pool)
        })
    }

    fn create_upload<'a>(
        &'a self,
        request: &'a CreateUploadRequest,
    ) -> GatewayFuture<'a, UploadJob> {
        Box::pin(async move {
            let output: UploadOutput = self.call("CreateUpload", request).await?;
            Ok(output.upload)
        })
    }

    fn get_upload<'a>(&'a self, arn: &'a str) -> GatewayFuture<'a, UploadJob> {
        Box::pin(async move {
            let output: UploadOutput = self.call("GetUpload", &GetUploadInput { arn }).await?;
            Ok(output.upload)
        })
    }
}
