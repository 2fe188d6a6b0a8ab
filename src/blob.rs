//! Artifact transfer to presigned blob-storage URLs.

use std::time::Duration;

use crate::gateway::{GatewayFuture, TransportError};

const OPERATION: &str = "blob upload";

/// Moves artifact bytes to the location returned by the gateway.
pub trait BlobTransfer {
    /// Performs a single PUT of `body` to `url`.
    fn put<'a>(&'a self, url: &'a str, body: Vec<u8>) -> GatewayFuture<'a, ()>;
}

/// Blob transfer that issues HTTP `PUT` requests.
#[derive(Clone, Debug)]
pub struct HttpBlobTransfer {
    client: reqwest::Client,
}

impl HttpBlobTransfer {
    /// Creates a transfer client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when the HTTP client cannot be
    /// constructed.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::request("client setup", &err))?;
        Ok(Self { client })
    }
}

impl BlobTransfer for HttpBlobTransfer {
    fn put<'a>(&'a self, url: &'a str, body: Vec<u8>) -> GatewayFuture<'a, ()> {
        Box::pin(async move {
            let response = self
                .client
                .put(url)
                .body(body)
                .send()
                .await
                .map_err(|err| TransportError::request(OPERATION, &err))?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }

            let body = response.text().await.unwrap_or_default();
            Err(TransportError::Status {
                operation: OPERATION.to_owned(),
                status: status.as_u16(),
                body,
            })
        })
    }
}
