//! Upload jobs tracked by the gateway while it processes test artifacts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Processing state of an upload job.
///
/// Values the client does not know are carried verbatim in
/// [`UploadStatus::Other`] and treated as still in progress.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub enum UploadStatus {
    /// The upload slot exists but no bytes have been processed.
    Initialized,
    /// The gateway is validating the uploaded artifact.
    Processing,
    /// Terminal success.
    Succeeded,
    /// Terminal failure.
    Failed,
    /// Any other status string reported by the gateway.
    Other(String),
}

impl UploadStatus {
    /// Returns the wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Initialized => "INITIALIZED",
            Self::Processing => "PROCESSING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for UploadStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "INITIALIZED" => Self::Initialized,
            "PROCESSING" => Self::Processing,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for UploadStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<UploadStatus> for String {
    fn from(value: UploadStatus) -> Self {
        match value {
            UploadStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An asynchronous artifact-processing job owned by the gateway.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadJob {
    /// Provider handle for the upload.
    pub arn: String,
    /// Display name given at creation.
    #[serde(default)]
    pub name: String,
    /// Current processing status.
    pub status: UploadStatus,
    /// Presigned blob-storage URL that accepts the artifact bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Artifact type (for example `ANDROID_APP`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Gateway supplied explanation when processing fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadJob {
    /// Creates a job record with no URL, type, or message.
    #[must_use]
    pub fn new(arn: impl Into<String>, status: UploadStatus) -> Self {
        Self {
            arn: arn.into(),
            name: String::new(),
            status,
            url: None,
            kind: None,
            message: None,
        }
    }
}

/// Parameters for reserving a new upload slot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUploadRequest {
    /// Project that will own the upload.
    pub project_arn: String,
    /// File name reported to the gateway.
    pub name: String,
    /// Artifact type (for example `ANDROID_APP`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional MIME type for the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("INITIALIZED", UploadStatus::Initialized)]
    #[case("PROCESSING", UploadStatus::Processing)]
    #[case("SUCCEEDED", UploadStatus::Succeeded)]
    #[case("FAILED", UploadStatus::Failed)]
    #[case("QUEUED", UploadStatus::Other(String::from("QUEUED")))]
    fn status_parses_wire_values(#[case] raw: &str, #[case] expected: UploadStatus) {
        assert_eq!(UploadStatus::from(raw), expected);
        assert_eq!(String::from(expected), raw);
    }

    #[test]
    fn upload_job_decodes_gateway_json() {
        let job: UploadJob = serde_json::from_str(
            r#"{"arn":"up-1","name":"app.apk","status":"PROCESSING","type":"ANDROID_APP","url":"https://blob/up-1"}"#,
        )
        .unwrap_or_else(|err| panic!("upload should decode: {err}"));

        assert_eq!(job.status, UploadStatus::Processing);
        assert_eq!(job.kind.as_deref(), Some("ANDROID_APP"));
        assert_eq!(job.url.as_deref(), Some("https://blob/up-1"));
    }

    #[test]
    fn create_upload_request_uses_gateway_field_names() {
        let request = CreateUploadRequest {
            project_arn: String::from("proj"),
            name: String::from("app.apk"),
            kind: String::from("ANDROID_APP"),
            content_type: None,
        };

        let encoded = serde_json::to_string(&request)
            .unwrap_or_else(|err| panic!("request should encode: {err}"));

        assert_eq!(
            encoded,
            r#"{"projectArn":"proj","name":"app.apk","type":"ANDROID_APP"}"#
        );
    }
}
