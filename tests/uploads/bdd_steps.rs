//! BDD step definitions for artifact uploads.

use std::fs;
use std::time::Duration;

use devicefarm::test_support::RecordingBlobTransfer;
use devicefarm::{PollSettings, UploadStatus};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

use super::test_helpers::{PROJECT, UploadContext, UploadOutcome, first_upload_arn};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("an artifact \"{name}\" containing \"{contents}\"")]
fn artifact(
    mut upload_context: UploadContext,
    name: String,
    contents: String,
) -> Result<UploadContext, StepError> {
    let path = upload_context.workdir.join(name.trim());
    fs::write(&path, contents.as_bytes())
        .map_err(|err| StepError::Assertion(format!("write {path}: {err}")))?;
    upload_context.artifact = Some(path);
    Ok(upload_context)
}

#[given("the service reports \"{first}\" then \"{second}\" for the upload")]
fn service_reports(mut upload_context: UploadContext, first: String, second: String) -> UploadContext {
    let statuses = [
        UploadStatus::from(first.trim()),
        UploadStatus::from(second.trim()),
    ];
    upload_context.gateway = upload_context
        .gateway
        .script_upload(&first_upload_arn(), &statuses);
    upload_context
}

#[given("polling gives up after \"{millis}\" milliseconds")]
fn polling_budget(mut upload_context: UploadContext, millis: u64) -> UploadContext {
    upload_context.settings = PollSettings::new(Duration::from_millis(millis), Duration::from_millis(1));
    upload_context
}

#[given("the blob store rejects uploads with status \"{status}\"")]
fn blob_rejects(mut upload_context: UploadContext, status: u16) -> UploadContext {
    upload_context.blob = RecordingBlobTransfer::new().failing_with(status);
    upload_context
}

#[when("I upload the artifact as \"{kind}\"")]
fn upload_artifact(mut upload_context: UploadContext, kind: String) -> Result<UploadContext, StepError> {
    let Some(path) = upload_context.artifact.clone() else {
        return Err(StepError::Assertion(String::from("no artifact prepared")));
    };
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let client = upload_context.client();
    let result = runtime.block_on(async move {
        client
            .upload_file(PROJECT, &path, kind.trim(), None)
            .await
    });

    upload_context.outcome = Some(match result {
        Ok(job) => UploadOutcome::Finished(job),
        Err(err) => UploadOutcome::Failed(err.to_string()),
    });
    Ok(upload_context)
}

#[then("the upload finishes as \"{status}\"")]
fn upload_finishes(upload_context: &UploadContext, status: String) -> Result<(), StepError> {
    match upload_context.outcome.as_ref() {
        Some(UploadOutcome::Finished(job)) if job.status.as_str() == status.trim() => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected upload to finish as {status}, got {other:?}"
        ))),
    }
}

#[then("the blob store received \"{contents}\"")]
fn blob_received(upload_context: &UploadContext, contents: String) -> Result<(), StepError> {
    let puts = upload_context.blob.puts();
    match puts.as_slice() {
        [(_, body)] if body.as_slice() == contents.trim().as_bytes() => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected a single PUT of {contents}, got {} transfers",
            other.len()
        ))),
    }
}

#[then("the upload fails mentioning \"{text}\"")]
fn upload_fails(upload_context: &UploadContext, text: String) -> Result<(), StepError> {
    match upload_context.outcome.as_ref() {
        Some(UploadOutcome::Failed(err)) if err.contains(text.trim()) => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected failure mentioning {text}, got {other:?}"
        ))),
    }
}

#[then("the service was never polled")]
fn never_polled(upload_context: &UploadContext) -> Result<(), StepError> {
    let queries = upload_context.gateway.status_queries();
    if queries.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!("unexpected status queries: {queries:?}")))
    }
}
