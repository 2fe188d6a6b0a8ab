//! BDD scenarios for artifact uploads.

use rstest_bdd_macros::scenario;

use super::test_helpers::{UploadContext, upload_context};

#[scenario(
    path = "tests/features/uploads.feature",
    name = "Upload an artifact that finishes processing"
)]
fn scenario_upload_finishes(upload_context: UploadContext) {
    let _ = upload_context;
}

#[scenario(
    path = "tests/features/uploads.feature",
    name = "Surface uploads rejected during processing"
)]
fn scenario_upload_rejected(upload_context: UploadContext) {
    let _ = upload_context;
}

#[scenario(
    path = "tests/features/uploads.feature",
    name = "Give up on uploads that never finish"
)]
fn scenario_upload_times_out(upload_context: UploadContext) {
    let _ = upload_context;
}

#[scenario(
    path = "tests/features/uploads.feature",
    name = "Stop when blob storage rejects the artifact"
)]
fn scenario_blob_rejected(upload_context: UploadContext) {
    let _ = upload_context;
}
