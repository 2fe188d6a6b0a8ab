//! Shared fixtures for upload BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use devicefarm::test_support::{FakeGateway, RecordingBlobTransfer};
use devicefarm::{DeviceFarm, PollSettings, UploadJob};
use rstest::fixture;
use tempfile::TempDir;

pub const PROJECT: &str = "arn:aws:devicefarm:us-west-2:42:project:uploads";

#[derive(Clone, Debug)]
pub enum UploadOutcome {
    Finished(UploadJob),
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct UploadContext {
    pub gateway: FakeGateway,
    pub blob: RecordingBlobTransfer,
    pub settings: PollSettings,
    pub workdir: Utf8PathBuf,
    pub artifact: Option<Utf8PathBuf>,
    pub outcome: Option<UploadOutcome>,
    _workdir_tmp: Arc<TempDir>,
}

#[fixture]
pub fn upload_context() -> UploadContext {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("create upload temp dir: {err}"));
    let workdir = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
        .unwrap_or_else(|path| panic!("non-utf8 tempdir path: {}", path.display()));
    UploadContext {
        gateway: FakeGateway::new(),
        blob: RecordingBlobTransfer::new(),
        settings: PollSettings::new(Duration::from_secs(1), Duration::ZERO),
        workdir,
        artifact: None,
        outcome: None,
        _workdir_tmp: Arc::new(tmp),
    }
}

impl UploadContext {
    pub fn client(&self) -> DeviceFarm<FakeGateway, RecordingBlobTransfer> {
        DeviceFarm::new(self.gateway.clone(), self.blob.clone()).with_poll_settings(self.settings)
    }
}

/// Handle the fake gateway assigns to the first upload of [`PROJECT`].
pub fn first_upload_arn() -> String {
    format!("{PROJECT}:upload/1")
}
