//! Test support utilities shared across unit and integration tests.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::env;
use std::ffi::OsString;
use std::future;
use std::rc::Rc;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use tokio::sync::{Mutex, MutexGuard};

use crate::blob::BlobTransfer;
use crate::device::Device;
use crate::gateway::{CreatePoolRequest, Gateway, GatewayFuture, TransportError, UpdatePoolRequest};
use crate::pool::DevicePool;
use crate::repo::{CommandOutput, CommandRunner, RepoError};
use crate::upload::{CreateUploadRequest, UploadJob, UploadStatus};

/// Body returned by simulated failures.
pub const SIMULATED_FAILURE: &str = "simulated failure";

fn simulated_failure(operation: &str) -> TransportError {
    TransportError::Status {
        operation: operation.to_owned(),
        status: 500,
        body: String::from(SIMULATED_FAILURE),
    }
}

#[derive(Debug, Default)]
struct GatewayState {
    devices: Vec<Device>,
    pools: Vec<DevicePool>,
    uploads: HashMap<String, UploadJob>,
    upload_scripts: HashMap<String, VecDeque<UploadStatus>>,
    failing: Vec<String>,
    omit_upload_url: bool,
    next_id: usize,
    created_pools: Vec<CreatePoolRequest>,
    updated_pools: Vec<UpdatePoolRequest>,
    created_uploads: Vec<CreateUploadRequest>,
    status_queries: Vec<String>,
}

impl GatewayState {
    fn check(&self, operation: &str) -> Result<(), TransportError> {
        if self.failing.iter().any(|failing| failing == operation) {
            return Err(simulated_failure(operation));
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    fn next_status(&mut self, arn: &str) -> UploadStatus {
        let Some(script) = self.upload_scripts.get_mut(arn) else {
            return UploadStatus::Succeeded;
        };
        if script.len() > 1 {
            script.pop_front().unwrap_or(UploadStatus::Succeeded)
        } else {
            script.front().cloned().unwrap_or(UploadStatus::Succeeded)
        }
    }
}

/// In-memory [`Gateway`] with scripted upload statuses and call recording.
///
/// Clones share state, so a test can keep a handle while the client owns
/// another. Uploads without a script report `SUCCEEDED`; a scripted upload
/// replays its statuses in order and then repeats the last one.
#[derive(Clone, Debug, Default)]
pub struct FakeGateway {
    state: Arc<StdMutex<GatewayState>>,
}

impl FakeGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StdMutexGuard<'_, GatewayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds the device catalogue.
    #[must_use]
    pub fn with_devices(self, devices: Vec<Device>) -> Self {
        self.lock().devices = devices;
        self
    }

    /// Seeds the project's device pools.
    #[must_use]
    pub fn with_pools(self, pools: Vec<DevicePool>) -> Self {
        self.lock().pools = pools;
        self
    }

    /// Scripts the statuses reported for the upload `arn`.
    #[must_use]
    pub fn script_upload(self, arn: &str, statuses: &[UploadStatus]) -> Self {
        self.lock()
            .upload_scripts
            .insert(arn.to_owned(), statuses.iter().cloned().collect());
        self
    }

    /// Makes every call to `operation` fail with HTTP 500.
    #[must_use]
    pub fn fail(self, operation: &str) -> Self {
        self.lock().failing.push(operation.to_owned());
        self
    }

    /// Makes created uploads come back without a destination URL.
    #[must_use]
    pub fn without_upload_url(self) -> Self {
        self.lock().omit_upload_url = true;
        self
    }

    /// Returns the pools currently stored by the fake.
    #[must_use]
    pub fn pools(&self) -> Vec<DevicePool> {
        self.lock().pools.clone()
    }

    /// Returns the pool-creation requests received so far.
    #[must_use]
    pub fn created_pools(&self) -> Vec<CreatePoolRequest> {
        self.lock().created_pools.clone()
    }

    /// Returns the pool-update requests received so far.
    #[must_use]
    pub fn updated_pools(&self) -> Vec<UpdatePoolRequest> {
        self.lock().updated_pools.clone()
    }

    /// Returns the upload-creation requests received so far.
    #[must_use]
    pub fn created_uploads(&self) -> Vec<CreateUploadRequest> {
        self.lock().created_uploads.clone()
    }

    /// Returns every upload handle queried for status, in call order.
    #[must_use]
    pub fn status_queries(&self) -> Vec<String> {
        self.lock().status_queries.clone()
    }

    fn list_devices_now(&self) -> Result<Vec<Device>, TransportError> {
        let state = self.lock();
        state.check("ListDevices")?;
        Ok(state.devices.clone())
    }

    fn list_pools_now(&self) -> Result<Vec<DevicePool>, TransportError> {
        let state = self.lock();
        state.check("ListDevicePools")?;
        Ok(state.pools.clone())
    }

    fn create_pool_now(&self, request: &CreatePoolRequest) -> Result<DevicePool, TransportError> {
        let mut state = self.lock();
        state.created_pools.push(request.clone());
        state.check("CreateDevicePool")?;
        let id = state.allocate_id();
        let pool = DevicePool {
            arn: format!("{}:devicepool/{id}", request.project_arn),
            name: request.name.clone(),
            description: request.description.clone(),
            rules: request.rules.clone(),
        };
        state.pools.push(pool.clone());
        Ok(pool)
    }

    fn update_pool_now(&self, request: &UpdatePoolRequest) -> Result<DevicePool, TransportError> {
        let mut state = self.lock();
        state.updated_pools.push(request.clone());
        state.check("UpdateDevicePool")?;
        let pool = DevicePool {
            arn: request.arn.clone(),
            name: request.name.clone(),
            description: request.description.clone(),
            rules: request.rules.clone(),
        };
        match state.pools.iter_mut().find(|stored| stored.arn == request.arn) {
            Some(stored) => stored.clone_from(&pool),
            None => state.pools.push(pool.clone()),
        }
        Ok(pool)
    }

    fn create_upload_now(
        &self,
        request: &CreateUploadRequest,
    ) -> Result<UploadJob, TransportError> {
        let mut state = self.lock();
        state.created_uploads.push(request.clone());
        state.check("CreateUpload")?;
        let id = state.allocate_id();
        let arn = format!("{}:upload/{id}", request.project_arn);
        let url = (!state.omit_upload_url).then(|| format!("https://blob.test/uploads/{id}"));
        let job = UploadJob {
            name: request.name.clone(),
            url,
            kind: Some(request.kind.clone()),
            ..UploadJob::new(arn.clone(), UploadStatus::Initialized)
        };
        state.uploads.insert(arn, job.clone());
        Ok(job)
    }

    fn get_upload_now(&self, arn: &str) -> Result<UploadJob, TransportError> {
        let mut state = self.lock();
        state.status_queries.push(arn.to_owned());
        state.check("GetUpload")?;
        let status = state.next_status(arn);
        let job = state
            .uploads
            .get(arn)
            .cloned()
            .unwrap_or_else(|| UploadJob::new(arn, UploadStatus::Initialized));
        Ok(UploadJob { status, ..job })
    }
}

impl Gateway for FakeGateway {
    fn list_devices(&self) -> GatewayFuture<'_, Vec<Device>> {
        Box::pin(future::ready(self.list_devices_now()))
    }

    fn list_device_pools<'a>(
        &'a self,
        _project_arn: &'a str,
    ) -> GatewayFuture<'a, Vec<DevicePool>> {
        Box::pin(future::ready(self.list_pools_now()))
    }

    fn create_device_pool<'a>(
        &'a self,
        request: &'a CreatePoolRequest,
    ) -> GatewayFuture<'a, DevicePool> {
        Box::pin(future::ready(self.create_pool_now(request)))
    }

    fn update_device_pool<'a>(
        &'a self,
        request: &'a UpdatePoolRequest,
    ) -> GatewayFuture<'a, DevicePool> {
        Box::pin(future::ready(self.update_pool_now(request)))
    }

    fn create_upload<'a>(
        &'a self,
        request: &'a CreateUploadRequest,
    ) -> GatewayFuture<'a, UploadJob> {
        Box::pin(future::ready(self.create_upload_now(request)))
    }

    fn get_upload<'a>(&'a self, arn: &'a str) -> GatewayFuture<'a, UploadJob> {
        Box::pin(future::ready(self.get_upload_now(arn)))
    }
}

#[derive(Debug, Default)]
struct BlobState {
    puts: Vec<(String, Vec<u8>)>,
    fail_status: Option<u16>,
}

/// [`BlobTransfer`] that records every `PUT` instead of sending it.
#[derive(Clone, Debug, Default)]
pub struct RecordingBlobTransfer {
    state: Arc<StdMutex<BlobState>>,
}

impl RecordingBlobTransfer {
    /// Creates a transfer that accepts every body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every transfer fail with the given HTTP status.
    #[must_use]
    pub fn failing_with(self, status: u16) -> Self {
        self.lock().fail_status = Some(status);
        self
    }

    /// Returns the `(url, body)` pairs received so far.
    #[must_use]
    pub fn puts(&self) -> Vec<(String, Vec<u8>)> {
        self.lock().puts.clone()
    }

    fn lock(&self) -> StdMutexGuard<'_, BlobState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn put_now(&self, url: &str, body: Vec<u8>) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.puts.push((url.to_owned(), body));
        match state.fail_status {
            Some(status) => Err(TransportError::Status {
                operation: String::from("blob upload"),
                status,
                body: String::from(SIMULATED_FAILURE),
            }),
            None => Ok(()),
        }
    }
}

impl BlobTransfer for RecordingBlobTransfer {
    fn put<'a>(&'a self, url: &'a str, body: Vec<u8>) -> GatewayFuture<'a, ()> {
        Box::pin(future::ready(self.put_now(url, body)))
    }
}

/// Scripted command runner that returns pre-seeded outputs in FIFO order.
///
/// When the script runs dry the runner reports a spawn failure, which
/// mimics a missing executable.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRunner {
    responses: Rc<RefCell<VecDeque<CommandOutput>>>,
    invocations: Rc<RefCell<Vec<CommandInvocation>>>,
}

/// Records a single invocation made through [`ScriptedRunner`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandInvocation {
    /// Working directory the command ran in.
    pub dir: Utf8PathBuf,
    /// Program name as passed to the runner.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<OsString>,
}

impl CommandInvocation {
    /// Returns a shell-like command string for assertions.
    #[must_use]
    pub fn command_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(
            self.args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }
}

impl ScriptedRunner {
    /// Creates a new runner with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.borrow().clone()
    }

    /// Pushes a successful exit status with no output.
    pub fn push_success(&self) {
        self.push_output(Some(0), "", "");
    }

    /// Pushes a failing exit code with stderr text.
    pub fn push_failure(&self, code: i32) {
        self.push_output(Some(code), "", SIMULATED_FAILURE);
    }

    /// Pushes an explicit command output response.
    pub fn push_output(
        &self,
        code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) {
        self.responses.borrow_mut().push_back(CommandOutput {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        });
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        dir: &Utf8Path,
        program: &str,
        args: &[OsString],
    ) -> Result<CommandOutput, RepoError> {
        self.invocations.borrow_mut().push(CommandInvocation {
            dir: dir.to_path_buf(),
            program: program.to_owned(),
            args: args.to_vec(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| RepoError::Spawn {
                program: program.to_owned(),
                message: String::from("no scripted response available"),
            })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets and removes environment variables while holding a global mutex.
    ///
    /// Keys listed in `unset` are removed for the guard's lifetime so that
    /// values from the developer's shell cannot leak into assertions.
    pub async fn set_vars(pairs: &[(&str, &str)], unset: &[&str]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs
                    .iter()
                    .map(|(key, _)| *key)
                    .chain(unset.iter().copied())
                    .all(|key| seen.insert(key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len() + unset.len());
        for (key, value) in pairs {
            previous.push(((*key).to_owned(), env::var_os(key)));
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
        }
        for key in unset {
            previous.push(((*key).to_owned(), env::var_os(key)));
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::remove_var(key) };
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in self.previous.iter().rev() {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
