//! Shared fixtures for device pool BDD scenarios.

use devicefarm::test_support::{FakeGateway, RecordingBlobTransfer};
use devicefarm::{DeviceFarm, DevicePool, PoolSync, build_rules};
use rstest::fixture;

pub const PROJECT: &str = "arn:aws:devicefarm:us-west-2:42:project:pools";

#[derive(Clone, Debug)]
pub enum PoolOutcome {
    Synced(PoolSync),
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct PoolContext {
    pub gateway: FakeGateway,
    pub outcome: Option<PoolOutcome>,
}

#[fixture]
pub fn pool_context() -> PoolContext {
    PoolContext {
        gateway: FakeGateway::new(),
        outcome: None,
    }
}

impl PoolContext {
    pub fn client(&self) -> DeviceFarm<FakeGateway, RecordingBlobTransfer> {
        DeviceFarm::new(self.gateway.clone(), RecordingBlobTransfer::new())
    }
}

/// Splits a space-separated device list from a step argument.
pub fn device_list(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_owned).collect()
}

pub fn stored_pool(name: &str, devices: &[String]) -> DevicePool {
    DevicePool {
        arn: format!("{PROJECT}:devicepool/{name}"),
        name: name.to_owned(),
        description: None,
        rules: build_rules(devices),
    }
}
