//! BDD scenarios for device pool synchronisation.

use rstest_bdd_macros::scenario;

use super::test_helpers::{PoolContext, pool_context};

#[scenario(
    path = "tests/features/device_pools.feature",
    name = "Create a pool that does not exist yet"
)]
fn scenario_create_missing_pool(pool_context: PoolContext) {
    let _ = pool_context;
}

#[scenario(
    path = "tests/features/device_pools.feature",
    name = "Leave a matching pool untouched"
)]
fn scenario_leave_matching_pool(pool_context: PoolContext) {
    let _ = pool_context;
}

#[scenario(
    path = "tests/features/device_pools.feature",
    name = "Update a pool whose devices drifted"
)]
fn scenario_update_drifted_pool(pool_context: PoolContext) {
    let _ = pool_context;
}

#[scenario(
    path = "tests/features/device_pools.feature",
    name = "Surface pool listing failures"
)]
fn scenario_surface_listing_failures(pool_context: PoolContext) {
    let _ = pool_context;
}
