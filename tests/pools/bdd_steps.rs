//! BDD step definitions for device pool synchronisation.

use devicefarm::{PoolSync, pool_matches};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

use super::test_helpers::{PROJECT, PoolContext, PoolOutcome, device_list, stored_pool};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a project without device pools")]
fn project_without_pools(pool_context: PoolContext) -> PoolContext {
    pool_context
}

#[given("a project with pool \"{name}\" selecting \"{devices}\"")]
fn project_with_pool(mut pool_context: PoolContext, name: String, devices: String) -> PoolContext {
    let pool = stored_pool(name.trim(), &device_list(&devices));
    pool_context.gateway = pool_context.gateway.with_pools(vec![pool]);
    pool_context
}

#[given("a project whose pool listing fails")]
fn pool_listing_fails(mut pool_context: PoolContext) -> PoolContext {
    pool_context.gateway = pool_context.gateway.fail("ListDevicePools");
    pool_context
}

#[when("I ensure pool \"{name}\" selects \"{devices}\"")]
fn ensure_pool(
    mut pool_context: PoolContext,
    name: String,
    devices: String,
) -> Result<PoolContext, StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let client = pool_context.client();
    let identifiers = device_list(&devices);
    let result = runtime.block_on(async move {
        client
            .ensure_device_pool(PROJECT, name.trim(), &identifiers)
            .await
    });

    pool_context.outcome = Some(match result {
        Ok(sync) => PoolOutcome::Synced(sync),
        Err(err) => PoolOutcome::Failed(err.to_string()),
    });
    Ok(pool_context)
}

#[then("the pool is reported as \"{action}\"")]
fn pool_reported_as(pool_context: &PoolContext, action: String) -> Result<(), StepError> {
    let Some(outcome) = pool_context.outcome.as_ref() else {
        return Err(StepError::Assertion(String::from("missing outcome")));
    };
    let actual = match outcome {
        PoolOutcome::Synced(PoolSync::Created(_)) => "created",
        PoolOutcome::Synced(PoolSync::Updated(_)) => "updated",
        PoolOutcome::Synced(PoolSync::Unchanged(_)) => "unchanged",
        PoolOutcome::Failed(err) => {
            return Err(StepError::Assertion(format!("sync failed: {err}")));
        }
    };
    if actual == action.trim() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {action}, got {actual}"
        )))
    }
}

#[then("the stored pool \"{name}\" selects \"{devices}\"")]
fn stored_pool_selects(
    pool_context: &PoolContext,
    name: String,
    devices: String,
) -> Result<(), StepError> {
    let pools = pool_context.gateway.pools();
    let Some(pool) = pools.iter().find(|pool| pool.name == name.trim()) else {
        return Err(StepError::Assertion(format!("pool {name} was not stored")));
    };
    if pool_matches(pool, &device_list(&devices)) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "pool {name} has unexpected rules: {:?}",
            pool.rules
        )))
    }
}

#[then("no pool changes were sent")]
fn no_pool_changes(pool_context: &PoolContext) -> Result<(), StepError> {
    let created = pool_context.gateway.created_pools();
    let updated = pool_context.gateway.updated_pools();
    if created.is_empty() && updated.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "unexpected changes: created {created:?}, updated {updated:?}"
        )))
    }
}

#[then("the sync fails mentioning \"{text}\"")]
fn sync_fails_mentioning(pool_context: &PoolContext, text: String) -> Result<(), StepError> {
    match pool_context.outcome.as_ref() {
        Some(PoolOutcome::Failed(err)) if err.contains(text.trim()) => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected failure mentioning {text}, got {other:?}"
        ))),
    }
}
