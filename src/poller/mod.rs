//! Bounded polling of upload jobs until they finish processing.
//!
//! The poller owns the retry loop but not the status lookup: callers supply
//! an async accessor, which keeps the loop independent of any particular
//! gateway. Each tick queries every job in the order given and resolves
//! fully before the next tick is scheduled.

use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::task::yield_now;
use tokio::time::sleep;

use crate::upload::UploadStatus;

/// Default overall deadline for upload processing.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// Default pause between polling ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Deadline and cadence for [`wait_for_completion`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollSettings {
    /// Time budget measured from the first tick. The first tick always runs.
    pub timeout: Duration,
    /// Pause between ticks. Zero is permitted: the loop then yields to the
    /// runtime between ticks instead of sleeping.
    pub interval: Duration,
}

impl PollSettings {
    /// Creates settings from explicit durations.
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Creates settings from millisecond counts. Negative values are
    /// treated as zero.
    #[must_use]
    pub fn from_millis(timeout_ms: i64, interval_ms: i64) -> Self {
        Self::new(clamp_millis(timeout_ms), clamp_millis(interval_ms))
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

fn clamp_millis(value: i64) -> Duration {
    Duration::from_millis(u64::try_from(value).unwrap_or(0))
}

/// Errors raised while waiting for jobs to complete.
#[derive(Debug, Error)]
pub enum PollError<E>
where
    E: std::error::Error + 'static,
{
    /// The status accessor failed; polling stops without retrying.
    #[error("status query for job {job_id} failed: {source}")]
    Transport {
        /// Job whose status could not be read.
        job_id: String,
        /// Error returned by the accessor.
        #[source]
        source: E,
    },
    /// A job reached its terminal failure state.
    #[error("job {job_id} failed")]
    JobFailed {
        /// First failing job in the order supplied by the caller.
        job_id: String,
    },
    /// The deadline passed while jobs were still in progress.
    #[error("timed out after {waited:?} waiting for jobs: {}", .pending.join(", "))]
    Timeout {
        /// Jobs that had not succeeded on the final tick.
        pending: Vec<String>,
        /// Time elapsed since the first tick.
        waited: Duration,
    },
}

/// Polls `status_of` for every job until all succeed, one fails, or the
/// deadline in `settings` passes.
///
/// The first tick is never subject to the deadline. An empty `job_ids`
/// slice succeeds without querying anything.
///
/// # Errors
///
/// Returns [`PollError::Transport`] as soon as the accessor fails,
/// [`PollError::JobFailed`] as soon as a job reports
/// [`UploadStatus::Failed`], and [`PollError::Timeout`] when jobs remain in
/// progress after the deadline.
pub async fn wait_for_completion<F, Fut, E>(
    settings: PollSettings,
    job_ids: &[String],
    mut status_of: F,
) -> Result<(), PollError<E>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<UploadStatus, E>>,
    E: std::error::Error + 'static,
{
    if job_ids.is_empty() {
        return Ok(());
    }

    let started = Instant::now();
    loop {
        let pending = tick(job_ids, &mut status_of).await?;
        if pending.is_empty() {
            return Ok(());
        }

        let waited = started.elapsed();
        if waited > settings.timeout {
            return Err(PollError::Timeout { pending, waited });
        }
        if settings.interval.is_zero() {
            yield_now().await;
        } else {
            sleep(settings.interval).await;
        }
    }
}

async fn tick<F, Fut, E>(job_ids: &[String], status_of: &mut F) -> Result<Vec<String>, PollError<E>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<UploadStatus, E>>,
    E: std::error::Error + 'static,
{
    let mut pending = Vec::new();
    for job_id in job_ids {
        let status = status_of(job_id.clone())
            .await
            .map_err(|source| PollError::Transport {
                job_id: job_id.clone(),
                source,
            })?;
        match status {
            UploadStatus::Succeeded => {}
            UploadStatus::Failed => {
                return Err(PollError::JobFailed {
                    job_id: job_id.clone(),
                });
            }
            UploadStatus::Initialized | UploadStatus::Processing | UploadStatus::Other(_) => {
                pending.push(job_id.clone());
            }
        }
    }
    Ok(pending)
}
