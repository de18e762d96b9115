/**
 * Expiration Sweep
 *
 * Runs once at startup and then every `sweep_interval_secs`. Each run:
 *
 * 1. Sets the `is_expired` soft marker on every post past its expiry
 * 2. Lists those posts and removes each through the cascade
 *
 * A cascade failure for one post is logged and counted, and the sweep
 * moves on to the next. A failure of the sweep as a whole is logged and
 * the timer keeps ticking.
 */

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::backend::expiration::cascade::remove_post;
use crate::backend::expiration::policy::ExpirationPolicy;
use crate::backend::store::{Store, StoreResult};

/// Outcome of one sweep run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Posts newly given the soft marker
    pub marked: u64,
    /// Expired posts found
    pub expired: usize,
    /// Posts whose cascade completed
    pub removed: usize,
    /// Posts whose cascade failed and will be retried next run
    pub failed: usize,
}

/// Run a single sweep at `now`
pub async fn run_sweep(store: &dyn Store, now: DateTime<Utc>) -> StoreResult<SweepReport> {
    let marked = store.mark_expired(now).await?;
    let expired = store.list_expired_posts(now).await?;

    let mut report = SweepReport {
        marked,
        expired: expired.len(),
        ..SweepReport::default()
    };

    for post in &expired {
        match remove_post(store, post).await {
            Ok(_) => report.removed += 1,
            Err(e) => {
                report.failed += 1;
                tracing::error!("Failed to remove expired post {}: {}", post.id, e);
            }
        }
    }

    Ok(report)
}

/// Give stored posts without an expiry the policy's fixed lifetime
///
/// A no-op unless the policy enforces a fixed window.
pub async fn backfill_missing_expiry(
    store: &dyn Store,
    policy: &ExpirationPolicy,
) -> StoreResult<u64> {
    let duration = match policy.backfill_duration() {
        Some(duration) => duration,
        None => return Ok(0),
    };
    let window = match duration.window() {
        Some(window) => window,
        None => return Ok(0),
    };
    let updated = store.backfill_expiry(window, duration).await?;
    if updated > 0 {
        tracing::info!(
            "Backfilled expiry on {} posts ({} after creation)",
            updated,
            duration.as_str()
        );
    }
    Ok(updated)
}

/// Start the periodic sweep
///
/// The first tick fires immediately, which is the startup run.
pub fn spawn_sweeper(store: Arc<dyn Store>, interval: StdDuration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match run_sweep(store.as_ref(), Utc::now()).await {
                Ok(report) if report.expired > 0 => {
                    tracing::info!(
                        "Expiration sweep: {} expired, {} removed, {} failed",
                        report.expired,
                        report.removed,
                        report.failed
                    );
                }
                Ok(_) => tracing::debug!("Expiration sweep found nothing to remove"),
                Err(e) => tracing::error!("Expiration sweep failed: {}", e),
            }
        }
    })
}
