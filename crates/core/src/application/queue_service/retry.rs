// Bounded retry for transactions that lose a write race

use crate::error::{AppError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const MAX_ATTEMPTS: u32 = 8;
const BASE_BACKOFF_MS: u64 = 20;

/// Re-run `op` while it fails with `TransactionConflict`, up to a fixed
/// attempt budget. Position races are expected under normal load and must
/// not leak to callers; only a conflict that survives the whole budget
/// surfaces as a transient failure.
///
/// Backoff grows linearly with a small per-key jitter so simultaneous
/// losers do not retry in lockstep.
pub(crate) async fn with_conflict_retry<T, F, Fut>(op_name: &str, key: &str, op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let jitter_ms = u64::from(key.bytes().map(u32::from).sum::<u32>() % 17);
    let mut attempt: u32 = 1;

    loop {
        match op().await {
            Err(AppError::TransactionConflict(reason)) if attempt < MAX_ATTEMPTS => {
                debug!(
                    op = op_name,
                    key = key,
                    attempt = attempt,
                    reason = %reason,
                    "Transaction conflict, retrying"
                );
                tokio::time::sleep(Duration::from_millis(
                    BASE_BACKOFF_MS * u64::from(attempt) + jitter_ms,
                ))
                .await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
