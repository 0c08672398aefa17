//! Read-after-write workaround for task lookups.
//!
//! A freshly inserted task may not be visible to the next read on a
//! lagging replica, so single-task fetches retry a few times on
//! not-found before giving up. Delays grow linearly: `attempt * base_delay`.

use std::time::Duration;

use log::debug;

use crate::store::{self, EntityStore, Record, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub const fn once() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the given (1-based) failed attempt. Saturates
    /// at `Duration::MAX`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Fetch one record, retrying only when the row is not found.
pub async fn get_with_retry<T: Record>(
    store: &dyn EntityStore,
    id: i64,
    policy: &RetryPolicy,
) -> StoreResult<T> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match store::get::<T>(store, id).await {
            Err(e) if e.is_not_found() && attempt < attempts => {
                let delay = policy.delay_after(attempt);
                debug!(
                    "{} {} not visible yet (attempt {}/{}), retrying in {:?}",
                    T::TABLE.entity_name(),
                    id,
                    attempt,
                    attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
