use std::time::Duration;

use crate::models::UsageRecord;
use crate::trait_client::PersistenceClient;

pub const USAGE_LOG_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 100;

/// Write a usage row, retrying with exponential backoff.
///
/// Usage rows are off the critical path: the final failure is logged and
/// reported as `false` instead of being returned as an error.
pub async fn log_usage_with_retry(
    client: &dyn PersistenceClient,
    record: UsageRecord,
    max_attempts: u32,
) -> bool {
    let max_attempts = max_attempts.max(1);

    for attempt in 0..max_attempts {
        if attempt > 0 {
            let delay = Duration::from_millis(BASE_DELAY_MS * 2_u64.pow(attempt));
            tokio::time::sleep(delay).await;
        }

        match client.insert_usage(record.clone()).await {
            Ok(()) => return true,
            Err(e) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = max_attempts,
                    user_id = %record.user_id,
                    thread_id = %record.thread_id,
                    error = %e,
                    "Usage logging failed"
                );
            }
        }
    }

    tracing::error!(
        user_id = %record.user_id,
        thread_id = %record.thread_id,
        total_tokens = record.total_tokens,
        "Giving up on usage logging"
    );
    false
}
