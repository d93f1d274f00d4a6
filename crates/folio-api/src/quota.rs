use folio_persist::PersistenceClient;

use crate::error::{ApiError, ApiResult};

/// Refuse a user whose recorded usage has reached `limit`
pub async fn ensure_within_quota(
    persist: &dyn PersistenceClient,
    user_id: &str,
    limit: u64,
) -> ApiResult<()> {
    let used = persist.total_tokens(user_id).await?;
    if used >= limit {
        tracing::warn!(user_id = user_id, used = used, limit = limit, "Token quota exhausted");
        return Err(ApiError::QuotaExceeded { used, limit });
    }
    Ok(())
}
