use warden_core::{DomainError, DomainResult, UserId};

use crate::app::errors::ApiResult;

/// Run a blocking operation (store IO, bcrypt) off the async workers.
pub async fn blocking<T, F>(op: F) -> ApiResult<T>
where
    F: FnOnce() -> DomainResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| DomainError::internal(format!("worker task failed: {e}")))?;
    Ok(result?)
}

pub fn parse_user_id(raw: &str) -> DomainResult<UserId> {
    raw.parse()
}
