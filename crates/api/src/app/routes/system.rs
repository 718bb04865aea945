use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode};

use warden_accounts::User;
use warden_auth::Identity;

use crate::app::errors::ApiResult;
use crate::app::routes::common::blocking;
use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /v1/me - The caller's own record
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<User>> {
    let user = blocking(move || services.accounts.me(&identity)).await?;
    Ok(Json(user))
}
