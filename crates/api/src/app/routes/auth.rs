use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
};

use warden_accounts::Credentials;

use crate::app::dto::LoginResponse;
use crate::app::errors::ApiResult;
use crate::app::routes::common::blocking;
use crate::app::services::AppServices;

/// POST /login - Exchange username/password for a bearer token
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(credentials) = body?;
    let issued = blocking(move || services.login.authenticate(&credentials)).await?;
    Ok(Json(LoginResponse::from(issued)))
}
