//! User administration routes.
//!
//! Handlers only translate HTTP into operation calls; every authorization
//! decision happens inside `warden-accounts`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
};

use warden_accounts::{NewAccount, PasswordChange, User, UserUpdate};
use warden_auth::Identity;

use crate::app::dto::ListResponse;
use crate::app::errors::ApiResult;
use crate::app::routes::common::{blocking, parse_user_id};
use crate::app::services::AppServices;

/// POST /v1/users - Create an account
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    body: Result<Json<NewAccount>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(account) = body?;
    let user = blocking(move || services.accounts.create_account(&identity, account)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /v1/users - Users visible to the caller
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<ListResponse<User>>> {
    let items = blocking(move || services.accounts.list_users(&identity)).await?;
    Ok(Json(ListResponse { items }))
}

/// GET /v1/users/:id - A single user
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_user_id(&id)?;
    let user = blocking(move || services.accounts.view_user(&identity, id)).await?;
    Ok(Json(user))
}

/// PATCH /v1/users/:id - Edit names or email
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    body: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let id = parse_user_id(&id)?;
    let Json(update) = body?;
    let user = blocking(move || services.accounts.update_user(&identity, id, update)).await?;
    Ok(Json(user))
}

/// DELETE /v1/users/:id - Remove an account
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_user_id(&id)?;
    blocking(move || services.accounts.delete_user(&identity, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /v1/users/:id/password - Change a password
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    body: Result<Json<PasswordChange>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let id = parse_user_id(&id)?;
    let Json(change) = body?;
    blocking(move || services.accounts.change_password(&identity, id, change)).await?;
    Ok(StatusCode::NO_CONTENT)
}
