use std::sync::Arc;

use axum::{
    extract::State,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use warden_auth::TokenValidator;
use warden_core::DomainError;

use crate::app::errors::ApiError;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenValidator>,
}

/// Resolve the bearer token into an [`warden_auth::Identity`] request extension.
///
/// Every failure collapses to a 401; the reason is only logged.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    // A non-ASCII header is treated like a missing one.
    let carrier = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity = match warden_auth::resolve(carrier, state.tokens.as_ref(), Utc::now()) {
        Ok(identity) => identity,
        Err(err) => {
            tracing::debug!(error = %err, path = %req.uri().path(), "rejected request");
            return ApiError(DomainError::Unauthenticated).into_response();
        }
    };

    req.extensions_mut().insert(identity);
    next.run(req).await
}
