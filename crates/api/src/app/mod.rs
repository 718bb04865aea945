use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use tower::ServiceBuilder;

use warden_auth::TokenValidator;

use crate::middleware;
use crate::settings::Settings;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, StartupError};

/// Build the router from validated settings over a fresh in-memory store.
pub fn build_app(settings: &Settings) -> Result<Router, StartupError> {
    let services = Arc::new(services::build_services(settings)?);
    Ok(router(services))
}

/// Mount public and protected routes over already wired services.
pub fn router(services: Arc<AppServices>) -> Router {
    let tokens: Arc<dyn TokenValidator> = services.tokens.clone();
    let auth_state = middleware::AuthState { tokens };

    // Protected routes: require a valid bearer token.
    let protected = Router::new().nest("/v1", routes::router()).layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(services.clone())),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/login", post(routes::auth::login))
        .layer(Extension(services))
        .merge(protected)
}
