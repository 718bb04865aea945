use axum::{
    Router,
    routing::{get, patch},
};

pub mod auth;
pub mod common;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints (mounted under `/v1`).
pub fn router() -> Router {
    Router::new()
        .route("/me", get(system::me))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/:id/password", patch(users::change_password))
}
