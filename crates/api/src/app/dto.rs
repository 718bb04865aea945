//! Response bodies owned by the transport layer.
//!
//! Request bodies deserialize straight into the `warden-accounts` input types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use warden_auth::IssuedToken;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for LoginResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            token_type: "Bearer",
            expires_at: issued.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}
