//! Infrastructure layer: store adapters behind the `warden-accounts` traits.

pub mod user_store;

pub use user_store::InMemoryUserStore;
