//! `UserStore` implementations.
//!
//! The trait itself lives in `warden-accounts` so the operations crate owns
//! the contract; adapters here only satisfy it.

pub mod in_memory;

pub use in_memory::InMemoryUserStore;
