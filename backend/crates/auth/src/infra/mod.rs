//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod asset_storage;
pub mod memory;
pub mod postgres;

pub use asset_storage::HttpAssetStorage;
pub use memory::{InMemoryAssetStorage, InMemoryUserRepository};
pub use postgres::PgUserRepository;
