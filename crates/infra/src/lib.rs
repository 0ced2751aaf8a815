//! Infrastructure layer: row stores, typed repositories, identity resolution, config.

pub mod config;
pub mod identity;
pub mod repository;
pub mod store;

pub use config::{ConfigError, Persistence, Settings};
pub use identity::IdentityResolver;
pub use store::{InMemoryStore, PostgresStore, Query, Store, StoreError};
