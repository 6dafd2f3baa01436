//! Storage layer on top of a key-value store.
//!
//! # Store: Redis
//!
//! All records live in one Redis database. Ids come from per-entity counters
//! and every record is reachable from an index list, so listings never need
//! a key scan.
//!
//! ## Keys
//!
//! - `icecream_highest_id` - Ice-cream id counter
//! - `icecream:{id}` - Ice-cream hash (`id`, `name`, `price`, `weight`, `img_url`)
//! - `icecream_ids` - Ice-cream ids in creation order
//! - `user:{login}` - User record (JSON, written once)
//! - `order_highest_id` - Order id counter
//! - `order:{id}` - Order record (JSON, immutable)
//! - `order_ids` - Order ids in creation order
//! - `user:{login}:orders` - Order ids of one user in creation order
//! - `health` - Startup counter
//!
//! Multi-key writes go through [`WriteBatch`] so they are applied atomically.

pub mod ice_creams;
pub mod memory;
pub mod orders;
pub mod redis;
pub mod store;
pub mod users;

use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;

pub use ice_creams::IceCreamRepository;
pub use memory::MemoryStore;
pub use orders::OrderRepository;
pub use self::redis::RedisStore;
pub use store::{KeyValueStore, StoreError, WriteBatch, WriteOp};
pub use users::UserRepository;

use crate::config::StoreConfig;
use crate::services::images::ImageError;

/// Store URL scheme selecting the in-process store.
pub const MEMORY_URL_SCHEME: &str = "memory://";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Key-value store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate login).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Mirroring a product image failed.
    #[error("image error: {0}")]
    Image(#[from] ImageError),
}

/// Store key builders.
pub mod keys {
    use icecream_core::{IceCreamId, Login, OrderId};

    /// Ice-cream ids in creation order.
    pub const ICE_CREAM_INDEX: &str = "icecream_ids";
    /// Order ids in creation order.
    pub const ORDER_INDEX: &str = "order_ids";
    /// Counter bumped once per process start.
    pub const HEALTH: &str = "health";

    /// Id counter for an entity namespace.
    #[must_use]
    pub fn counter(namespace: &str) -> String {
        format!("{namespace}_highest_id")
    }

    #[must_use]
    pub fn ice_cream(id: IceCreamId) -> String {
        format!("{}:{id}", IceCreamId::NAMESPACE)
    }

    #[must_use]
    pub fn user(login: &Login) -> String {
        format!("user:{login}")
    }

    /// Order ids of one user. Logins cannot contain `:`, so this never
    /// collides with a user key.
    #[must_use]
    pub fn user_orders(login: &Login) -> String {
        format!("user:{login}:orders")
    }

    #[must_use]
    pub fn order(id: OrderId) -> String {
        format!("{}:{id}", OrderId::NAMESPACE)
    }
}

/// Connect to the store named by `config.url`.
///
/// A `memory://` URL selects an empty in-process store; anything else is
/// handed to the Redis client.
///
/// # Errors
///
/// Returns `StoreError` if the Redis connection cannot be established.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    if config.url.expose_secret().starts_with(MEMORY_URL_SCHEME) {
        tracing::warn!("Using in-memory store; data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }
    Ok(Arc::new(RedisStore::connect(config).await?))
}

/// Take the next id from the counter of `namespace`.
///
/// Ids start at 1 and are never reused, even after deletes.
///
/// # Errors
///
/// Returns `RepositoryError::Store` if the counter cannot be incremented.
pub async fn next_id(store: &dyn KeyValueStore, namespace: &str) -> Result<i64, RepositoryError> {
    Ok(store.incr(&keys::counter(namespace)).await?)
}

/// Bump the startup counter and return its new value.
///
/// # Errors
///
/// Returns `RepositoryError::Store` if the store is unreachable.
pub async fn record_startup(store: &dyn KeyValueStore) -> Result<i64, RepositoryError> {
    Ok(store.incr(keys::HEALTH).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use icecream_core::{IceCreamId, Login, OrderId};
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_keys() {
        let login = Login::parse("bestboss").unwrap();
        assert_eq!(keys::counter("icecream"), "icecream_highest_id");
        assert_eq!(keys::ice_cream(IceCreamId::new(7)), "icecream:7");
        assert_eq!(keys::order(OrderId::new(3)), "order:3");
        assert_eq!(keys::user(&login), "user:bestboss");
        assert_eq!(keys::user_orders(&login), "user:bestboss:orders");
    }

    #[tokio::test]
    async fn test_next_id_is_per_namespace() {
        let store = MemoryStore::new();
        assert_eq!(next_id(&store, "icecream").await.unwrap(), 1);
        assert_eq!(next_id(&store, "icecream").await.unwrap(), 2);
        assert_eq!(next_id(&store, "order").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_connect_memory_url() {
        let config = StoreConfig {
            url: SecretString::from("memory://"),
            timeout: Duration::from_millis(100),
            retries: 0,
        };
        let store = connect(&config).await.unwrap();
        store.ping().await.unwrap();
        assert_eq!(record_startup(store.as_ref()).await.unwrap(), 1);
    }
}
