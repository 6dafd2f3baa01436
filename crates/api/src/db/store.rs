//! Key-value store abstraction.
//!
//! Repositories talk to the store only through [`KeyValueStore`], so the Redis
//! client can be swapped for the in-process [`MemoryStore`](super::MemoryStore)
//! in tests and local runs.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a key-value store call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The call did not complete within the configured timeout.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// Redis reported an error.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A key holds a value of a different type than the call expects.
    #[error("wrong value type at key {0}")]
    WrongType(String),
}

impl StoreError {
    /// Whether the store itself is unreachable (as opposed to a bad command).
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Redis(e) => {
                e.is_timeout()
                    || e.is_io_error()
                    || e.is_connection_dropped()
                    || e.is_connection_refusal()
            }
            Self::WrongType(_) => false,
        }
    }
}

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Set the given fields of a hash, leaving other fields untouched.
    HashSet {
        key: String,
        fields: Vec<(String, String)>,
    },
    /// Set a string value.
    Set { key: String, value: String },
    /// Append a value to the tail of a list.
    ListPush { key: String, value: String },
}

/// Writes applied together as one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Add a hash write.
    #[must_use]
    pub fn hash_set(mut self, key: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        self.ops.push(WriteOp::HashSet {
            key: key.into(),
            fields,
        });
        self
    }

    /// Add a string write.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Add a list append.
    #[must_use]
    pub fn list_push(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ops.push(WriteOp::ListPush {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// The queued writes, in order.
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Primitive operations the storage layer needs from a key-value store.
///
/// Every method is a single round-trip. Methods documented as atomic must not
/// interleave with concurrent callers.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Check that the store answers.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Atomically increment an integer counter and return the new value.
    /// A missing counter starts at zero.
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// Whether any value exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Read a string value.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Read several string values; the result is aligned with `keys`.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError>;

    /// Atomically set a string value only if `key` is unused.
    /// Returns false and leaves the existing value alone otherwise.
    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError>;

    /// Read all fields of a hash. A missing key yields an empty map.
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    /// Read several hashes; the result is aligned with `keys`.
    async fn hash_get_all_many(
        &self,
        keys: &[String],
    ) -> Result<Vec<HashMap<String, String>>, StoreError>;

    /// Atomically merge fields into an existing hash.
    /// Returns false without writing anything if the hash does not exist.
    async fn hash_update_existing(
        &self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<bool, StoreError>;

    /// Read a whole list, head to tail.
    async fn list_range(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Length of a list. A missing key has length zero.
    async fn list_len(&self, key: &str) -> Result<usize, StoreError>;

    /// Apply all writes of a batch atomically.
    async fn apply(&self, batch: &WriteBatch) -> Result<(), StoreError>;

    /// Atomically delete `key` and remove every occurrence of `member` from
    /// the list `index`. Returns whether `key` existed.
    async fn delete_indexed(&self, key: &str, index: &str, member: &str)
    -> Result<bool, StoreError>;
}
