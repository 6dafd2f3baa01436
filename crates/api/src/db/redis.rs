//! Redis-backed [`KeyValueStore`].
//!
//! A single [`ConnectionManager`] is shared by all requests; it multiplexes
//! commands over one connection and reconnects on its own. Every call is
//! bounded by the configured store timeout.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client, RedisResult, Script};
use secrecy::ExposeSecret;

use super::store::{KeyValueStore, StoreError, WriteBatch, WriteOp};
use crate::config::StoreConfig;

/// Merge fields into a hash only if the hash already exists.
const UPDATE_EXISTING_LUA: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return 1
";

/// Redis implementation of [`KeyValueStore`].
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
    timeout: Duration,
    update_existing: Script,
}

impl RedisStore {
    /// Open a managed connection to Redis.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Redis` if the URL is invalid or the first
    /// connection cannot be established.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let manager_config = ConnectionManagerConfig::new()
            .set_number_of_retries(config.retries)
            .set_connection_timeout(config.timeout);

        let client = Client::open(config.url.expose_secret())?;
        let manager = client
            .get_connection_manager_with_config(manager_config)
            .await?;

        Ok(Self {
            manager,
            timeout: config.timeout,
            update_existing: Script::new(UPDATE_EXISTING_LUA),
        })
    }

    /// Run a Redis call under the store timeout.
    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = RedisResult<T>> + Send,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut con = self.manager.clone();
        let _: String = self
            .bounded(redis::cmd("PING").query_async(&mut con))
            .await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(con.incr(key, 1)).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(con.exists(key)).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(con.get(key)).await
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut con = self.manager.clone();
        self.bounded(con.mget(keys)).await
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(con.set_nx(key, value)).await
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(con.hgetall(key)).await
    }

    async fn hash_get_all_many(
        &self,
        keys: &[String],
    ) -> Result<Vec<HashMap<String, String>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.hgetall(key);
        }
        let mut con = self.manager.clone();
        self.bounded(pipe.query_async(&mut con)).await
    }

    async fn hash_update_existing(
        &self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<bool, StoreError> {
        if fields.is_empty() {
            return self.exists(key).await;
        }
        let mut invocation = self.update_existing.key(key);
        for (field, value) in fields {
            invocation.arg(field).arg(value);
        }
        let mut con = self.manager.clone();
        let updated: i64 = self.bounded(invocation.invoke_async(&mut con)).await?;
        Ok(updated == 1)
    }

    async fn list_range(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(con.lrange(key, 0, -1)).await
    }

    async fn list_len(&self, key: &str) -> Result<usize, StoreError> {
        let mut con = self.manager.clone();
        self.bounded(con.llen(key)).await
    }

    async fn apply(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        pipe.atomic();
        for op in batch.ops() {
            match op {
                WriteOp::HashSet { key, fields } => {
                    pipe.hset_multiple(key, fields.as_slice()).ignore();
                }
                WriteOp::Set { key, value } => {
                    pipe.set(key, value).ignore();
                }
                WriteOp::ListPush { key, value } => {
                    pipe.rpush(key, value).ignore();
                }
            }
        }
        let mut con = self.manager.clone();
        self.bounded(pipe.query_async::<()>(&mut con)).await
    }

    async fn delete_indexed(
        &self,
        key: &str,
        index: &str,
        member: &str,
    ) -> Result<bool, StoreError> {
        let mut pipe = redis::pipe();
        pipe.atomic().del(key).lrem(index, 0, member);
        let mut con = self.manager.clone();
        let (deleted, _removed): (i64, i64) = self.bounded(pipe.query_async(&mut con)).await?;
        Ok(deleted > 0)
    }
}
