//! In-process key-value store.
//!
//! Used by tests and by local runs started with a `memory://` store URL.
//! Everything lives behind one async mutex, so every call is atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::store::{KeyValueStore, StoreError, WriteBatch, WriteOp};

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    List(Vec<String>),
}

/// A [`KeyValueStore`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::WrongType(key.to_string())
}

fn read_str<'a>(data: &'a HashMap<String, Value>, key: &str) -> Result<Option<&'a String>, StoreError> {
    match data.get(key) {
        None => Ok(None),
        Some(Value::Str(s)) => Ok(Some(s)),
        Some(_) => Err(wrong_type(key)),
    }
}

fn read_hash(data: &HashMap<String, Value>, key: &str) -> Result<HashMap<String, String>, StoreError> {
    match data.get(key) {
        None => Ok(HashMap::new()),
        Some(Value::Hash(h)) => Ok(h.clone()),
        Some(_) => Err(wrong_type(key)),
    }
}

fn read_list<'a>(data: &'a HashMap<String, Value>, key: &str) -> Result<&'a [String], StoreError> {
    match data.get(key) {
        None => Ok(&[]),
        Some(Value::List(l)) => Ok(l.as_slice()),
        Some(_) => Err(wrong_type(key)),
    }
}

/// Check a whole batch against current types so a failing op cannot leave
/// the batch half applied.
fn check_batch(data: &HashMap<String, Value>, batch: &WriteBatch) -> Result<(), StoreError> {
    for op in batch.ops() {
        let ok = match op {
            WriteOp::HashSet { key, .. } => {
                matches!(data.get(key), None | Some(Value::Hash(_)))
            }
            WriteOp::Set { .. } => true,
            WriteOp::ListPush { key, .. } => {
                matches!(data.get(key), None | Some(Value::List(_)))
            }
        };
        if !ok {
            let key = match op {
                WriteOp::HashSet { key, .. }
                | WriteOp::Set { key, .. }
                | WriteOp::ListPush { key, .. } => key,
            };
            return Err(wrong_type(key));
        }
    }
    Ok(())
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut data = self.data.lock().await;
        let current = match read_str(&data, key)? {
            Some(raw) => raw.parse::<i64>().map_err(|_| wrong_type(key))?,
            None => 0,
        };
        let next = current + 1;
        data.insert(key.to_string(), Value::Str(next.to_string()));
        Ok(next)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.data.lock().await.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let data = self.data.lock().await;
        Ok(read_str(&data, key)?.cloned())
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        let data = self.data.lock().await;
        // MGET answers nil for keys of another type
        Ok(keys
            .iter()
            .map(|key| read_str(&data, key).ok().flatten().cloned())
            .collect())
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;
        if data.contains_key(key) {
            return Ok(false);
        }
        data.insert(key.to_string(), Value::Str(value.to_string()));
        Ok(true)
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let data = self.data.lock().await;
        read_hash(&data, key)
    }

    async fn hash_get_all_many(
        &self,
        keys: &[String],
    ) -> Result<Vec<HashMap<String, String>>, StoreError> {
        let data = self.data.lock().await;
        keys.iter().map(|key| read_hash(&data, key)).collect()
    }

    async fn hash_update_existing(
        &self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;
        match data.get_mut(key) {
            None => Ok(false),
            Some(Value::Hash(hash)) => {
                for (field, value) in fields {
                    hash.insert(field.clone(), value.clone());
                }
                Ok(true)
            }
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn list_range(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let data = self.data.lock().await;
        Ok(read_list(&data, key)?.to_vec())
    }

    async fn list_len(&self, key: &str) -> Result<usize, StoreError> {
        let data = self.data.lock().await;
        Ok(read_list(&data, key)?.len())
    }

    async fn apply(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        check_batch(&data, batch)?;

        for op in batch.ops() {
            match op {
                WriteOp::HashSet { key, fields } => {
                    let entry = data
                        .entry(key.clone())
                        .or_insert_with(|| Value::Hash(HashMap::new()));
                    if let Value::Hash(hash) = entry {
                        hash.extend(fields.iter().cloned());
                    }
                }
                WriteOp::Set { key, value } => {
                    data.insert(key.clone(), Value::Str(value.clone()));
                }
                WriteOp::ListPush { key, value } => {
                    let entry = data
                        .entry(key.clone())
                        .or_insert_with(|| Value::List(Vec::new()));
                    if let Value::List(list) = entry {
                        list.push(value.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn delete_indexed(
        &self,
        key: &str,
        index: &str,
        member: &str,
    ) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;
        if !matches!(data.get(index), None | Some(Value::List(_))) {
            return Err(wrong_type(index));
        }

        let existed = data.remove(key).is_some();

        let now_empty = match data.get_mut(index) {
            Some(Value::List(list)) => {
                list.retain(|m| m != member);
                list.is_empty()
            }
            _ => false,
        };
        // Redis drops a list once its last element is removed
        if now_empty {
            data.remove(index);
        }

        Ok(existed)
    }
}
