//! Order repository.
//!
//! Orders are immutable JSON records under `order:{id}`. Each order id is
//! appended to the global `order_ids` list and to the owner's
//! `user:{login}:orders` list in the same transaction as the record.

use chrono::Utc;
use icecream_core::{Login, Order, OrderId, OrderPosition};
use tracing::{info, warn};

use super::store::{KeyValueStore, WriteBatch};
use super::{RepositoryError, keys, next_id};

/// Repository for orders.
pub struct OrderRepository<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Store a new order for `login`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if a store call fails.
    pub async fn create(
        &self,
        login: &Login,
        positions: Vec<OrderPosition>,
    ) -> Result<Order, RepositoryError> {
        let id = OrderId::new(next_id(self.store, OrderId::NAMESPACE).await?);
        let order = Order {
            id,
            user_login: login.clone(),
            created_at: Utc::now(),
            positions,
        };
        let json = serde_json::to_string(&order)
            .map_err(|e| RepositoryError::DataCorruption(format!("cannot encode order: {e}")))?;

        let batch = WriteBatch::new()
            .set(keys::order(id), json)
            .list_push(keys::ORDER_INDEX, id.to_string())
            .list_push(keys::user_orders(login), id.to_string());
        self.store.apply(&batch).await?;

        info!(order_id = %id, login = %login, items = order.item_count(), "Order created");
        Ok(order)
    }

    /// All orders of `login` in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if a store call fails.
    /// Returns `RepositoryError::DataCorruption` if a stored order cannot be decoded.
    pub async fn list_for_user(&self, login: &Login) -> Result<Vec<Order>, RepositoryError> {
        let ids = self.ids_for_user(login).await?;
        let order_keys: Vec<String> = ids.iter().map(|id| keys::order(*id)).collect();
        let records = self.store.get_many(&order_keys).await?;

        let mut orders = Vec::with_capacity(ids.len());
        for (id, record) in ids.into_iter().zip(records) {
            let Some(json) = record else {
                warn!(order_id = %id, login = %login, "Index entry without order record");
                continue;
            };
            let order: Order = serde_json::from_str(&json).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid order record {id}: {e}"))
            })?;
            orders.push(order);
        }
        Ok(orders)
    }

    /// Ids of the orders of `login` in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    /// Returns `RepositoryError::DataCorruption` if the index holds a non-numeric id.
    pub async fn ids_for_user(&self, login: &Login) -> Result<Vec<OrderId>, RepositoryError> {
        self.store
            .list_range(&keys::user_orders(login))
            .await?
            .iter()
            .map(|raw| {
                raw.parse::<OrderId>().map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid order id '{raw}': {e}"))
                })
            })
            .collect()
    }

    /// Number of orders placed by all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.store.list_len(keys::ORDER_INDEX).await?)
    }
}
