//! Store statistics.

use tracing::info;

use icecream_api::db::{IceCreamRepository, KeyValueStore, OrderRepository, RepositoryError, keys};

/// Counts read from the store.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub ice_creams: usize,
    pub orders: usize,
    pub startups: i64,
}

/// Print counts for the configured store.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the store is unreachable.
pub async fn print() -> Result<(), Box<dyn std::error::Error>> {
    let state = super::connect().await?;
    let stats = collect(state.store()).await?;

    info!(
        ice_creams = stats.ice_creams,
        orders = stats.orders,
        startups = stats.startups,
        "Store statistics"
    );
    Ok(())
}

/// Read the counts from `store`.
///
/// # Errors
///
/// Returns `RepositoryError::Store` if a read fails, or
/// `RepositoryError::DataCorruption` if the startup counter is not a number.
pub async fn collect(store: &dyn KeyValueStore) -> Result<StoreStats, RepositoryError> {
    let startups = match store.get(keys::HEALTH).await? {
        Some(raw) => raw.parse().map_err(|_| {
            RepositoryError::DataCorruption(format!("{} is not a counter: {raw}", keys::HEALTH))
        })?,
        None => 0,
    };

    Ok(StoreStats {
        ice_creams: IceCreamRepository::new(store).count().await?,
        orders: OrderRepository::new(store).count().await?,
        startups,
    })
}
