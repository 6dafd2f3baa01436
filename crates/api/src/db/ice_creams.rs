//! Ice-cream repository.
//!
//! Each product is a Redis hash of string fields under `icecream:{id}`, listed
//! in `icecream_ids` in creation order.

use std::collections::HashMap;

use icecream_core::{IceCream, IceCreamId, IceCreamPatch, NewIceCream};
use tracing::{info, warn};

use super::store::{KeyValueStore, WriteBatch};
use super::{RepositoryError, keys, next_id};
use crate::services::images::ImageMirror;

/// Repository for ice-cream products.
pub struct IceCreamRepository<'a> {
    store: &'a dyn KeyValueStore,
    images: Option<&'a dyn ImageMirror>,
}

impl<'a> IceCreamRepository<'a> {
    /// Create a new ice-cream repository.
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            images: None,
        }
    }

    /// Mirror product images through `images` when creating products.
    #[must_use]
    pub fn with_images(mut self, images: Option<&'a dyn ImageMirror>) -> Self {
        self.images = images;
        self
    }

    /// Store a new ice cream under a fresh id.
    ///
    /// With an image mirror configured, the image is downloaded first and the
    /// stored `img_url` points at the local copy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    /// Returns `RepositoryError::Image` if the image cannot be mirrored.
    pub async fn create(&self, new: NewIceCream) -> Result<IceCream, RepositoryError> {
        let id = IceCreamId::new(next_id(self.store, IceCreamId::NAMESPACE).await?);

        let mut ice_cream = IceCream::from_new(id, new);
        if let Some(images) = self.images {
            ice_cream.img_url = images.persist_remote_image(&ice_cream.img_url, id).await?;
        }

        let batch = WriteBatch::new()
            .hash_set(keys::ice_cream(id), to_fields(id, &ice_cream))
            .list_push(keys::ICE_CREAM_INDEX, id.to_string());
        self.store.apply(&batch).await?;

        info!(ice_cream_id = %id, name = %ice_cream.name, "Ice cream created");
        Ok(ice_cream)
    }

    /// Get an ice cream by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    /// Returns `RepositoryError::DataCorruption` if the stored hash is malformed.
    pub async fn get(&self, id: IceCreamId) -> Result<Option<IceCream>, RepositoryError> {
        let fields = self.store.hash_get_all(&keys::ice_cream(id)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        from_fields(id, &fields).map(Some)
    }

    /// List all ice creams in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if a store call fails.
    /// Returns `RepositoryError::DataCorruption` if the index or a hash is malformed.
    pub async fn list(&self) -> Result<Vec<IceCream>, RepositoryError> {
        let ids = self.ids().await?;
        let hash_keys: Vec<String> = ids.iter().map(|id| keys::ice_cream(*id)).collect();
        let hashes = self.store.hash_get_all_many(&hash_keys).await?;

        let mut ice_creams = Vec::with_capacity(ids.len());
        for (id, fields) in ids.into_iter().zip(hashes) {
            if fields.is_empty() {
                warn!(ice_cream_id = %id, "Index entry without ice cream record");
                continue;
            }
            ice_creams.push(from_fields(id, &fields)?);
        }
        Ok(ice_creams)
    }

    /// Merge the supplied fields into an existing ice cream.
    ///
    /// An empty patch changes nothing and returns the current record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no ice cream has this id.
    /// Returns `RepositoryError::Store` if a store call fails.
    pub async fn update(
        &self,
        id: IceCreamId,
        patch: &IceCreamPatch,
    ) -> Result<IceCream, RepositoryError> {
        if !patch.is_empty() {
            let updated = self
                .store
                .hash_update_existing(&keys::ice_cream(id), &patch_fields(patch))
                .await?;
            if !updated {
                return Err(RepositoryError::NotFound);
            }
            info!(ice_cream_id = %id, "Ice cream updated");
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete an ice cream and drop it from the index.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no ice cream has this id.
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn delete(&self, id: IceCreamId) -> Result<(), RepositoryError> {
        let existed = self
            .store
            .delete_indexed(&keys::ice_cream(id), keys::ICE_CREAM_INDEX, &id.to_string())
            .await?;
        if !existed {
            return Err(RepositoryError::NotFound);
        }
        info!(ice_cream_id = %id, "Ice cream deleted");
        Ok(())
    }

    /// Number of stored ice creams.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    pub async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.store.list_len(keys::ICE_CREAM_INDEX).await?)
    }

    /// Ids of all stored ice creams in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the store call fails.
    /// Returns `RepositoryError::DataCorruption` if the index holds a non-numeric id.
    pub async fn ids(&self) -> Result<Vec<IceCreamId>, RepositoryError> {
        self.store
            .list_range(keys::ICE_CREAM_INDEX)
            .await?
            .iter()
            .map(|raw| {
                raw.parse::<IceCreamId>().map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid ice cream id '{raw}': {e}"))
                })
            })
            .collect()
    }
}

// =============================================================================
// Hash encoding
// =============================================================================

const ID: &str = "id";
const NAME: &str = "name";
const PRICE: &str = "price";
const WEIGHT: &str = "weight";
const LEGACY_WEIGHT: &str = "weigth";
const IMG_URL: &str = "img_url";

fn to_fields(id: IceCreamId, ice_cream: &IceCream) -> Vec<(String, String)> {
    vec![
        (ID.to_string(), id.to_string()),
        (NAME.to_string(), ice_cream.name.clone()),
        (PRICE.to_string(), ice_cream.price.to_string()),
        (WEIGHT.to_string(), ice_cream.weight.to_string()),
        (IMG_URL.to_string(), ice_cream.img_url.clone()),
    ]
}

fn patch_fields(patch: &IceCreamPatch) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    if let Some(name) = &patch.name {
        fields.push((NAME.to_string(), name.clone()));
    }
    if let Some(price) = patch.price {
        fields.push((PRICE.to_string(), price.to_string()));
    }
    if let Some(weight) = patch.weight {
        fields.push((WEIGHT.to_string(), weight.to_string()));
    }
    if let Some(img_url) = &patch.img_url {
        fields.push((IMG_URL.to_string(), img_url.clone()));
    }
    fields
}

/// Decode a stored hash. The id always comes from the key, never the hash.
fn from_fields(id: IceCreamId, fields: &HashMap<String, String>) -> Result<IceCream, RepositoryError> {
    let missing = |name: &str| {
        RepositoryError::DataCorruption(format!("ice cream {id} has no '{name}' field"))
    };
    let text = |name: &str| fields.get(name).cloned().ok_or_else(|| missing(name));
    let number = |name: &str, raw: &str| {
        raw.parse::<f64>().map_err(|e| {
            RepositoryError::DataCorruption(format!("ice cream {id} has invalid '{name}': {e}"))
        })
    };

    let price = number(PRICE, &text(PRICE)?)?;
    let raw_weight = fields
        .get(WEIGHT)
        .or_else(|| fields.get(LEGACY_WEIGHT))
        .ok_or_else(|| missing(WEIGHT))?;
    let weight = number(WEIGHT, raw_weight)?;

    Ok(IceCream {
        id: Some(id),
        name: text(NAME)?,
        price,
        weight,
        img_url: text(IMG_URL)?,
    })
}
