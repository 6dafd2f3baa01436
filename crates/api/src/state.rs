//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::{IceCreamRepository, KeyValueStore, OrderRepository};
use crate::services::auth::AuthService;
use crate::services::images::{HttpImageMirror, ImageError, ImageMirror};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Repositories and services are built per call
/// on top of the shared store handle.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: Arc<dyn KeyValueStore>,
    images: Option<Arc<dyn ImageMirror>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Builds an HTTP image mirror when `config.statics.mirror_images` is set.
    ///
    /// # Errors
    ///
    /// Returns `ImageError` if the image mirror's HTTP client cannot be built.
    pub fn new(config: ApiConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ImageError> {
        let images: Option<Arc<dyn ImageMirror>> = if config.statics.mirror_images {
            Some(Arc::new(HttpImageMirror::new(&config.statics)?))
        } else {
            None
        };
        Ok(Self::with_parts(config, store, images))
    }

    /// Create a state from already-built parts.
    #[must_use]
    pub fn with_parts(
        config: ApiConfig,
        store: Arc<dyn KeyValueStore>,
        images: Option<Arc<dyn ImageMirror>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                images,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the key-value store.
    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn ice_creams(&self) -> IceCreamRepository<'_> {
        IceCreamRepository::new(self.store()).with_images(self.inner.images.as_deref())
    }

    #[must_use]
    pub fn orders(&self) -> OrderRepository<'_> {
        OrderRepository::new(self.store())
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store(), self.inner.config.password_scheme)
    }
}
