//! Application state shared across handlers.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::backend::MenuBackend;
use crate::catalog::CatalogStore;
use crate::config::StorefrontConfig;
use crate::services::OrderService;
use crate::sync::{Clock, SiteConfigCache, SyncLoop, offset_clock};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog snapshot, the order service and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Arc<dyn MenuBackend>,
    catalog: CatalogStore,
    orders: OrderService,
    clock: Clock,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `backend` - Menu backend the catalog and orders go through
    #[must_use]
    pub fn new(config: StorefrontConfig, backend: Arc<dyn MenuBackend>) -> Self {
        let clock = offset_clock(config.utc_offset);
        Self::with_clock(config, backend, clock)
    }

    /// Create a state with an explicit restaurant-local clock.
    #[must_use]
    pub fn with_clock(
        config: StorefrontConfig,
        backend: Arc<dyn MenuBackend>,
        clock: Clock,
    ) -> Self {
        let orders = OrderService::new(Arc::clone(&backend), config.whatsapp_phone.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                catalog: CatalogStore::new(),
                orders,
                clock,
            }),
        }
    }

    /// Build the sync loop that feeds this state's catalog.
    #[must_use]
    pub fn sync_loop(&self) -> SyncLoop {
        SyncLoop::new(
            Arc::clone(&self.inner.backend),
            self.inner.catalog.clone(),
            SiteConfigCache::new(self.inner.config.site_config_cache.clone()),
            Arc::clone(&self.inner.clock),
            self.inner.config.refresh_interval,
        )
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog snapshot.
    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    /// Get a reference to the order service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// Current restaurant-local time.
    #[must_use]
    pub fn local_now(&self) -> NaiveDateTime {
        (self.inner.clock)()
    }
}
