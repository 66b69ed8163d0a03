//! Background catalog synchronization.
//!
//! At startup categories are fetched and applied before products are
//! requested, while promotions and site config load concurrently. After
//! that a fixed-period ticker spawns independent refreshes of products,
//! promotions and site config. Ticks are not coalesced; overlapping fetches
//! are resolved by the store's tickets.

mod site_config_cache;

pub use site_config_cache::{CacheError, SiteConfigCache};

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, FixedOffset, NaiveDateTime, Utc};
use comanda_core::featured_promotions;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::backend::MenuBackend;
use crate::catalog::{CatalogStore, Source, fallback_catalog};

/// Source of restaurant-local time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Clock reading the system time at a fixed UTC offset.
#[must_use]
pub fn offset_clock(offset: FixedOffset) -> Clock {
    Arc::new(move || Utc::now().with_timezone(&offset).naive_local())
}

/// Drives catalog refreshes from the backend into the [`CatalogStore`].
#[derive(Clone)]
pub struct SyncLoop {
    backend: Arc<dyn MenuBackend>,
    store: CatalogStore,
    cache: SiteConfigCache,
    clock: Clock,
    period: Duration,
}

impl SyncLoop {
    #[must_use]
    pub fn new(
        backend: Arc<dyn MenuBackend>,
        store: CatalogStore,
        cache: SiteConfigCache,
        clock: Clock,
        period: Duration,
    ) -> Self {
        Self {
            backend,
            store,
            cache,
            clock,
            period,
        }
    }

    /// Run startup, then tick forever.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.startup().await;

            let mut interval = tokio::time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                // Refreshes run detached; the next tick does not wait for them
                drop(self.tick());
            }
        })
    }

    /// Initial load.
    ///
    /// Seeds the bundled fallback menu if no live categories could be loaded.
    #[instrument(skip(self))]
    pub async fn startup(&self) {
        let catalog = async {
            let categories_ok = self.refresh_categories().await;
            let products_ok = self.refresh_products().await;
            if !self.store.has_live_categories() {
                self.seed_fallback();
            }
            (categories_ok, products_ok)
        };

        let ((categories_ok, products_ok), promotions_ok, site_config_ok) = tokio::join!(
            catalog,
            self.refresh_promotions(),
            self.refresh_site_config()
        );

        info!(
            categories_ok,
            products_ok,
            promotions_ok,
            site_config_ok,
            origin = ?self.store.origin(),
            "Initial catalog load complete"
        );
    }

    /// One timer tick: spawn the periodic refreshes.
    ///
    /// While no live category list has been applied, the product refresh
    /// retries categories first.
    pub fn tick(&self) -> Vec<JoinHandle<()>> {
        debug!("Sync tick");

        let catalog = {
            let this = self.clone();
            tokio::spawn(async move {
                if !this.store.has_live_categories() {
                    this.refresh_categories().await;
                }
                this.refresh_products().await;
            })
        };
        let promotions = {
            let this = self.clone();
            tokio::spawn(async move {
                this.refresh_promotions().await;
            })
        };
        let site_config = {
            let this = self.clone();
            tokio::spawn(async move {
                this.refresh_site_config().await;
            })
        };

        vec![catalog, promotions, site_config]
    }

    // =========================================================================
    // Per-source refreshes
    // =========================================================================

    /// Fetch categories. Returns whether the fetch succeeded.
    pub async fn refresh_categories(&self) -> bool {
        let ticket = self.store.begin(Source::Categories);
        match self.backend.categories().await {
            Ok(categories) => {
                let count = categories.len();
                if self.store.apply_categories(ticket, categories) {
                    debug!(count, "Applied categories");
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "Category fetch failed, keeping previous categories");
                false
            }
        }
    }

    /// Fetch products, replacing all of them on success.
    pub async fn refresh_products(&self) -> bool {
        let ticket = self.store.begin(Source::Products);
        match self.backend.products().await {
            Ok(products) => {
                let count = products.len();
                if self.store.apply_products(ticket, products) {
                    debug!(count, "Applied products");
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "Product fetch failed, keeping previous products");
                false
            }
        }
    }

    /// Fetch promotions and keep those featured today.
    pub async fn refresh_promotions(&self) -> bool {
        let ticket = self.store.begin(Source::Promotions);
        match self.backend.promotions().await {
            Ok(promotions) => {
                let today = (self.clock)().weekday();
                let featured = featured_promotions(&promotions, today);
                let count = featured.len();
                if self.store.apply_promotions(ticket, featured) {
                    debug!(count, total = promotions.len(), weekday = %today, "Applied promotions");
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "Promotion fetch failed, keeping previous promotions");
                false
            }
        }
    }

    /// Fetch site config, falling back to the cached file on failure.
    pub async fn refresh_site_config(&self) -> bool {
        let ticket = self.store.begin(Source::SiteConfig);
        match self.backend.site_config().await {
            Ok(config) => {
                // Stale results leave the cache untouched
                if !self.store.apply_site_config(ticket, Some(config.clone())) {
                    return true;
                }
                if let Err(e) = self.cache.store(&config).await {
                    warn!(path = %self.cache.path().display(), error = %e, "Failed to write site config cache");
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "Site config fetch failed");
                if let Some(cached) = self.cache.load().await {
                    debug!("Using cached site config");
                    self.store.apply_site_config(ticket, Some(cached));
                }
                false
            }
        }
    }

    fn seed_fallback(&self) {
        match fallback_catalog() {
            Ok((categories, products)) => {
                if self.store.seed_fallback(categories, products) {
                    warn!("Backend unavailable, serving the bundled fallback menu");
                }
            }
            Err(e) => {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Fallback menu unusable");
            }
        }
    }
}
