//! In-memory catalog store.
//!
//! Holds the last applied categories, products, featured promotions and site
//! config. The sync loop writes, handlers read.
//!
//! Every fetch takes a [`Ticket`] from the store before it goes out. A
//! completed fetch is applied only if its ticket is newer than the last one
//! applied for that source, so a slow response can never overwrite fresher
//! data that landed first.

mod fallback;

pub use fallback::{FallbackError, fallback_catalog};

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use comanda_core::{
    Category, HalfHalfMenu, MenuSection, Product, Promotion, SiteConfig, build_sections,
};

/// Catalog data the sync loop fetches independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Categories,
    Products,
    Promotions,
    SiteConfig,
}

impl Source {
    /// Name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Products => "products",
            Self::Promotions => "promotions",
            Self::SiteConfig => "site_config",
        }
    }
}

/// One value per [`Source`].
#[derive(Debug, Default)]
struct PerSource<T> {
    categories: T,
    products: T,
    promotions: T,
    site_config: T,
}

impl<T> PerSource<T> {
    fn get(&self, source: Source) -> &T {
        match source {
            Source::Categories => &self.categories,
            Source::Products => &self.products,
            Source::Promotions => &self.promotions,
            Source::SiteConfig => &self.site_config,
        }
    }

    fn get_mut(&mut self, source: Source) -> &mut T {
        match source {
            Source::Categories => &mut self.categories,
            Source::Products => &mut self.products,
            Source::Promotions => &mut self.promotions,
            Source::SiteConfig => &mut self.site_config,
        }
    }
}

/// Whether any fetch for a source is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Fetching,
}

/// Where the current category list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Nothing loaded yet.
    Empty,
    /// Seeded from the bundled fallback menu.
    Fallback,
    /// Fetched from the backend.
    Live,
}

/// Permission to apply one fetch result.
///
/// Dropping a ticket without applying it (a failed fetch) just marks the
/// fetch as finished.
#[derive(Debug)]
pub struct Ticket {
    source: Source,
    seq: u64,
    inner: Arc<StoreInner>,
}

impl Ticket {
    #[must_use]
    pub const fn source(&self) -> Source {
        self.source
    }

    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.inner
            .in_flight
            .get(self.source)
            .fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Debug, Default)]
struct Snapshot {
    categories: Vec<Category>,
    origin: Option<CatalogOrigin>,
    products: Vec<Product>,
    /// Already filtered to today's featured set.
    promotions: Vec<Promotion>,
    site_config: Option<SiteConfig>,
    /// Last applied ticket per source, `0` when nothing was applied.
    applied: PerSource<u64>,
}

#[derive(Debug, Default)]
struct StoreInner {
    snapshot: RwLock<Snapshot>,
    issued: PerSource<AtomicU64>,
    in_flight: PerSource<AtomicUsize>,
}

/// What a page render needs, cloned out of the store.
#[derive(Debug, Clone, Default)]
pub struct MenuView {
    pub sections: Vec<MenuSection>,
    pub promotions: Vec<Promotion>,
    pub site_config: Option<SiteConfig>,
}

/// Shared catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    inner: Arc<StoreInner>,
}

impl CatalogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.inner
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.inner
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Tickets
    // =========================================================================

    /// Take a ticket before starting a fetch for `source`.
    #[must_use]
    pub fn begin(&self, source: Source) -> Ticket {
        self.inner
            .in_flight
            .get(source)
            .fetch_add(1, Ordering::AcqRel);
        let seq = self.inner.issued.get(source).fetch_add(1, Ordering::AcqRel) + 1;
        Ticket {
            source,
            seq,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Current fetch state of a source.
    #[must_use]
    pub fn state(&self, source: Source) -> FetchState {
        if self.inner.in_flight.get(source).load(Ordering::Acquire) > 0 {
            FetchState::Fetching
        } else {
            FetchState::Idle
        }
    }

    /// Apply a result under the write lock if `ticket` is the newest applied.
    ///
    /// Returns `false` when a newer result was already applied.
    fn apply(&self, ticket: Ticket, update: impl FnOnce(&mut Snapshot)) -> bool {
        let mut snapshot = self.write();
        let applied = snapshot.applied.get_mut(ticket.source);
        if ticket.seq <= *applied {
            tracing::debug!(
                source = ticket.source.as_str(),
                seq = ticket.seq,
                applied = *applied,
                "Discarding stale fetch result"
            );
            return false;
        }
        *applied = ticket.seq;
        update(&mut snapshot);
        true
    }

    // =========================================================================
    // Writers
    // =========================================================================

    /// Replace the category list with a live one.
    pub fn apply_categories(&self, ticket: Ticket, categories: Vec<Category>) -> bool {
        self.apply(ticket, |snapshot| {
            snapshot.categories = categories;
            snapshot.origin = Some(CatalogOrigin::Live);
        })
    }

    /// Replace all products wholesale.
    pub fn apply_products(&self, ticket: Ticket, products: Vec<Product>) -> bool {
        self.apply(ticket, |snapshot| snapshot.products = products)
    }

    /// Replace the featured promotions. Callers pass the already filtered set.
    pub fn apply_promotions(&self, ticket: Ticket, featured: Vec<Promotion>) -> bool {
        self.apply(ticket, |snapshot| snapshot.promotions = featured)
    }

    /// Replace the site config; `None` hides the hours block.
    pub fn apply_site_config(&self, ticket: Ticket, config: Option<SiteConfig>) -> bool {
        self.apply(ticket, |snapshot| snapshot.site_config = config)
    }

    /// Seed categories and products from the fallback menu.
    ///
    /// Only fills sources that nothing has been applied to yet, and does not
    /// advance their tickets, so any live result still wins.
    pub fn seed_fallback(&self, categories: Vec<Category>, products: Vec<Product>) -> bool {
        let mut snapshot = self.write();
        let mut seeded = false;

        if snapshot.origin.is_none() {
            snapshot.categories = categories;
            snapshot.origin = Some(CatalogOrigin::Fallback);
            seeded = true;
        }
        if *snapshot.applied.get(Source::Products) == 0 && snapshot.products.is_empty() {
            snapshot.products = products;
            seeded = true;
        }

        seeded
    }

    // =========================================================================
    // Readers
    // =========================================================================

    /// Where the current categories came from.
    #[must_use]
    pub fn origin(&self) -> CatalogOrigin {
        self.read().origin.unwrap_or(CatalogOrigin::Empty)
    }

    /// Whether a live category list has been applied.
    #[must_use]
    pub fn has_live_categories(&self) -> bool {
        self.origin() == CatalogOrigin::Live
    }

    /// Rendered sections, featured promotions and site config.
    #[must_use]
    pub fn menu(&self) -> MenuView {
        let snapshot = self.read();
        MenuView {
            sections: build_sections(&snapshot.categories, &snapshot.products),
            promotions: snapshot.promotions.clone(),
            site_config: snapshot.site_config.clone(),
        }
    }

    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.read().categories.clone()
    }

    /// Find a rendered product by the id a form posted.
    ///
    /// Products whose category is not listed are not on the page and are
    /// not found.
    #[must_use]
    pub fn product(&self, raw_id: &str) -> Option<Product> {
        let snapshot = self.read();
        build_sections(&snapshot.categories, &snapshot.products)
            .into_iter()
            .flat_map(|section| section.products)
            .find(|product| product.id.matches(raw_id))
    }

    /// Find a currently featured promotion by the id a form posted.
    #[must_use]
    pub fn promotion(&self, raw_id: &str) -> Option<Promotion> {
        self.read()
            .promotions
            .iter()
            .find(|promotion| promotion.id.matches(raw_id))
            .cloned()
    }

    /// Flavors offered by the half & half composer right now.
    #[must_use]
    pub fn half_half_menu(&self) -> HalfHalfMenu {
        let snapshot = self.read();
        HalfHalfMenu::from_sections(&build_sections(&snapshot.categories, &snapshot.products))
    }

    #[must_use]
    pub fn site_config(&self) -> Option<SiteConfig> {
        self.read().site_config.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use comanda_core::{CategoryId, Price, ProductId, PromotionId};

    use super::*;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id: CategoryId::numeric(id),
            name: name.to_string(),
        }
    }

    fn product(id: i64, category_id: i64, name: &str, price: u64) -> Product {
        Product {
            id: ProductId::numeric(id),
            category_id: CategoryId::numeric(category_id),
            name: name.to_string(),
            price: Price::new(price),
            description: None,
            variants: Vec::new(),
            is_new: false,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_stale_ticket_does_not_overwrite_newer_result() {
        let store = CatalogStore::new();
        let slow = store.begin(Source::Products);
        let fast = store.begin(Source::Products);
        assert!(fast.seq() > slow.seq());

        assert!(store.apply_products(fast, vec![product(2, 1, "Nueva", 9000)]));
        assert!(!store.apply_products(slow, vec![product(1, 1, "Vieja", 8000)]));

        let snapshot = store.read();
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.products.first().unwrap().name, "Nueva");
    }

    #[test]
    fn test_tickets_are_sequenced_per_source() {
        let store = CatalogStore::new();
        let products = store.begin(Source::Products);
        let config = store.begin(Source::SiteConfig);
        assert_eq!(products.seq(), 1);
        assert_eq!(config.seq(), 1);

        assert!(store.apply_site_config(config, Some(SiteConfig::default())));
        assert!(store.apply_products(products, vec![product(1, 1, "Muzza", 8000)]));
        assert_eq!(store.begin(Source::SiteConfig).seq(), 2);
        assert_eq!(store.begin(Source::Categories).seq(), 1);
    }

    #[test]
    fn test_fetch_state_tracks_outstanding_tickets() {
        let store = CatalogStore::new();
        assert_eq!(store.state(Source::Promotions), FetchState::Idle);

        let first = store.begin(Source::Promotions);
        let second = store.begin(Source::Promotions);
        assert_eq!(store.state(Source::Promotions), FetchState::Fetching);
        assert_eq!(store.state(Source::Products), FetchState::Idle);

        drop(first);
        assert_eq!(store.state(Source::Promotions), FetchState::Fetching);
        store.apply_promotions(second, Vec::new());
        assert_eq!(store.state(Source::Promotions), FetchState::Idle);
    }

    #[test]
    fn test_failed_fetch_keeps_previous_data() {
        let store = CatalogStore::new();
        let ok = store.begin(Source::Products);
        store.apply_products(ok, vec![product(1, 1, "Muzza", 8000)]);

        // A failed fetch is a ticket that is dropped unapplied.
        drop(store.begin(Source::Products));

        assert_eq!(store.read().products.len(), 1);
    }

    #[test]
    fn test_fallback_yields_to_live_data() {
        let store = CatalogStore::new();
        assert_eq!(store.origin(), CatalogOrigin::Empty);

        assert!(store.seed_fallback(
            vec![category(1, "Pizzas")],
            vec![product(1, 1, "Muzza", 8000)]
        ));
        assert_eq!(store.origin(), CatalogOrigin::Fallback);
        assert!(!store.has_live_categories());

        let ticket = store.begin(Source::Categories);
        store.apply_categories(ticket, vec![category(5, "Hamburguesas")]);
        assert!(store.has_live_categories());

        // Live data is never replaced by a later fallback seed.
        assert!(!store.seed_fallback(vec![category(1, "Pizzas")], Vec::new()));
        assert_eq!(store.categories()[0].name, "Hamburguesas");
    }

    #[test]
    fn test_lookup_by_posted_id() {
        let store = CatalogStore::new();
        store.apply_categories(store.begin(Source::Categories), vec![category(1, "Pizzas")]);
        store.apply_products(
            store.begin(Source::Products),
            vec![product(7, 1, "Muzza", 8000), product(8, 9, "Huérfano", 100)],
        );
        store.apply_promotions(
            store.begin(Source::Promotions),
            vec![Promotion {
                id: PromotionId::numeric(3),
                title: "2x1".to_string(),
                description: None,
                price: Price::new(12000),
                day_of_week: Some(3),
                savings_badge: None,
                active: true,
            }],
        );

        assert_eq!(store.product("7").unwrap().name, "Muzza");
        assert!(store.product("8").is_none());
        assert!(store.product("nope").is_none());
        assert_eq!(store.promotion(" 3").unwrap().title, "2x1");
        assert_eq!(store.half_half_menu().flavors().len(), 1);
    }
}
