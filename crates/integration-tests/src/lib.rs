//! Integration tests for Comanda.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p comanda-integration-tests
//! ```
//!
//! The storefront router is served on an ephemeral local port against
//! [`StubBackend`], so no menu backend or network access is needed.
//!
//! # Test Categories
//!
//! - `order_flow` - Cart, checkout and the WhatsApp redirect
//! - `half_half` - Composer page, preview and add
//! - `sync_loop` - Startup, refresh and fallback behavior of the catalog

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate};
use comanda_core::{
    Category, CategoryId, OrderRecord, Price, Product, ProductId, Promotion, SiteConfig,
};
use comanda_storefront::backend::{BackendError, MenuBackend};
use comanda_storefront::config::{MenuApiConfig, StorefrontConfig};
use comanda_storefront::routes;
use comanda_storefront::state::AppState;
use comanda_storefront::sync::Clock;
use url::Url;

/// WhatsApp number used by [`test_config`].
pub const TEST_PHONE: &str = "5491100000000";

// ============================================================================
// Stub backend
// ============================================================================

/// Number of calls made per backend operation.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub categories: AtomicUsize,
    pub products: AtomicUsize,
    pub promotions: AtomicUsize,
    pub site_config: AtomicUsize,
    pub orders: AtomicUsize,
}

/// In-memory [`MenuBackend`].
///
/// Each source holds `Some(data)` to answer or `None` to fail with a 503.
#[derive(Debug, Default)]
pub struct StubBackend {
    categories: Mutex<Option<Vec<Category>>>,
    products: Mutex<Option<Vec<Product>>>,
    promotions: Mutex<Option<Vec<Promotion>>>,
    site_config: Mutex<Option<SiteConfig>>,
    reject_orders: AtomicBool,
    orders: Mutex<Vec<OrderRecord>>,
    pub calls: CallCounts,
}

fn unavailable() -> BackendError {
    BackendError::Api {
        status: 503,
        message: "stub unavailable".to_string(),
    }
}

fn answer<T: Clone>(slot: &Mutex<Option<T>>) -> Result<T, BackendError> {
    slot.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or_else(unavailable)
}

impl StubBackend {
    /// Backend where every source fails.
    #[must_use]
    pub fn failing() -> Self {
        Self::default()
    }

    /// Backend serving [`sample_menu`], no promotions and an empty site config.
    #[must_use]
    pub fn with_sample_menu() -> Self {
        let (categories, products) = sample_menu();
        let backend = Self::default();
        backend.set_categories(Some(categories));
        backend.set_products(Some(products));
        backend.set_promotions(Some(Vec::new()));
        backend.set_site_config(Some(SiteConfig::default()));
        backend
    }

    pub fn set_categories(&self, categories: Option<Vec<Category>>) {
        *self.categories.lock().unwrap_or_else(PoisonError::into_inner) = categories;
    }

    pub fn set_products(&self, products: Option<Vec<Product>>) {
        *self.products.lock().unwrap_or_else(PoisonError::into_inner) = products;
    }

    pub fn set_promotions(&self, promotions: Option<Vec<Promotion>>) {
        *self.promotions.lock().unwrap_or_else(PoisonError::into_inner) = promotions;
    }

    pub fn set_site_config(&self, config: Option<SiteConfig>) {
        *self.site_config.lock().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Make `create_order` fail.
    pub fn reject_orders(&self, reject: bool) {
        self.reject_orders.store(reject, Ordering::SeqCst);
    }

    /// Orders acknowledged so far.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MenuBackend for StubBackend {
    async fn categories(&self) -> Result<Vec<Category>, BackendError> {
        self.calls.categories.fetch_add(1, Ordering::SeqCst);
        answer(&self.categories)
    }

    async fn products(&self) -> Result<Vec<Product>, BackendError> {
        self.calls.products.fetch_add(1, Ordering::SeqCst);
        answer(&self.products)
    }

    async fn promotions(&self) -> Result<Vec<Promotion>, BackendError> {
        self.calls.promotions.fetch_add(1, Ordering::SeqCst);
        answer(&self.promotions)
    }

    async fn site_config(&self) -> Result<SiteConfig, BackendError> {
        self.calls.site_config.fetch_add(1, Ordering::SeqCst);
        answer(&self.site_config)
    }

    async fn create_order(&self, order: &OrderRecord) -> Result<(), BackendError> {
        self.calls.orders.fetch_add(1, Ordering::SeqCst);
        if self.reject_orders.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(order.clone());
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A product with no description, variants or images.
#[must_use]
pub fn product(id: i64, category_id: i64, name: &str, price: u64) -> Product {
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

/// Pizzas (Muzza 8000, Napolitana 9000) and burgers (Clasica 7000 with
/// Simple and Doble variants).
#[must_use]
pub fn sample_menu() -> (Vec<Category>, Vec<Product>) {
    let categories = vec![
        Category {
            id: CategoryId::numeric(1),
            name: "Pizzas".to_string(),
        },
        Category {
            id: CategoryId::numeric(2),
            name: "Hamburguesas".to_string(),
        },
    ];

    let mut burger = product(20, 2, "Clasica", 7000);
    burger.variants = vec!["Simple".to_string(), "Doble".to_string()];

    let products = vec![
        product(10, 1, "Muzza", 8000),
        product(11, 1, "Napolitana", 9000),
        burger,
    ];

    (categories, products)
}

/// Unique cache file path under the system temp directory.
#[must_use]
pub fn temp_cache_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("comanda-test-{}", uuid::Uuid::new_v4()))
        .join("site-config.json")
}

/// Clock frozen at `hour:minute` on Wednesday 2026-10-14.
///
/// # Panics
///
/// Panics if `hour` or `minute` is out of range.
#[must_use]
pub fn wednesday_at(hour: u32, minute: u32) -> Clock {
    let now = NaiveDate::from_ymd_opt(2026, 10, 14)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid test time");
    Arc::new(move || now)
}

/// Storefront configuration for tests.
///
/// # Panics
///
/// Never in practice; the base URL literal is valid.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        menu_api: MenuApiConfig {
            base_url: Url::parse("http://127.0.0.1:9/api").expect("valid test URL"),
            request_timeout: Duration::from_secs(1),
        },
        refresh_interval: Duration::from_secs(60),
        whatsapp_phone: TEST_PHONE.to_string(),
        utc_offset: FixedOffset::west_opt(3 * 3600).expect("valid offset"),
        site_config_cache: temp_cache_path(),
        cookie_secure: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

// ============================================================================
// Test server
// ============================================================================

/// The storefront served on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    /// Keeps cookies and does not follow redirects.
    pub client: reqwest::Client,
    pub state: AppState,
}

impl TestServer {
    /// Load the catalog once from `backend`, then serve.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(backend: Arc<StubBackend>) -> Self {
        Self::serve(AppState::new(test_config(), backend)).await
    }

    /// Like [`TestServer::start`] with a fixed restaurant-local clock.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start_with_clock(backend: Arc<StubBackend>, clock: Clock) -> Self {
        Self::serve(AppState::with_clock(test_config(), backend, clock)).await
    }

    async fn serve(state: AppState) -> Self {
        state.sync_loop().startup().await;

        let listener = tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let app = routes::app(state.clone());
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .ok();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{addr}"),
            client,
            state,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and return the body.
    ///
    /// # Panics
    ///
    /// Panics on transport failure or a non-success status.
    pub async fn page(&self, path: &str) -> String {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed");
        assert!(resp.status().is_success(), "GET {path}: {}", resp.status());
        resp.text().await.expect("Failed to read body")
    }

    /// POST a form to `path` and return the redirect target.
    ///
    /// # Panics
    ///
    /// Panics on transport failure or when the response is not a 303.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> String {
        let resp = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST failed");
        assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER, "POST {path}");
        resp.headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .expect("Redirect without Location")
            .to_string()
    }
}
