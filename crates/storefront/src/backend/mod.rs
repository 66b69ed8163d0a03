//! Menu backend REST API.
//!
//! # Architecture
//!
//! - The backend is the source of truth for the catalog and for orders
//! - [`MenuBackend`] is the seam the sync loop and the order service talk to
//! - [`HttpBackend`] is the production implementation over `reqwest`
//! - Wire records are deliberately lenient (see [`types`]) and are
//!   converted to `comanda-core` types at the edge
//!
//! # Endpoints
//!
//! - `GET /categories`, `GET /products`, `GET /promos`, `GET /site-config`
//! - `POST /orders`, any 2xx is an acknowledgment

mod client;
pub mod types;

pub use client::HttpBackend;

use async_trait::async_trait;
use comanda_core::{Category, OrderRecord, Product, Promotion, SiteConfig};
use thiserror::Error;

/// Errors that can occur when talking to the menu backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Operations the storefront needs from the menu backend.
#[async_trait]
pub trait MenuBackend: Send + Sync {
    /// All categories in display order.
    async fn categories(&self) -> Result<Vec<Category>, BackendError>;

    /// All products across categories.
    async fn products(&self) -> Result<Vec<Product>, BackendError>;

    /// All promotions, unfiltered.
    async fn promotions(&self) -> Result<Vec<Promotion>, BackendError>;

    /// Opening hours and closed dates.
    async fn site_config(&self) -> Result<SiteConfig, BackendError>;

    /// Persist a validated order.
    async fn create_order(&self, order: &OrderRecord) -> Result<(), BackendError>;
}
