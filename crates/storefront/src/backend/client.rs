//! HTTP implementation of [`MenuBackend`].

use std::sync::Arc;

use async_trait::async_trait;
use comanda_core::{Category, OrderRecord, Product, Promotion, SiteConfig};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::types::{OrderPayload, WireCategory, WireProduct, WirePromotion, WireSiteConfig};
use super::{BackendError, MenuBackend};
use crate::config::MenuApiConfig;

/// Longest slice of an error body kept for logs.
const ERROR_BODY_LIMIT: usize = 200;

// =============================================================================
// HttpBackend
// =============================================================================

/// Client for the menu backend REST API.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

struct HttpBackendInner {
    client: reqwest::Client,
    config: MenuApiConfig,
}

impl HttpBackend {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &MenuApiConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpBackendInner {
                client,
                config: config.clone(),
            }),
        })
    }

    /// GET an endpoint and decode its JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = self.inner.config.endpoint(path);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        // Body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MenuBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<Category>, BackendError> {
        let wire: Vec<WireCategory> = self.get_json("categories").await?;
        debug!(count = wire.len(), "Fetched categories");
        Ok(wire.into_iter().map(Category::from).collect())
    }

    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<Product>, BackendError> {
        let wire: Vec<WireProduct> = self.get_json("products").await?;
        debug!(count = wire.len(), "Fetched products");
        Ok(wire.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn promotions(&self) -> Result<Vec<Promotion>, BackendError> {
        let wire: Vec<WirePromotion> = self.get_json("promos").await?;
        debug!(count = wire.len(), "Fetched promotions");
        Ok(wire.into_iter().map(Promotion::from).collect())
    }

    #[instrument(skip(self))]
    async fn site_config(&self) -> Result<SiteConfig, BackendError> {
        let wire: WireSiteConfig = self.get_json("site-config").await?;
        Ok(wire.into())
    }

    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total))]
    async fn create_order(&self, order: &OrderRecord) -> Result<(), BackendError> {
        let url = self.inner.config.endpoint("orders");
        let response = self
            .inner
            .client
            .post(&url)
            .json(&OrderPayload::from(order))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: message.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        debug!(status = %status, "Order persisted");
        Ok(())
    }
}
