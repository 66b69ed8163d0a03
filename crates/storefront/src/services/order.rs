//! Order submission.
//!
//! Validates the checkout against the cart, persists the order and, only
//! once the backend acknowledges it, builds the WhatsApp hand-off and
//! empties the cart.

use std::sync::Arc;

use comanda_core::{Cart, HandOff, OrderRecord, OrderRequest, OrderValidationError};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::backend::{BackendError, MenuBackend};

/// Shown when the backend does not acknowledge the order.
pub const PERSIST_FAILED_MESSAGE: &str = "Error al guardar el pedido. Intentalo nuevamente.";

/// Why an order was not placed.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Rejected before any network call.
    #[error(transparent)]
    Invalid(#[from] OrderValidationError),

    /// The backend did not acknowledge the order; the cart was kept.
    #[error("Order could not be persisted: {0}")]
    Persist(#[source] BackendError),
}

impl OrderError {
    /// Text shown to the visitor.
    #[must_use]
    pub fn visitor_message(&self) -> String {
        match self {
            Self::Invalid(e) => e.to_string(),
            Self::Persist(_) => PERSIST_FAILED_MESSAGE.to_string(),
        }
    }
}

/// Places orders against the menu backend.
#[derive(Clone)]
pub struct OrderService {
    backend: Arc<dyn MenuBackend>,
    phone: String,
}

impl OrderService {
    #[must_use]
    pub fn new(backend: Arc<dyn MenuBackend>, phone: impl Into<String>) -> Self {
        Self {
            backend,
            phone: phone.into(),
        }
    }

    /// Submit the cart.
    ///
    /// On success the cart is cleared and the hand-off returned. On any
    /// error the cart is left untouched.
    ///
    /// # Errors
    ///
    /// - [`OrderError::Invalid`] when a precondition fails
    /// - [`OrderError::Persist`] when the backend rejects or is unreachable
    #[instrument(skip(self, cart, request), fields(lines = cart.len()))]
    pub async fn submit(
        &self,
        cart: &mut Cart,
        request: &OrderRequest,
    ) -> Result<HandOff, OrderError> {
        let order = OrderRecord::prepare(cart, request)?;

        if let Err(e) = self.backend.create_order(&order).await {
            warn!(error = %e, total = %order.total, "Order persistence failed");
            return Err(OrderError::Persist(e));
        }

        let hand_off = order.hand_off(&self.phone);
        cart.clear();

        info!(
            total = %order.total,
            delivery = %order.delivery,
            items = order.items.len(),
            "Order placed"
        );

        Ok(hand_off)
    }
}
