//! Order submission route.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use comanda_core::{DeliveryMethod, OrderRequest};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::models::Notice;
use crate::models::session::{load_cart, push_notice, save_cart};
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub delivery_type: Option<String>,
    pub address: Option<String>,
}

impl CheckoutForm {
    fn request(&self) -> OrderRequest {
        OrderRequest {
            delivery: self
                .delivery_type
                .as_deref()
                .and_then(|value| value.parse::<DeliveryMethod>().ok()),
            address: self.address.clone(),
        }
    }
}

/// Submit the cart as an order.
///
/// Redirects to the WhatsApp chat once the backend has stored the order.
/// Any failure returns to the cart page with the reason as a notice.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    let request = form.request();

    match state.orders().submit(&mut cart, &request).await {
        Ok(hand_off) => {
            save_cart(&session, &cart).await?;
            add_breadcrumb("order", "Order placed", None);
            Ok(Redirect::to(&hand_off.url).into_response())
        }
        Err(e) => {
            tracing::info!(error = %e, "Order not placed");
            push_notice(&session, Notice::error(e.visitor_message())).await?;
            Ok(Redirect::to("/cart").into_response())
        }
    }
}
