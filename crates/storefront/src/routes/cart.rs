//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Adds are plain form posts that
//! redirect back to the menu; validation failures come back as a notice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use comanda_core::{CartLine, LineCandidate, Price};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::Notice;
use crate::models::session::{load_cart, push_notice, save_cart, take_notice};
use crate::state::AppState;

/// Shown when a posted product is no longer on the menu.
const PRODUCT_GONE: &str = "Ese producto ya no está disponible";

/// Shown when a posted promotion is no longer featured.
const PROMOTION_GONE: &str = "Esa promo ya no está disponible";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub variant: Option<String>,
}

/// Add promotion form data.
#[derive(Debug, Deserialize)]
pub struct AddPromotionForm {
    pub promo_id: String,
}

/// A cart line as shown on the cart page.
#[derive(Clone)]
pub struct CartLineView {
    /// Name with the chosen variant, if any.
    pub name: String,
    pub price: Price,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            name: line.display_name(),
            price: line.price,
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub lines: Vec<CartLineView>,
    pub total: Price,
    pub notice: Option<Notice>,
    pub cart_count: usize,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub cart_count: usize,
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let notice = take_notice(&session).await;
    let cart = load_cart(&session).await;

    CartShowTemplate {
        lines: cart.lines().iter().map(CartLineView::from).collect(),
        total: cart.total(),
        notice,
        cart_count: cart.len(),
    }
}

/// Cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        cart_count: load_cart(&session).await.len(),
    }
}

/// Add a catalog product.
///
/// The product is resolved from the current catalog, so the price always
/// comes from the menu rather than the form.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let Some(product) = state.catalog().product(&form.product_id) else {
        push_notice(&session, Notice::error(PRODUCT_GONE)).await?;
        return Ok(Redirect::to("/"));
    };

    let back = format!("/#cat-{}", product.category_id);

    let label = form.variant.as_deref().filter(|v| !v.is_empty());
    let variant = match product.select_variant(label) {
        Ok(variant) => variant,
        Err(e) => {
            push_notice(&session, Notice::error(e.to_string())).await?;
            return Ok(Redirect::to(&back));
        }
    };

    let mut cart = load_cart(&session).await;
    cart.add_line(LineCandidate::product(&product, variant));
    save_cart(&session, &cart).await?;
    push_notice(&session, Notice::added(&product.name)).await?;

    add_breadcrumb(
        "cart",
        "Added product",
        Some(&[("product_id", &form.product_id)]),
    );
    tracing::debug!(product = %product.name, lines = cart.len(), "Added to cart");

    Ok(Redirect::to(&back))
}

/// Add a featured promotion.
///
/// A half & half promotion opens the composer instead of adding itself.
#[instrument(skip(state, session))]
pub async fn add_promotion(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddPromotionForm>,
) -> Result<Redirect> {
    let Some(promotion) = state.catalog().promotion(&form.promo_id) else {
        push_notice(&session, Notice::error(PROMOTION_GONE)).await?;
        return Ok(Redirect::to("/"));
    };

    if promotion.opens_half_half() {
        return Ok(Redirect::to("/half-half"));
    }

    let mut cart = load_cart(&session).await;
    cart.add_line(LineCandidate::promotion(&promotion));
    save_cart(&session, &cart).await?;
    push_notice(&session, Notice::added(&promotion.title)).await?;

    add_breadcrumb("cart", "Added promotion", Some(&[("promo_id", &form.promo_id)]));

    Ok(Redirect::to("/"))
}
