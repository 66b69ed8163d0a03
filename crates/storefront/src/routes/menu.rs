//! Menu page, sections fragment and health checks.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use comanda_core::half_half::HALF_HALF_PLACEHOLDER;
use comanda_core::{MenuSection, Price, Product, Promotion, SiteConfig};
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::{CatalogOrigin, MenuView};
use crate::filters;
use crate::models::Notice;
use crate::models::session::{load_cart, take_notice};
use crate::state::AppState;

/// Badge shown on promotions without their own savings badge.
const DEFAULT_SAVINGS_BADGE: &str = "Promo especial";

// =============================================================================
// View Models
// =============================================================================

/// A product as rendered in its section.
#[derive(Clone)]
pub struct MenuItemView {
    pub id: String,
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    /// Select options; empty for products without variants.
    pub options: Vec<String>,
    pub is_new: bool,
    pub image: Option<String>,
    /// The visitor just added this item.
    pub just_added: bool,
}

impl MenuItemView {
    fn new(product: &Product, notice: Option<&Notice>) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            options: product
                .variant_options()
                .into_iter()
                .map(String::from)
                .collect(),
            is_new: product.is_new,
            image: product.first_image().map(String::from),
            just_added: is_added(notice, &product.name),
        }
    }

    #[must_use]
    pub fn has_variants(&self) -> bool {
        !self.options.is_empty()
    }
}

/// One category tab and its items.
#[derive(Clone)]
pub struct SectionView {
    /// Fragment id, `cat-<category id>`.
    pub anchor: String,
    pub name: String,
    pub is_pizzas: bool,
    pub items: Vec<MenuItemView>,
    /// The half & half entry was just used.
    pub half_half_added: bool,
}

impl SectionView {
    fn new(section: &MenuSection, notice: Option<&Notice>) -> Self {
        let is_pizzas = section.is_pizzas();
        Self {
            anchor: format!("cat-{}", section.category.id),
            name: section.category.name.clone(),
            is_pizzas,
            // The template renders the half & half entry itself
            items: section
                .products
                .iter()
                .filter(|product| !(is_pizzas && product.name == HALF_HALF_PLACEHOLDER))
                .map(|product| MenuItemView::new(product, notice))
                .collect(),
            half_half_added: is_added(notice, HALF_HALF_PLACEHOLDER),
        }
    }
}

/// A featured promotion card.
#[derive(Clone)]
pub struct PromoView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Price,
    pub savings_badge: String,
    pub just_added: bool,
}

impl PromoView {
    fn new(promotion: &Promotion, notice: Option<&Notice>) -> Self {
        Self {
            id: promotion.id.to_string(),
            title: promotion.title.clone(),
            description: promotion.description.clone(),
            price: promotion.price,
            savings_badge: promotion
                .savings_badge
                .clone()
                .unwrap_or_else(|| DEFAULT_SAVINGS_BADGE.to_string()),
            just_added: is_added(notice, &promotion.title),
        }
    }
}

/// Opening hours block.
#[derive(Clone)]
pub struct SiteHoursView {
    pub open_now: bool,
    pub hours: Option<String>,
    pub days: String,
    pub closed: Option<String>,
}

impl SiteHoursView {
    fn new(config: &SiteConfig, now: chrono::NaiveDateTime) -> Self {
        Self {
            open_now: config.is_open_at(now),
            hours: config.hours_label(),
            days: config.days_label(),
            closed: config.closed_label(),
        }
    }
}

fn is_added(notice: Option<&Notice>, name: &str) -> bool {
    notice.is_some_and(|n| !n.is_error() && n.item.as_deref() == Some(name))
}

/// Everything the sections fragment renders.
#[derive(Clone, Default)]
pub struct MenuBody {
    pub sections: Vec<SectionView>,
    pub promotions: Vec<PromoView>,
}

impl MenuBody {
    #[must_use]
    pub fn new(view: &MenuView, notice: Option<&Notice>) -> Self {
        Self {
            sections: view
                .sections
                .iter()
                .map(|section| SectionView::new(section, notice))
                .collect(),
            promotions: view
                .promotions
                .iter()
                .map(|promotion| PromoView::new(promotion, notice))
                .collect(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu/index.html")]
pub struct MenuIndexTemplate {
    pub menu: MenuBody,
    pub hours: Option<SiteHoursView>,
    pub notice: Option<Notice>,
    pub cart_count: usize,
}

/// Menu sections fragment template (polled by the page).
#[derive(Template, WebTemplate)]
#[template(path = "partials/menu_sections.html")]
pub struct MenuSectionsTemplate {
    pub menu: MenuBody,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the menu page.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let notice = take_notice(&session).await;
    let cart = load_cart(&session).await;
    let view = state.catalog().menu();
    let hours = view
        .site_config
        .as_ref()
        .map(|config| SiteHoursView::new(config, state.local_now()));

    MenuIndexTemplate {
        menu: MenuBody::new(&view, notice.as_ref()),
        hours,
        notice,
        cart_count: cart.len(),
    }
}

/// Menu sections fragment.
///
/// Reflects the latest catalog snapshot; does not consume notices.
#[instrument(skip(state))]
pub async fn sections(State(state): State<AppState>) -> impl IntoResponse {
    MenuSectionsTemplate {
        menu: MenuBody::new(&state.catalog().menu(), None),
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable until a category list, live or the
/// bundled fallback, has been loaded.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.catalog().origin() {
        CatalogOrigin::Live => (StatusCode::OK, "live"),
        CatalogOrigin::Fallback => (StatusCode::OK, "fallback"),
        CatalogOrigin::Empty => (StatusCode::SERVICE_UNAVAILABLE, "loading"),
    }
}
