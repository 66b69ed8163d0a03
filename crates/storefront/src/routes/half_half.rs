//! Half & half composer route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use comanda_core::half_half::HALF_HALF_PLACEHOLDER;
use comanda_core::{Flavor, HalfHalfPreview};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::Notice;
use crate::models::session::{load_cart, push_notice, save_cart, take_notice};
use crate::state::AppState;

/// Flavor selection, from the preview query string or the add form.
#[derive(Debug, Default, Deserialize)]
pub struct HalfHalfSelection {
    #[serde(default)]
    pub first: String,
    #[serde(default)]
    pub second: String,
}

impl HalfHalfSelection {
    fn first(&self) -> Option<&str> {
        Some(self.first.as_str()).filter(|s| !s.is_empty())
    }

    fn second(&self) -> Option<&str> {
        Some(self.second.as_str()).filter(|s| !s.is_empty())
    }
}

/// Flavor picker page template.
#[derive(Template, WebTemplate)]
#[template(path = "half_half/show.html")]
pub struct HalfHalfShowTemplate {
    pub flavors: Vec<Flavor>,
    pub preview: HalfHalfPreview,
    pub notice: Option<Notice>,
    pub cart_count: usize,
}

/// Price preview fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/half_half_preview.html")]
pub struct HalfHalfPreviewTemplate {
    pub preview: HalfHalfPreview,
}

/// Display the flavor picker.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let notice = take_notice(&session).await;
    let cart = load_cart(&session).await;

    HalfHalfShowTemplate {
        flavors: state.catalog().half_half_menu().flavors().to_vec(),
        preview: HalfHalfPreview::placeholder(),
        notice,
        cart_count: cart.len(),
    }
}

/// Price preview for a partial or complete selection.
#[instrument(skip(state))]
pub async fn preview(
    State(state): State<AppState>,
    Query(selection): Query<HalfHalfSelection>,
) -> impl IntoResponse {
    let menu = state.catalog().half_half_menu();

    HalfHalfPreviewTemplate {
        preview: menu.preview(selection.first(), selection.second()),
    }
}

/// Compose the selected halves and add the pizza to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(selection): Form<HalfHalfSelection>,
) -> Result<Redirect> {
    let menu = state.catalog().half_half_menu();

    let candidate = match menu.compose(&selection.first, &selection.second) {
        Ok(candidate) => candidate,
        Err(e) => {
            push_notice(&session, Notice::error(e.to_string())).await?;
            return Ok(Redirect::to("/half-half"));
        }
    };

    tracing::debug!(name = %candidate.name, price = %candidate.price, "Adding half & half");
    let mut cart = load_cart(&session).await;
    cart.add_line(candidate);
    save_cart(&session, &cart).await?;
    push_notice(&session, Notice::added(HALF_HALF_PLACEHOLDER)).await?;

    add_breadcrumb(
        "cart",
        "Added half & half",
        Some(&[("first", &selection.first), ("second", &selection.second)]),
    );

    Ok(Redirect::to("/"))
}
