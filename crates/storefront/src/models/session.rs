//! Session-related types.
//!
//! A visitor's cart and their pending notice are stored in the session.

use chrono::{DateTime, TimeDelta, Utc};
use comanda_core::Cart;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session keys.
pub mod keys {
    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for the notice shown on the next render.
    pub const NOTICE: &str = "notice";
}

/// Confirmation label shown after an item is added.
pub const ADDED_CONFIRMATION: &str = "✓ Agregado!";

/// How long an add confirmation stays visible.
const CONFIRMATION_TTL_MS: i64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Transient confirmation.
    Confirmation,
    /// Validation or persistence failure, shown once.
    Error,
}

/// One-shot message carried from a POST to the page that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    /// Name of the menu entry the notice is about, if any.
    pub item: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl Notice {
    /// Confirmation for an added cart line.
    #[must_use]
    pub fn added(item: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Confirmation,
            text: ADDED_CONFIRMATION.to_string(),
            item: Some(item.into()),
            issued_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
            item: None,
            issued_at: Utc::now(),
        }
    }

    /// Whether the notice should still be shown at `now`.
    ///
    /// Errors are shown once regardless of age; confirmations only while
    /// they are fresh.
    #[must_use]
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        match self.kind {
            NoticeKind::Error => true,
            NoticeKind::Confirmation => {
                now.signed_duration_since(self.issued_at)
                    < TimeDelta::milliseconds(CONFIRMATION_TTL_MS)
            }
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, NoticeKind::Error)
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the visitor's cart; a missing or unreadable entry is an empty cart.
pub async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Store the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}

/// Queue a notice for the next render, replacing any pending one.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn push_notice(
    session: &Session,
    notice: Notice,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::NOTICE, notice).await
}

/// Take the pending notice if it is still visible.
pub async fn take_notice(session: &Session) -> Option<Notice> {
    session
        .remove::<Notice>(keys::NOTICE)
        .await
        .ok()
        .flatten()
        .filter(|notice| notice.is_visible_at(Utc::now()))
}
