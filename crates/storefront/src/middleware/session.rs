//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions over a bounded moka
//! cache. A visitor's cart lives in their session, so a restart empties
//! every cart. Records are evicted once their expiry passes or when the
//! cache is full.

use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "comanda_session";

/// Session expiry time in seconds (12 hours).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Most sessions held at once; the least recently used go first.
const SESSION_MAX_CAPACITY: u64 = 10_000;

/// Create the in-memory session store.
#[must_use]
pub fn create_session_store() -> MokaStore {
    MokaStore::new(Some(SESSION_MAX_CAPACITY))
}

/// Create the session layer with an in-memory store.
///
/// # Arguments
///
/// * `secure` - Whether the cookie should be marked `Secure` (HTTPS only)
#[must_use]
pub fn create_session_layer(secure: bool) -> SessionManagerLayer<MokaStore> {
    SessionManagerLayer::new(create_session_store())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
