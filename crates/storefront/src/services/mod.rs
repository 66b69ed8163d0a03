//! Business logic services for storefront.
//!
//! # Services
//!
//! - `order` - Order validation, persistence and WhatsApp hand-off

pub mod order;

pub use order::{OrderError, OrderService, PERSIST_FAILED_MESSAGE};
