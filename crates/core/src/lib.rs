//! Comanda Core - menu, cart and order rules.
//!
//! This crate holds the domain of the Comanda storefront:
//! - catalog records as the menu backend serves them
//! - the visitor cart and the half & half composite pizza
//! - promotion eligibility and opening-hours derivation
//! - order validation and the WhatsApp hand-off message
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. Callers pass the current weekday or local time in,
//! which keeps every rule testable with fixed inputs.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids and whole-unit prices
//! - [`catalog`] - Categories, products, promotions and menu sections
//! - [`cart`] - Cart engine
//! - [`half_half`] - Half & half composer and preview
//! - [`hours`] - Site configuration and "open now"
//! - [`order`] - Order validation and message formatting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod half_half;
pub mod hours;
pub mod order;
pub mod types;

pub use cart::{Cart, CartLine, HalfPair, LineCandidate};
pub use catalog::{
    Category, MenuSection, Product, Promotion, VariantError, build_sections,
    featured_promotions,
};
pub use half_half::{Flavor, HalfHalfError, HalfHalfMenu, HalfHalfPreview};
pub use hours::{SiteConfig, TimeOfDay};
pub use order::{DeliveryMethod, HandOff, OrderRecord, OrderRequest, OrderValidationError};
pub use types::*;
