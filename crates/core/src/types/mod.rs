//! Core types for Comanda.
//!
//! This module provides type-safe wrappers for ids and prices.

pub mod id;
pub mod price;

pub use id::*;
pub use price::Price;
