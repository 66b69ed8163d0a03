//! Comanda Storefront library.
//!
//! The restaurant menu site as a library, so the integration tests can
//! drive the router against a stub menu backend.
//!
//! # Modules
//!
//! - [`backend`] - Menu backend trait and its HTTP client
//! - [`catalog`] - Shared catalog snapshot with per-source staleness guard
//! - [`sync`] - Startup load and periodic refresh of the catalog
//! - [`services`] - Order submission
//! - [`routes`] - Axum handlers and the application router

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod sync;
