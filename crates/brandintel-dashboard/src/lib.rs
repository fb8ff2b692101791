//! Terminal dashboard for the Brand Intelligence API: an HTTP client for the
//! `/v1` routes and fixed-width table rendering of their results.

pub mod client;
pub mod error;
pub mod render;

pub use client::{ApiClient, BrandFilters, ContentFilters, Health, Listing, SignalFilters};
pub use error::{ApiFieldError, DashboardError};
