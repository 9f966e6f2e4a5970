//! Core client types.
//!
//! These types enforce their invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod api_url;
mod route;

pub use api_url::ApiUrl;
pub use route::{PUBLIC_ROUTE_PREFIXES, Route};
