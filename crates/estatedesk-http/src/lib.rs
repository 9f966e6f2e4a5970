//! estatedesk-http - Session-renewing HTTP client for the estatedesk API.

mod classifier;
mod client;
mod config;
mod coordinator;
mod dispatcher;
mod endpoints;
mod teardown;

pub use classifier::{Classification, PassReason, classify};
pub use client::{ApiClient, ApiClientBuilder};
pub use config::{
    ClientConfig, DEFAULT_LOGIN_PATH, DEFAULT_LOGOUT_PATH, DEFAULT_RENEWAL_PATH,
    DEFAULT_RENEWAL_TIMEOUT, Endpoints,
};
pub use coordinator::RenewalCoordinator;
pub use teardown::SessionEvent;
