//! estatedesk-core - Core types and traits for the estatedesk API client.

pub mod credential;
pub mod error;
pub mod identity;
pub mod request;
pub mod traits;
pub mod types;

pub use credential::{Credential, LoginCredentials};
pub use error::Error;
pub use identity::UserIdentity;
pub use request::{ApiResponse, Method, RequestEnvelope};
pub use traits::{CredentialStore, MemoryCredentialStore, Navigator, StaticNavigator};
pub use types::{ApiUrl, Route};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
