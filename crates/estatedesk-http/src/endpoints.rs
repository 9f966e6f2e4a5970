//! Authentication endpoint request/response types.

use serde::{Deserialize, Serialize};

use estatedesk_core::UserIdentity;

/// Request body for the login endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from the login endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserIdentity>,
}

/// Response from the renewal endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct RenewalResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Error body returned by the API on non-2xx replies.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
