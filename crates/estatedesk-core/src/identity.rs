//! Signed-in user identity.

use serde::{Deserialize, Serialize};

/// The user returned by the login endpoint.
///
/// Saved next to the credential for display; cleared with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Server-side user id.
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}
