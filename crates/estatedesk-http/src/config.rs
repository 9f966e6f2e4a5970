//! Client configuration.

use std::time::Duration;

use estatedesk_core::ApiUrl;

/// Default login path.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

/// Default logout path.
pub const DEFAULT_LOGOUT_PATH: &str = "/auth/logout";

/// Default credential renewal path.
pub const DEFAULT_RENEWAL_PATH: &str = "/auth/refresh-token";

/// Default bound on a single renewal call.
pub const DEFAULT_RENEWAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed authentication endpoint paths, relative to the API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub logout: String,
    pub renewal: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_PATH.to_string(),
            logout: DEFAULT_LOGOUT_PATH.to_string(),
            renewal: DEFAULT_RENEWAL_PATH.to_string(),
        }
    }
}

/// Configuration for [`ApiClient`](crate::ApiClient).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use estatedesk_core::ApiUrl;
/// use estatedesk_http::ClientConfig;
///
/// let config = ClientConfig::new(ApiUrl::new("https://rent.example.com/api").unwrap())
///     .with_renewal_timeout(Some(Duration::from_secs(5)));
/// assert_eq!(config.endpoints.renewal, "/auth/refresh-token");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: ApiUrl,
    pub endpoints: Endpoints,
    /// Bound on the renewal call. Expiry counts as a renewal failure.
    /// `None` waits indefinitely.
    pub renewal_timeout: Option<Duration>,
    /// Per-request timeout applied by the HTTP client. `None` disables it.
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_url: ApiUrl) -> Self {
        Self {
            api_url,
            endpoints: Endpoints::default(),
            renewal_timeout: Some(DEFAULT_RENEWAL_TIMEOUT),
            request_timeout: None,
            user_agent: concat!("estatedesk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_renewal_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.renewal_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
