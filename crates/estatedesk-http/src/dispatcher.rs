//! Request dispatch: attaches the stored credential and sends the request.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use tracing::{debug, instrument, trace};

use estatedesk_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use estatedesk_core::{ApiResponse, ApiUrl, CredentialStore, Method, RequestEnvelope, Result};

use crate::config::ClientConfig;
use crate::endpoints::ErrorBody;

/// Sends envelopes to the API with the current credential attached.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    client: reqwest::Client,
    api_url: ApiUrl,
    store: Arc<dyn CredentialStore>,
    request_timeout: Option<Duration>,
}

impl Dispatcher {
    pub(crate) fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| transport_error(e, config.request_timeout))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            store,
            request_timeout: config.request_timeout,
        })
    }

    /// Send `envelope`, attaching `Authorization: Bearer` when a credential
    /// is stored. Non-2xx replies become [`Error::Protocol`].
    #[instrument(skip(self, envelope), fields(method = %envelope.method(), path = envelope.path()))]
    pub(crate) async fn send(&self, envelope: &RequestEnvelope) -> Result<ApiResponse> {
        envelope.validate()?;
        let url = self.api_url.endpoint_url(envelope.path());
        debug!(retried = envelope.already_retried(), "Dispatching request");

        let mut request = self
            .client
            .request(reqwest_method(envelope.method()), &url)
            .query(envelope.query());

        for (name, value) in envelope.headers() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid_header(name, e))?;
            let value = HeaderValue::from_str(value).map_err(|e| invalid_header(name.as_str(), e))?;
            request = request.header(name, value);
        }

        // Read the store on every send so a replay picks up a renewed credential.
        if let Some(credential) = self.store.get()? {
            let value = HeaderValue::from_str(&credential.bearer())
                .map_err(|e| invalid_header(AUTHORIZATION.as_str(), e))?;
            request = request.header(AUTHORIZATION, value);
        }

        if let Some(body) = envelope.body() {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, self.request_timeout))?;
        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| transport_error(e, self.request_timeout))?;
            Ok(ApiResponse::new(status.as_u16(), body.to_vec()))
        } else {
            Err(Error::Protocol(parse_error_response(response).await))
        }
    }
}

/// Parse the API's JSON error body, tolerating anything else.
pub(crate) async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
    let status = response.status().as_u16();

    match response.json::<ErrorBody>().await {
        Ok(body) => ProtocolError::new(status, body.error, body.message),
        Err(_) => ProtocolError::new(status, None, None),
    }
}

/// Map a reqwest failure. A timeout only carries a duration when the client
/// was built with one; anything else reqwest reports as a timeout is kept as
/// a plain HTTP error.
fn transport_error(err: reqwest::Error, timeout: Option<Duration>) -> Error {
    let transport = match timeout {
        Some(limit) if err.is_timeout() => TransportError::Timeout {
            duration_ms: limit.as_millis() as u64,
        },
        _ if err.is_connect() => TransportError::Connection {
            message: err.to_string(),
        },
        _ if err.is_decode() => TransportError::Decode {
            message: err.to_string(),
        },
        _ => TransportError::Http {
            message: err.to_string(),
        },
    };
    Error::Transport(transport)
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn invalid_header(name: &str, err: impl std::fmt::Display) -> Error {
    InvalidInputError::Other {
        message: format!("invalid header '{}': {}", name, err),
    }
    .into()
}
