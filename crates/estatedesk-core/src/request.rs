//! Outbound request envelope and response types.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;
use crate::error::{Error, InvalidInputError, TransportError};

/// HTTP method of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(InvalidInputError::Other {
                message: format!("unsupported HTTP method '{}'", s),
            }
            .into()),
        }
    }
}

/// One logical API call.
///
/// The envelope is owned by the caller and replayed verbatim if the
/// credential has to be renewed; `already_retried` is set before the replay
/// so the same call is never renewed twice.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    already_retried: bool,
}

impl RequestEnvelope {
    /// Create an envelope for `method` on `path` (relative to the API base).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            already_retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append an extra request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn with_json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize and attach a JSON body.
    pub fn with_json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("request body is not serializable: {}", e),
        })?;
        Ok(self.with_json_value(value))
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Whether this call has already been replayed after a renewal.
    pub fn already_retried(&self) -> bool {
        self.already_retried
    }

    /// Mark the envelope as replayed. There is no way to unset it.
    pub fn mark_retried(&mut self) {
        self.already_retried = true;
    }

    /// Check that the path can be joined onto the API base URL.
    pub fn validate(&self) -> Result<()> {
        let reason = if self.path.trim().is_empty() {
            "path is empty"
        } else if self.path.contains("://") {
            "expected a path relative to the API base, not a URL"
        } else if self.path.chars().any(char::is_whitespace) {
            "path contains whitespace"
        } else {
            return Ok(());
        };

        Err(InvalidInputError::Path {
            value: self.path.clone(),
            reason: reason.to_string(),
        }
        .into())
    }

    /// Returns true if this envelope targets `endpoint`.
    ///
    /// Query strings and trailing slashes are ignored on both sides.
    pub fn targets(&self, endpoint: &str) -> bool {
        normalize_path(&self.path) == normalize_path(endpoint)
    }
}

/// Strip a query string and trailing slashes, and ensure a leading slash.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_matches('/');
    format!("/{}", trimmed)
}

/// A 2xx reply from the API.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            Error::Transport(TransportError::Decode {
                message: e.to_string(),
            })
        })
    }
}
