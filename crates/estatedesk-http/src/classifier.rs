//! Decides whether a failed request is eligible for credential renewal.

use estatedesk_core::{Error, RequestEnvelope};

use crate::config::Endpoints;

/// Outcome of classifying a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Renew the credential and replay the request.
    Renewable,
    /// Hand the error back to the caller untouched.
    PassThrough(PassReason),
}

/// Why a failure was not renewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    /// Not a 401 reply.
    NotUnauthenticated,
    /// The request was already replayed once after a renewal.
    AlreadyRetried,
    /// The failing request was the renewal call itself.
    RenewalEndpoint,
    /// Logout is allowed to fail fast.
    LogoutEndpoint,
    /// The user is on login/signup; there is no session to renew.
    PublicRoute,
}

/// Classify `error`, returned for `envelope`.
///
/// A failure is renewable only if it is a 401, the envelope has not been
/// replayed, the target is neither the renewal nor the logout endpoint, and
/// the current route is not public.
pub fn classify(
    error: &Error,
    envelope: &RequestEnvelope,
    endpoints: &Endpoints,
    route_is_public: bool,
) -> Classification {
    let reason = if !error.is_unauthenticated() {
        PassReason::NotUnauthenticated
    } else if envelope.already_retried() {
        PassReason::AlreadyRetried
    } else if envelope.targets(&endpoints.renewal) {
        PassReason::RenewalEndpoint
    } else if envelope.targets(&endpoints.logout) {
        PassReason::LogoutEndpoint
    } else if route_is_public {
        PassReason::PublicRoute
    } else {
        return Classification::Renewable;
    };

    Classification::PassThrough(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use estatedesk_core::error::{ProtocolError, TransportError};

    fn unauthenticated() -> Error {
        Error::Protocol(ProtocolError::new(401, Some("TokenExpired".into()), None))
    }

    #[test]
    fn expired_credential_on_private_route_is_renewable() {
        let envelope = RequestEnvelope::get("/tenants");
        assert_eq!(
            classify(&unauthenticated(), &envelope, &Endpoints::default(), false),
            Classification::Renewable
        );
    }

    #[test]
    fn other_statuses_pass_through() {
        let envelope = RequestEnvelope::get("/tenants");
        for status in [400, 403, 404, 500, 503] {
            let err = Error::Protocol(ProtocolError::new(status, None, None));
            assert_eq!(
                classify(&err, &envelope, &Endpoints::default(), false),
                Classification::PassThrough(PassReason::NotUnauthenticated)
            );
        }

        let err = Error::Transport(TransportError::Connection {
            message: "refused".into(),
        });
        assert_eq!(
            classify(&err, &envelope, &Endpoints::default(), false),
            Classification::PassThrough(PassReason::NotUnauthenticated)
        );
    }

    #[test]
    fn replayed_request_is_not_renewed_again() {
        let mut envelope = RequestEnvelope::get("/tenants");
        envelope.mark_retried();
        assert_eq!(
            classify(&unauthenticated(), &envelope, &Endpoints::default(), false),
            Classification::PassThrough(PassReason::AlreadyRetried)
        );
    }

    #[test]
    fn renewal_and_logout_endpoints_are_excluded() {
        let endpoints = Endpoints::default();

        let renewal = RequestEnvelope::post("/auth/refresh-token");
        assert_eq!(
            classify(&unauthenticated(), &renewal, &endpoints, false),
            Classification::PassThrough(PassReason::RenewalEndpoint)
        );

        let logout = RequestEnvelope::post("/auth/logout/");
        assert_eq!(
            classify(&unauthenticated(), &logout, &endpoints, false),
            Classification::PassThrough(PassReason::LogoutEndpoint)
        );
    }

    #[test]
    fn custom_endpoints_are_respected() {
        let endpoints = Endpoints {
            renewal: "/session/renew".into(),
            ..Endpoints::default()
        };
        let envelope = RequestEnvelope::post("/session/renew");
        assert_eq!(
            classify(&unauthenticated(), &envelope, &endpoints, false),
            Classification::PassThrough(PassReason::RenewalEndpoint)
        );
        // The default path is now an ordinary endpoint.
        let envelope = RequestEnvelope::post("/auth/refresh-token");
        assert_eq!(
            classify(&unauthenticated(), &envelope, &endpoints, false),
            Classification::Renewable
        );
    }

    #[test]
    fn public_route_blocks_renewal() {
        let envelope = RequestEnvelope::get("/properties");
        assert_eq!(
            classify(&unauthenticated(), &envelope, &Endpoints::default(), true),
            Classification::PassThrough(PassReason::PublicRoute)
        );
    }
}
