//! The session-renewing API client.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use estatedesk_core::error::{AuthError, Error, TransportError};
use estatedesk_core::{
    ApiResponse, Credential, CredentialStore, LoginCredentials, MemoryCredentialStore, Navigator,
    RequestEnvelope, Result, StaticNavigator, UserIdentity,
};

use crate::classifier::{Classification, classify};
use crate::config::ClientConfig;
use crate::coordinator::{RenewalCoordinator, Turn};
use crate::dispatcher::Dispatcher;
use crate::endpoints::{LoginRequest, LoginResponse, RenewalResponse};
use crate::teardown::{EVENT_CAPACITY, SessionEvent, SessionTeardown};

/// HTTP client for the estatedesk API.
///
/// Every request carries the stored credential. When a request fails because
/// the credential expired, the client renews it once (however many requests
/// failed at the same time), replays each affected request exactly once, and
/// on renewal failure clears the session and emits [`SessionEvent::Expired`].
///
/// Cheap to clone; clones share the credential store and renewal state.
///
/// # Example
///
/// ```no_run
/// use estatedesk_core::{ApiUrl, LoginCredentials};
/// use estatedesk_http::{ApiClient, ClientConfig};
///
/// # async fn example() -> Result<(), estatedesk_core::Error> {
/// let config = ClientConfig::new(ApiUrl::new("https://rent.example.com/api")?);
/// let client = ApiClient::builder(config).build()?;
///
/// client.login(LoginCredentials::new("manager@example.com", "secret")).await?;
/// let tenants: serde_json::Value = client.get_json("/tenants").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    dispatcher: Dispatcher,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    coordinator: Arc<RenewalCoordinator>,
    teardown: SessionTeardown,
    events: broadcast::Sender<SessionEvent>,
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn CredentialStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    coordinator: Option<Arc<RenewalCoordinator>>,
}

impl ApiClientBuilder {
    /// Use `store` for the bearer credential. Defaults to an in-memory store.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use `navigator` to learn the current route. Defaults to `/`.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Inject the renewal coordinator. Defaults to a fresh one per client.
    pub fn coordinator(mut self, coordinator: Arc<RenewalCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(StaticNavigator::default()));
        let coordinator = self.coordinator.unwrap_or_default();

        let dispatcher = Dispatcher::new(&self.config, store.clone())?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let teardown = SessionTeardown::new(store.clone(), navigator.clone(), events.clone());

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                dispatcher,
                store,
                navigator,
                coordinator,
                teardown,
                events,
            }),
        })
    }
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            store: None,
            navigator: None,
            coordinator: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// The renewal coordinator owned by this client.
    pub fn coordinator(&self) -> &RenewalCoordinator {
        &self.inner.coordinator
    }

    /// Whether a credential is currently stored.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.inner.store.get()?.is_some())
    }

    /// The user saved at the last login, if the session is still live.
    pub fn current_user(&self) -> Result<Option<UserIdentity>> {
        self.inner.store.identity()
    }

    /// Send `envelope`, renewing the credential and replaying once if it
    /// comes back with an expired credential.
    #[instrument(skip(self, envelope), fields(method = %envelope.method(), path = envelope.path()))]
    pub async fn send(&self, mut envelope: RequestEnvelope) -> Result<ApiResponse> {
        let error = match self.inner.dispatcher.send(&envelope).await {
            Ok(response) => return Ok(response),
            Err(error) => error,
        };

        let route_is_public = self.inner.navigator.current_route_is_public();
        match classify(&error, &envelope, &self.inner.config.endpoints, route_is_public) {
            Classification::PassThrough(reason) => {
                debug!(?reason, %error, "Failure is not renewable");
                return Err(error);
            }
            Classification::Renewable => {
                debug!("Credential rejected; joining renewal");
            }
        }

        // Set before suspending so the replay can never start another renewal.
        envelope.mark_retried();
        self.await_renewal().await?;
        self.replay(&envelope).await
    }

    /// Lead a renewal cycle or wait for the one in flight.
    async fn await_renewal(&self) -> Result<()> {
        let guard = match self.inner.coordinator.join() {
            Turn::Wait(rx) => {
                return rx
                    .await
                    .unwrap_or_else(|_| Err(AuthError::RenewalAbandoned.into()));
            }
            Turn::Lead(guard) => guard,
        };

        let outcome = self.renew().await;
        match &outcome {
            Ok(()) => info!("Credential renewed"),
            Err(e) => warn!(error = %e, "Credential renewal failed"),
        }

        // Teardown must finish while the cycle is still open; a failure
        // arriving meanwhile joins it instead of leading a new one.
        let released = guard.finish(&outcome, || match &outcome {
            Ok(()) => self.inner.teardown.renewed(),
            Err(_) => self.inner.teardown.run(),
        });
        debug!(released, "Renewal cycle settled");
        outcome
    }

    /// Issue the single renewal call and store the new credential.
    #[instrument(skip(self))]
    async fn renew(&self) -> Result<()> {
        info!("Renewing credential");
        let envelope = RequestEnvelope::post(self.inner.config.endpoints.renewal.as_str());
        let call = self.inner.dispatcher.send(&envelope);

        let response = match self.inner.config.renewal_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                Err(Error::Transport(TransportError::Timeout {
                    duration_ms: limit.as_millis() as u64,
                }))
            }),
            None => call.await,
        };

        let token = response
            .and_then(|response| response.json::<RenewalResponse>())
            .and_then(|body| match body.token {
                Some(token) if !token.is_empty() => Ok(token),
                _ => Err(AuthError::MissingToken.into()),
            })
            .map_err(|e| Error::Auth(AuthError::RenewalFailed(Box::new(e))))?;

        self.inner.store.set(Credential::new(token))?;
        Ok(())
    }

    /// Re-send a renewed request. The envelope is already marked retried, so
    /// whatever comes back is final.
    async fn replay(&self, envelope: &RequestEnvelope) -> Result<ApiResponse> {
        debug_assert!(envelope.already_retried());
        debug!("Replaying request with renewed credential");
        self.inner.dispatcher.send(envelope).await
    }

    /// Sign in and store the returned credential.
    ///
    /// Login is sent without renewal handling: a 401 here means the supplied
    /// credentials were wrong.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: LoginCredentials) -> Result<Option<UserIdentity>> {
        info!("Logging in");
        let envelope = RequestEnvelope::post(self.inner.config.endpoints.login.as_str())
            .with_json(&LoginRequest {
                email: credentials.email(),
                password: credentials.password(),
            })?;

        let response = self
            .inner
            .dispatcher
            .send(&envelope)
            .await
            .map_err(|e| match e {
                Error::Protocol(p) if p.is_unauthenticated() => {
                    let reason = p.message.clone().unwrap_or_else(|| p.to_string());
                    AuthError::InvalidCredentials(reason).into()
                }
                other => other,
            })?;
        let body: LoginResponse = response.json()?;

        if body.token.is_empty() {
            return Err(AuthError::MissingToken.into());
        }

        self.inner.store.set(Credential::new(body.token))?;
        self.inner.store.set_identity(body.user.clone())?;

        debug!("Logged in");
        Ok(body.user)
    }

    /// Sign out. Local state is cleared even if the server call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        info!("Logging out");
        let envelope = RequestEnvelope::post(self.inner.config.endpoints.logout.as_str());
        if let Err(e) = self.send(envelope).await {
            warn!(error = %e, "Logout request failed; clearing local session anyway");
        }
        self.inner.teardown.clear_local();
        Ok(())
    }

    /// `GET path` and decode the JSON reply.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.send(RequestEnvelope::get(path)).await?.json()
    }

    /// `POST path` with a JSON body and decode the JSON reply.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(RequestEnvelope::post(path).with_json(body)?)
            .await?
            .json()
    }

    /// `PUT path` with a JSON body and decode the JSON reply.
    pub async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(RequestEnvelope::put(path).with_json(body)?)
            .await?
            .json()
    }

    /// `DELETE path`, ignoring the reply body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(RequestEnvelope::delete(path)).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.inner.config.api_url)
            .field("renewing", &self.inner.coordinator.is_renewing())
            .finish()
    }
}
