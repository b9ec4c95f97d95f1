//! # VK Client
//!
//! [`VkClient`] issues API method calls in one of two modes:
//! - **signed**: the parameters are sorted and signed with the application
//!   secret, then sent over plain HTTP to `api.php`;
//! - **oauth**: the session's access token is attached and the call goes to
//!   `/method/<name>` over HTTPS.
//!
//! A call's parsed JSON body is delivered either to a callback or as an event
//! on the client's own bus (see [`ResponseTarget`]). Grants that fill the
//! session report through events as well: `acquireTokenReady`,
//! `tokenByCodeNotReady` and so on. Transport failures of any kind are emitted
//! on `error` and never returned.

use reqwest::Client;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use crate::{
    auth::{Grant, GrantOutcome, Session, TokenSource},
    config::{ClientConfig, Mode},
    error::{Error, Result},
    event::VkEvent,
    query::Params,
    request::{redact, RequestEnvelope},
    response::ResponseTarget,
    utils::{nonce, timestamp_millis, EventEmitter, ListenerId},
};

/// Capacity of the typed event stream returned by [`VkClient::subscribe`].
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// The main VK client struct.
pub struct VkClient {
    /// Configuration, fixed at construction apart from the mode
    config: ClientConfig,
    /// Request mode; read once when a call starts
    mode: RwLock<Option<Mode>>,
    /// Token, user id and expiry
    session: RwLock<Session>,
    /// Underlying HTTP client
    client: Client,
    /// Broadcast channel for events
    event_sender: broadcast::Sender<VkEvent>,
    /// Named listeners
    emitter: EventEmitter,
}

impl VkClient {
    /// Creates a new client from `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.app_id.is_empty() {
            return Err(Error::Message("application id must not be empty".into()));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            mode: RwLock::new(config.mode),
            config,
            session: RwLock::new(Session::default()),
            client,
            event_sender: tx,
            emitter: EventEmitter::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // Events

    /// Emits an event to the typed stream and to named listeners.
    fn emit(&self, event: VkEvent) {
        tracing::debug!(event = event.name(), "emitting event");
        let payload = event.payload();
        let name = event.name().to_string();
        let _ = self.event_sender.send(event);
        self.emitter.emit(&name, &payload);
    }

    /// Registers a listener for events named `event`.
    pub fn on(
        &self,
        event: &str,
        callback: impl Fn(&Value) + Send + Sync + 'static,
    ) -> ListenerId {
        self.emitter.on(event, callback)
    }

    /// Registers a listener that fires at most once.
    pub fn once(
        &self,
        event: &str,
        callback: impl Fn(&Value) + Send + Sync + 'static,
    ) -> ListenerId {
        self.emitter.once(event, callback)
    }

    /// Drops every listener for `event`.
    pub fn off(&self, event: &str) {
        self.emitter.off(event)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.emitter.remove_listener(id)
    }

    /// Typed stream of every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<VkEvent> {
        self.event_sender.subscribe()
    }

    // Mode and session

    pub async fn mode(&self) -> Option<Mode> {
        *self.mode.read().await
    }

    /// Switches the mode for calls started afterwards.
    pub async fn change_mode(&self, mode: Mode) {
        *self.mode.write().await = Some(mode);
    }

    /// Sets the access token directly.
    pub async fn set_token<T: Into<String>>(&self, token: T) {
        self.session.write().await.token = Some(token.into());
    }

    pub async fn token(&self) -> Option<String> {
        self.session.read().await.token.clone()
    }

    /// User id from the last code grant.
    pub async fn user_id(&self) -> Option<i64> {
        self.session.read().await.user_id
    }

    /// Token lifetime in seconds from the last code grant.
    pub async fn expires_in(&self) -> Option<u64> {
        self.session.read().await.expires_in
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    // Grants

    /// Password grant. Emits `acquireTokenReady` or `acquireTokenNotReady(body)`.
    pub async fn acquire_token(&self, username: &str, password: &str) -> Result<()> {
        self.run_grant(Grant::Password {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await
    }

    /// Code grant. Emits `tokenByCodeReady` or `tokenByCodeNotReady(body)`.
    pub async fn token_by_code(&self, code: &str) -> Result<()> {
        self.run_grant(Grant::Code(code.to_string())).await
    }

    /// Client-credentials grant. Emits `appServerTokenReady` or `appServerTokenNotReady(body)`.
    pub async fn app_server_token(&self) -> Result<()> {
        self.run_grant(Grant::ClientCredentials).await
    }

    /// Sets a token directly or obtains one through a grant.
    pub async fn set_token_with(&self, source: TokenSource) -> Result<()> {
        match source {
            TokenSource::Token(token) => {
                self.set_token(token).await;
                Ok(())
            }
            TokenSource::Code(code) => self.token_by_code(&code).await,
            TokenSource::ClientCredentials => self.app_server_token().await,
        }
    }

    async fn run_grant(&self, grant: Grant) -> Result<()> {
        let url = grant.url(&self.config);
        let Some(body) = self.fetch(&url).await? else {
            return Ok(());
        };
        let outcome = {
            let mut session = self.session.write().await;
            grant.apply(&mut session, body)
        };
        match &outcome {
            GrantOutcome::Ready => tracing::info!(grant = grant.label(), "access token stored"),
            GrantOutcome::NotReady(body) => {
                tracing::warn!(grant = grant.label(), %body, "token endpoint returned no token")
            }
        }
        self.emit(grant.event(outcome));
        Ok(())
    }

    // Method calls

    /// Calls API `method`.
    ///
    /// Returns [`Error::ModeNotSet`] before any I/O when no mode is chosen,
    /// and [`Error::SerdeJson`] when the body is not JSON. A transport failure
    /// is emitted on `error` and the call resolves `Ok(())` without
    /// delivering anything.
    ///
    /// With `target` as `None` the body is emitted on `done:<method>`.
    pub async fn request(
        &self,
        method: &str,
        params: Option<Params>,
        target: Option<ResponseTarget>,
    ) -> Result<()> {
        let mode = self.mode().await.ok_or(Error::ModeNotSet)?;
        let target = ResponseTarget::resolve(target, method);
        let envelope = RequestEnvelope::new(&self.config, method, params);
        let url = match mode {
            Mode::Signed => envelope.signed_url(&self.config, timestamp_millis(), nonce()),
            Mode::OAuth => {
                let token = self.token().await;
                envelope.oauth_url(&self.config, token.as_deref())
            }
        };

        let Some(body) = self.fetch(&url).await? else {
            return Ok(());
        };
        target.deliver(body, |event| self.emit(event));
        Ok(())
    }

    /// GETs `url` and parses the whole body as JSON, whatever the status.
    ///
    /// `Ok(None)` means the transport failed and `error` was emitted.
    async fn fetch(&self, url: &str) -> Result<Option<Value>> {
        tracing::debug!(url = %redact(url), "GET");
        let bytes = match self.client.get(url).send().await {
            Ok(resp) => {
                tracing::debug!(status = %resp.status(), "response received");
                resp.bytes().await
            }
            Err(e) => Err(e),
        };
        match bytes {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) => {
                tracing::warn!(error = %e, "transport error");
                self.emit(VkEvent::Error(e.to_string()));
                Ok(None)
            }
        }
    }
}
