//! Session lifecycle: shared handle, phase changes, and auth operations
//!
//! The token and the principal live behind one lock so they are always set
//! and cleared together. [`SessionStore`] is the only writer; every other
//! component holds a [`SessionHandle`] and reads the token at send time.

use std::sync::{Arc, RwLock};

use serde::Deserialize;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::http::HttpClient;
use crate::models::{AuthPayload, NewAccount, PasswordChange, Principal, ProfileUpdate};
use crate::token_store::TokenStore;

/// Lifecycle phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

struct SessionState {
    token: Option<String>,
    principal: Option<Principal>,
}

struct SessionInner {
    state: RwLock<SessionState>,
    store: Box<dyn TokenStore>,
    phase_tx: watch::Sender<SessionPhase>,
}

/// Shared read handle to the current session
///
/// Cloned into every component that sends requests. Carries the one
/// process-wide authorization-failure handler: [`SessionHandle::invalidate`].
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

impl SessionHandle {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Unauthenticated);
        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(SessionState {
                    token: None,
                    principal: None,
                }),
                store,
                phase_tx,
            }),
        }
    }

    /// Current bearer token; read at send time by the transport.
    pub fn bearer_token(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .expect("session state lock poisoned")
            .token
            .clone()
    }

    /// Current authenticated identity, if any.
    pub fn principal(&self) -> Option<Principal> {
        self.inner
            .state
            .read()
            .expect("session state lock poisoned")
            .principal
            .clone()
    }

    pub fn phase(&self) -> SessionPhase {
        *self.inner.phase_tx.borrow()
    }

    /// Subscribe to phase changes; forced teardown emits exactly one
    /// `Unauthenticated` event regardless of how many requests hit a 401.
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.inner.phase_tx.subscribe()
    }

    /// Tear down token and principal together.
    ///
    /// Returns true when this call performed the teardown; concurrent
    /// callers observe false and cause no second event. The persisted token
    /// is cleared on a best-effort basis.
    pub fn invalidate(&self) -> bool {
        {
            let mut state = self.inner.state.write().expect("session state lock poisoned");
            if state.token.is_none() && state.principal.is_none() {
                return false;
            }
            state.token = None;
            state.principal = None;
        }
        if let Err(e) = self.inner.store.clear() {
            warn!("failed to clear persisted token: {e:#}");
        }
        self.inner.phase_tx.send_replace(SessionPhase::Unauthenticated);
        info!("session invalidated");
        true
    }

    fn establish(&self, token: String, principal: Principal) {
        if let Err(e) = self.inner.store.save(&token) {
            warn!("failed to persist bearer token: {e:#}");
        }
        {
            let mut state = self.inner.state.write().expect("session state lock poisoned");
            state.token = Some(token);
            state.principal = Some(principal);
        }
        self.inner.phase_tx.send_replace(SessionPhase::Authenticated);
    }

    /// Adopt a persisted token while the profile fetch is in flight. The
    /// token may exist without a principal for that one request cycle only.
    fn adopt_token(&self, token: String) {
        self.inner
            .state
            .write()
            .expect("session state lock poisoned")
            .token = Some(token);
        self.inner.phase_tx.send_replace(SessionPhase::Authenticating);
    }

    fn set_principal(&self, principal: Principal) {
        self.inner
            .state
            .write()
            .expect("session state lock poisoned")
            .principal = Some(principal);
        self.inner.phase_tx.send_replace(SessionPhase::Authenticated);
    }

    fn replace_token(&self, token: String) {
        if let Err(e) = self.inner.store.save(&token) {
            warn!("failed to persist bearer token: {e:#}");
        }
        self.inner
            .state
            .write()
            .expect("session state lock poisoned")
            .token = Some(token);
    }

    fn persisted_token(&self) -> Option<String> {
        match self.inner.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!("failed to read persisted token: {e:#}");
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct ProfileEnvelope {
    user: Principal,
}

#[derive(Deserialize)]
struct RefreshedToken {
    token: String,
}

/// Auth operations over the HTTP transport; the single writer of the session
pub struct SessionStore {
    http: HttpClient,
    handle: SessionHandle,
}

impl SessionStore {
    pub fn new(http: HttpClient, handle: SessionHandle) -> Self {
        Self { http, handle }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Authenticate with credentials and establish the session.
    ///
    /// A failure leaves any existing session state untouched; the call is
    /// sent without a bearer so a credentials 401 cannot tear it down.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Principal> {
        let payload: AuthPayload = self
            .http
            .post_public(
                "auth/login",
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await?;

        info!("logged in as {} ({:?})", payload.user.email, payload.user.role);
        self.handle.establish(payload.token, payload.user.clone());
        Ok(payload.user)
    }

    /// Create an account and establish the session.
    ///
    /// Server-side validation failures surface as
    /// [`ApiError::Validation`](crate::error::ApiError::Validation) with
    /// every field's messages intact.
    pub async fn register(&self, account: &NewAccount) -> ApiResult<Principal> {
        let payload: AuthPayload = self.http.post_public("auth/register", account).await?;

        info!("registered account {}", payload.user.email);
        self.handle.establish(payload.token, payload.user.clone());
        Ok(payload.user)
    }

    /// Resume a persisted session at process start.
    ///
    /// Never propagates request failures: a rejected token is cleared from
    /// storage and the session stays unauthenticated. Returns whether a
    /// session was established.
    pub async fn bootstrap(&self) -> bool {
        let Some(token) = self.handle.persisted_token() else {
            return false;
        };

        self.handle.adopt_token(token);
        match self.refresh_profile().await {
            Ok(_) => true,
            Err(e) => {
                warn!("session bootstrap failed: {e}");
                // A 401 already tore the session down; anything else must not
                // leave a token without a principal behind.
                self.handle.invalidate();
                false
            }
        }
    }

    /// Fetch the current profile and refresh the cached principal.
    pub async fn refresh_profile(&self) -> ApiResult<Principal> {
        let profile: ProfileEnvelope = self.http.get("auth/me", &[]).await?;
        self.handle.set_principal(profile.user.clone());
        Ok(profile.user)
    }

    /// Best-effort server logout followed by unconditional local teardown.
    pub async fn logout(&self) {
        if let Err(e) = self.http.post_unit("auth/logout", &serde_json::json!({})).await {
            warn!("server logout failed, clearing local session anyway: {e}");
        }
        self.handle.invalidate();
    }

    /// Exchange the current token for a fresh one, keeping the principal.
    pub async fn refresh_token(&self) -> ApiResult<()> {
        let refreshed: RefreshedToken = self
            .http
            .post("auth/refresh", &serde_json::json!({}))
            .await?;
        self.handle.replace_token(refreshed.token);
        Ok(())
    }

    /// Update profile fields and refresh the cached principal with the
    /// server-confirmed representation.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Principal> {
        let profile: ProfileEnvelope = self.http.put("auth/profile", update).await?;
        self.handle.set_principal(profile.user.clone());
        Ok(profile.user)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> ApiResult<()> {
        self.http.put_unit("auth/password", change).await
    }
}
