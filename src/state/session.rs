//! Session manager: the single source of truth for "who is logged in".
//!
//! ARCHITECTURE
//! ============
//! The manager is constructed once at startup and shared (`Arc`) with every
//! view. Views read the session through [`SessionManager::state`] or a
//! `watch` receiver; the session changes only through `initialize`, `login`,
//! `logout` and the authorization wrapper [`SessionManager::authorized`].
//!
//! The stored token and the in-memory identity move together: whenever a
//! request is denied for authorization reasons both are cleared and the user
//! is sent back to the entry view.
//!
//! TRADE-OFFS
//! ==========
//! Startup validation failures (network down, backend error, expired token)
//! all resolve to "signed out". Showing the login screen is preferred over
//! surfacing an error the user cannot act on.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OnceCell, watch};

use super::auth::SessionState;
use super::token::{TOKEN_TTL, TokenStore};
use crate::net::api::ApiClient;
use crate::net::error::{ApiError, ApiResult, Failure};
use crate::net::types::UserSummary;
use crate::router::{ENTRY_ROUTE, Navigator, Route};
use crate::util::auth::{GuardDecision, evaluate};

pub struct SessionManager {
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<SessionState>,
    init: OnceCell<()>,
}

impl SessionManager {
    /// New manager in the `Loading` state. Call [`Self::initialize`] before
    /// rendering any gated view.
    #[must_use]
    pub fn new(api: ApiClient, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { api, navigator, state, init: OnceCell::new() }
    }

    /// Client for data calls. Wrap calls in [`Self::authorized`].
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn tokens(&self) -> &Arc<dyn TokenStore> {
        self.api.tokens()
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserSummary> {
        self.state.borrow().user.clone()
    }

    /// Receiver notified on every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Wait until the startup check has resolved and return the session.
    pub async fn resolved(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            // The sender lives in `self`, so the channel cannot close here.
            Err(_) => self.state(),
        }
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Resolve the session from the stored token. Runs once per process;
    /// later and concurrent callers wait for that single run.
    pub async fn initialize(&self) {
        self.init.get_or_init(|| self.resolve_stored_token()).await;
    }

    async fn resolve_stored_token(&self) {
        if self.tokens().load().is_none() {
            tracing::debug!("no stored token; session starts signed out");
            self.set_state(SessionState::resolved(None));
            return;
        }

        match self.api.current_user().await {
            Ok(user) => {
                tracing::info!(username = %user.username, "session restored");
                self.set_state(SessionState::resolved(Some(user)));
            }
            Err(e) => {
                tracing::info!(error = %e, "stored token rejected; signing out");
                self.clear_token();
                self.set_state(SessionState::resolved(None));
            }
        }
    }

    /// Sign in. On success the token is stored for seven days and the
    /// returned user becomes the session identity; on failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Failed`] when the backend rejects the credentials
    /// or the call fails. A `401` here means "wrong credentials", not
    /// "session expired", so it never clears an existing session.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<UserSummary> {
        let response = self
            .api
            .login(email, password)
            .await
            .map_err(|e| ApiError::Failed(e.into_failure()))?;

        self.tokens().store(&response.token, TOKEN_TTL).map_err(|e| {
            tracing::error!(error = %e, "failed to persist token");
            ApiError::Failed(Failure::local("Could not save your session"))
        })?;

        tracing::info!(username = %response.user.username, "logged in");
        self.set_state(SessionState::resolved(Some(response.user.clone())));
        Ok(response.user)
    }

    /// Create an account. The session is left untouched; the user signs in
    /// explicitly afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Failed`] when the backend rejects the registration.
    pub async fn register(&self, name: &str, username: &str, email: &str, password: &str) -> ApiResult<serde_json::Value> {
        self.api
            .register(name, username, email, password)
            .await
            .map_err(|e| ApiError::Failed(e.into_failure()))
    }

    /// Clear the token and identity and reset navigation to the entry view.
    /// Safe to call when already signed out.
    pub fn logout(&self) {
        self.clear_token();
        self.set_state(SessionState::resolved(None));
        tracing::info!("logged out");
        self.navigator.reset(ENTRY_ROUTE);
    }

    // =========================================================================
    // AUTHORIZATION WRAPPER
    // =========================================================================

    /// Await a backend call and apply the authorization policy to its result.
    pub async fn authorized<T>(&self, call: impl Future<Output = ApiResult<T>>) -> ApiResult<T> {
        self.settle(call.await)
    }

    /// Apply the authorization policy to a finished call: `AuthDenied`
    /// clears the token and identity and forces the entry view. The result
    /// is handed back unchanged either way.
    pub fn settle<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(ApiError::AuthDenied { .. }) = &result {
            tracing::warn!("authorization denied; clearing session");
            self.clear_token();
            self.set_state(SessionState::resolved(None));
            self.navigator.reset(ENTRY_ROUTE);
        }
        result
    }

    // =========================================================================
    // ROUTE GUARDS
    // =========================================================================

    /// Wait for the session to resolve, then apply the route's guard.
    /// A redirect is performed through the navigator before returning.
    pub async fn enter(&self, route: &Route) -> GuardDecision {
        let state = self.resolved().await;
        let decision = evaluate(route.access(), &state);
        if let GuardDecision::Redirect(target) = &decision {
            tracing::debug!(from = %route, to = %target, "guard redirect");
            self.navigator.navigate(target.clone());
        }
        decision
    }

    fn set_state(&self, next: SessionState) {
        self.state.send_replace(next);
    }

    fn clear_token(&self) {
        if let Err(e) = self.tokens().clear() {
            tracing::warn!(error = %e, "failed to clear stored token");
        }
    }
}
