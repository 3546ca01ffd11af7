//! Route guard policies.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page-level view applies the same two checks once the session has
//! resolved: protected views bounce anonymous users to `/login`, and the
//! login/register views bounce signed-in users to `/home`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::router::{DEFAULT_AUTHENTICATED_ROUTE, ENTRY_ROUTE, Route, RouteAccess};
use crate::state::auth::SessionState;

/// What a view should do with the current session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still loading; render nothing meaningful yet.
    Wait,
    Render,
    Redirect(Route),
}

/// Anonymous user on a protected view.
#[must_use]
pub fn should_redirect_unauth(state: &SessionState) -> bool {
    !state.is_loading() && state.user.is_none()
}

/// Signed-in user on a login/register view.
#[must_use]
pub fn should_redirect_authed(state: &SessionState) -> bool {
    !state.is_loading() && state.user.is_some()
}

#[must_use]
pub fn evaluate(access: RouteAccess, state: &SessionState) -> GuardDecision {
    if state.is_loading() {
        return GuardDecision::Wait;
    }
    match access {
        RouteAccess::Protected if should_redirect_unauth(state) => GuardDecision::Redirect(ENTRY_ROUTE),
        RouteAccess::AuthOnly if should_redirect_authed(state) => GuardDecision::Redirect(DEFAULT_AUTHENTICATED_ROUTE),
        _ => GuardDecision::Render,
    }
}
