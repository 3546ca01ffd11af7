use super::*;
use crate::net::types::UserSummary;

fn signed_in() -> SessionState {
    SessionState::resolved(Some(UserSummary {
        id: "u1".to_owned(),
        name: "Alice".to_owned(),
        username: "alice".to_owned(),
        profile_image: None,
    }))
}

#[test]
fn should_redirect_unauth_when_not_loading_and_user_missing() {
    let state = SessionState::resolved(None);
    assert!(should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_while_loading() {
    let state = SessionState::default();
    assert!(!should_redirect_unauth(&state));
    assert!(!should_redirect_authed(&state));
}

#[test]
fn should_not_redirect_when_user_exists() {
    assert!(!should_redirect_unauth(&signed_in()));
    assert!(should_redirect_authed(&signed_in()));
}

#[test]
fn evaluate_waits_while_loading() {
    let state = SessionState::default();
    assert_eq!(evaluate(RouteAccess::Protected, &state), GuardDecision::Wait);
    assert_eq!(evaluate(RouteAccess::AuthOnly, &state), GuardDecision::Wait);
}

#[test]
fn evaluate_protected_view() {
    assert_eq!(evaluate(RouteAccess::Protected, &SessionState::resolved(None)), GuardDecision::Redirect(Route::Login));
    assert_eq!(evaluate(RouteAccess::Protected, &signed_in()), GuardDecision::Render);
}

#[test]
fn evaluate_auth_only_view() {
    assert_eq!(evaluate(RouteAccess::AuthOnly, &SessionState::resolved(None)), GuardDecision::Render);
    assert_eq!(evaluate(RouteAccess::AuthOnly, &signed_in()), GuardDecision::Redirect(Route::Home));
}
