use super::*;

// =============================================================
// Access policy
// =============================================================

#[test]
fn login_and_register_are_auth_only() {
    assert_eq!(Route::Login.access(), RouteAccess::AuthOnly);
    assert_eq!(Route::Register.access(), RouteAccess::AuthOnly);
}

#[test]
fn content_views_are_protected() {
    let routes = [
        Route::Home,
        Route::Explore { query: None },
        Route::Notifications,
        Route::Profile { username: "ada".to_owned() },
        Route::EditProfile,
        Route::Tweet { id: "t1".to_owned() },
    ];
    for route in routes {
        assert_eq!(route.access(), RouteAccess::Protected, "{route}");
    }
}

#[test]
fn entry_and_default_routes() {
    assert_eq!(ENTRY_ROUTE.path(), "/login");
    assert_eq!(DEFAULT_AUTHENTICATED_ROUTE.path(), "/home");
}

// =============================================================
// Paths
// =============================================================

#[test]
fn explore_query_is_encoded() {
    let route = Route::Explore { query: Some("#rust lang".to_owned()) };
    assert_eq!(route.path(), "/explore?q=%23rust+lang");
}

#[test]
fn parse_round_trips_every_route() {
    let routes = [
        Route::Login,
        Route::Register,
        Route::Home,
        Route::Explore { query: None },
        Route::Explore { query: Some("#rust lang".to_owned()) },
        Route::Notifications,
        Route::Profile { username: "ada".to_owned() },
        Route::EditProfile,
        Route::Tweet { id: "65f0c0ffee".to_owned() },
    ];
    for route in routes {
        assert_eq!(Route::parse(&route.path()), Some(route.clone()), "{route}");
    }
}

#[test]
fn path_segments_are_encoded_and_decoded() {
    let profile = Route::Profile { username: "a b".to_owned() };
    assert_eq!(profile.path(), "/profile/a%20b");
    assert_eq!(Route::parse(&profile.path()), Some(profile));

    let tweet = Route::Tweet { id: "x/y?z".to_owned() };
    assert_eq!(tweet.path(), "/tweet/x%2Fy%3Fz");
    assert_eq!(Route::parse(&tweet.path()), Some(tweet));
}

#[test]
fn parse_root_is_home() {
    assert_eq!(Route::parse("/"), Some(Route::Home));
}

#[test]
fn parse_ignores_trailing_slash() {
    assert_eq!(Route::parse("/notifications/"), Some(Route::Notifications));
}

#[test]
fn parse_empty_query_means_no_query() {
    assert_eq!(Route::parse("/explore?q="), Some(Route::Explore { query: None }));
}

#[test]
fn parse_unknown_paths() {
    assert_eq!(Route::parse("/settings"), None);
    assert_eq!(Route::parse("/profile"), None);
    assert_eq!(Route::parse("/tweet/a/b"), None);
}

// =============================================================
// History
// =============================================================

#[test]
fn history_navigate_pushes() {
    let history = History::new();
    assert!(history.is_empty());
    history.navigate(Route::Home);
    history.navigate(Route::Notifications);
    assert_eq!(history.len(), 2);
    assert_eq!(history.current(), Some(Route::Notifications));
}

#[test]
fn history_reset_drops_previous_entries() {
    let history = History::new();
    history.navigate(Route::Home);
    history.navigate(Route::EditProfile);
    history.reset(Route::Login);
    assert_eq!(history.len(), 1);
    assert_eq!(history.current(), Some(Route::Login));
}
