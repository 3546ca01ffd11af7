//! Route table and navigation.
//!
//! DESIGN
//! ======
//! Routes mirror the product's screens. Each route declares its access
//! policy; the guards in [`crate::util::auth`] turn that policy plus the
//! session state into a render/redirect decision.
//!
//! Navigation is a trait so the session manager can force a redirect
//! without knowing how views are presented.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::fmt;
use std::sync::Mutex;

/// Access policy of a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    /// Requires a logged-in user.
    Protected,
    /// Only for logged-out users (login, register).
    AuthOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Home,
    Explore { query: Option<String> },
    Notifications,
    Profile { username: String },
    EditProfile,
    Tweet { id: String },
}

/// Base used to parse app-relative paths; never contacted.
const APP_ORIGIN: &str = "http://chirp.invalid/";

/// Unauthenticated entry view.
pub const ENTRY_ROUTE: Route = Route::Login;
/// Where authenticated users land.
pub const DEFAULT_AUTHENTICATED_ROUTE: Route = Route::Home;

impl Route {
    #[must_use]
    pub fn access(&self) -> RouteAccess {
        match self {
            Self::Login | Self::Register => RouteAccess::AuthOnly,
            _ => RouteAccess::Protected,
        }
    }

    /// URL path of the route, including the explore query string.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::Home => "/home".to_owned(),
            Self::Explore { query: None } => "/explore".to_owned(),
            Self::Explore { query: Some(query) } => reqwest::Url::parse_with_params(APP_ORIGIN, [("q", query)])
                .ok()
                .and_then(|url| url.query().map(|encoded| format!("/explore?{encoded}")))
                .unwrap_or_else(|| "/explore".to_owned()),
            Self::Notifications => "/notifications".to_owned(),
            Self::Profile { username } => segment_path("profile", username),
            Self::EditProfile => "/profile/edit".to_owned(),
            Self::Tweet { id } => segment_path("tweet", id),
        }
    }

    /// Parse an application path such as `/profile/ada` or `/explore?q=rust`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let url = reqwest::Url::parse(APP_ORIGIN).ok()?.join(path).ok()?;
        let segments: Vec<&str> = url.path().trim_matches('/').split('/').collect();
        match segments.as_slice() {
            [""] | ["home"] => Some(Self::Home),
            ["login"] => Some(Self::Login),
            ["register"] => Some(Self::Register),
            ["notifications"] => Some(Self::Notifications),
            ["explore"] => {
                let query = url
                    .query_pairs()
                    .find(|(key, _)| key == "q")
                    .map(|(_, value)| value.into_owned())
                    .filter(|value| !value.is_empty());
                Some(Self::Explore { query })
            }
            ["profile", "edit"] => Some(Self::EditProfile),
            ["profile", username] if !username.is_empty() => Some(Self::Profile { username: decode_segment(username)? }),
            ["tweet", id] if !id.is_empty() => Some(Self::Tweet { id: decode_segment(id)? }),
            _ => None,
        }
    }
}

/// `/{prefix}/{value}` with `value` percent-encoded as one segment.
fn segment_path(prefix: &str, value: &str) -> String {
    let Ok(mut url) = reqwest::Url::parse(APP_ORIGIN) else {
        return format!("/{prefix}/{value}");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(prefix).push(value);
    }
    url.path().to_owned()
}

fn decode_segment(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(std::borrow::Cow::into_owned)
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Moves the user between views.
pub trait Navigator: Send + Sync {
    /// Push `route` on top of the current history.
    fn navigate(&self, route: Route);

    /// Full navigation reset: drop all history and show `route`.
    fn reset(&self, route: Route);
}

/// In-memory history; the last entry is the view shown on the next render.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<Route>>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.lock().last().cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Route>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route) {
        tracing::debug!(to = %route, "navigate");
        self.lock().push(route);
    }

    fn reset(&self, route: Route) {
        tracing::debug!(to = %route, "navigation reset");
        let mut entries = self.lock();
        entries.clear();
        entries.push(route);
    }
}
