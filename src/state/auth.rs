#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::UserSummary;

/// Whether the startup credential check has finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Loading,
    Resolved,
}

/// Who is logged in, as seen by every view.
///
/// Starts `Loading` with no user; the session manager resolves it once at
/// startup and keeps `user` in step with the stored token afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserSummary>,
    pub status: SessionStatus,
}

impl SessionState {
    #[must_use]
    pub fn resolved(user: Option<UserSummary>) -> Self {
        Self { user, status: SessionStatus::Resolved }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
