//! Per-view state for tweets, notifications, profiles and suggestions.
//!
//! DESIGN
//! ======
//! Each action calls the backend through the session's authorization
//! wrapper and only commits the local change once the call succeeds, so a
//! failure leaves the view exactly as it was before the attempt.

#[cfg(test)]
#[path = "feed_test.rs"]
mod feed_test;

use super::session::SessionManager;
use crate::net::error::ApiResult;
use crate::net::types::{Notification, Tweet, UserProfile, UserSummary};

/// A tweet as shown in a list or detail view, with its action toggles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TweetCard {
    pub tweet: Tweet,
}

impl TweetCard {
    #[must_use]
    pub fn new(tweet: Tweet) -> Self {
        Self { tweet }
    }

    /// Like or unlike, depending on the current flag.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the card is unchanged.
    pub async fn toggle_like(&mut self, session: &SessionManager) -> ApiResult<()> {
        let id = self.tweet.id.as_str();
        if self.tweet.is_liked {
            session.authorized(session.api().unlike(id)).await?;
            self.tweet.is_liked = false;
            self.tweet.like_count = (self.tweet.like_count - 1).max(0);
        } else {
            session.authorized(session.api().like(id)).await?;
            self.tweet.is_liked = true;
            self.tweet.like_count += 1;
        }
        Ok(())
    }

    /// Retweet or undo, depending on the current flag.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the card is unchanged.
    pub async fn toggle_retweet(&mut self, session: &SessionManager) -> ApiResult<()> {
        let id = self.tweet.id.as_str();
        if self.tweet.is_retweeted {
            session.authorized(session.api().unretweet(id)).await?;
            self.tweet.is_retweeted = false;
            self.tweet.retweet_count = (self.tweet.retweet_count - 1).max(0);
        } else {
            session.authorized(session.api().retweet(id)).await?;
            self.tweet.is_retweeted = true;
            self.tweet.retweet_count += 1;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationList {
    pub items: Vec<Notification>,
}

impl NotificationList {
    #[must_use]
    pub fn new(items: Vec<Notification>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|item| !item.read).count()
    }

    /// Mark one notification read. Already-read or unknown ids send nothing.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the list is unchanged.
    pub async fn mark_read(&mut self, session: &SessionManager, notification_id: &str) -> ApiResult<()> {
        let Some(index) = self
            .items
            .iter()
            .position(|item| item.id == notification_id && !item.read)
        else {
            return Ok(());
        };
        session
            .authorized(session.api().mark_notification_read(notification_id))
            .await?;
        if let Some(item) = self.items.get_mut(index) {
            item.read = true;
        }
        Ok(())
    }
}

/// Profile header with the follow button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileCard {
    pub profile: UserProfile,
}

impl ProfileCard {
    #[must_use]
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }

    /// Whether this profile belongs to the signed-in user (edit instead of follow).
    #[must_use]
    pub fn is_own(&self, session: &SessionManager) -> bool {
        session
            .user()
            .is_some_and(|user| user.id == self.profile.user.id)
    }

    /// # Errors
    ///
    /// Returns the backend error; the card is unchanged.
    pub async fn follow(&mut self, session: &SessionManager) -> ApiResult<()> {
        session
            .authorized(session.api().follow(&self.profile.user.id))
            .await?;
        self.profile.is_following = true;
        self.profile.followers += 1;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the backend error; the card is unchanged.
    pub async fn unfollow(&mut self, session: &SessionManager) -> ApiResult<()> {
        session
            .authorized(session.api().unfollow(&self.profile.user.id))
            .await?;
        self.profile.is_following = false;
        self.profile.followers = (self.profile.followers - 1).max(0);
        Ok(())
    }
}

/// "Who to follow" panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuggestionList {
    pub users: Vec<UserSummary>,
}

impl SuggestionList {
    #[must_use]
    pub fn new(users: Vec<UserSummary>) -> Self {
        Self { users }
    }

    /// Follow a suggested user and drop them from the panel.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the panel is unchanged.
    pub async fn follow(&mut self, session: &SessionManager, user_id: &str) -> ApiResult<()> {
        session.authorized(session.api().follow(user_id)).await?;
        self.users.retain(|user| user.id != user_id);
        Ok(())
    }
}
