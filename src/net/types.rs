//! Wire DTOs for the Chirp REST API.
//!
//! DESIGN
//! ======
//! Field names mirror the backend's camelCase JSON (with Mongo-style `_id`).
//! Counters and flags default when absent so partially populated payloads
//! (e.g. embedded authors) still decode.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Minimal identity used for display: session user, tweet authors, senders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Backend user identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Handle, shown as `@username`.
    pub username: String,
    /// Avatar image URL, if set.
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl UserSummary {
    /// `@handle` form used throughout the views.
    #[must_use]
    pub fn handle(&self) -> String {
        format!("@{}", self.username)
    }
}

/// Full profile as returned by `GET /users/{username}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserSummary,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Follower count.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub followers: i64,
    /// Following count.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub following: i64,
    /// Whether the session user follows this profile.
    #[serde(default)]
    pub is_following: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A tweet (chirp), reply or retweet entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    /// Author.
    pub user: UserSummary,
    /// ISO-8601 creation timestamp as sent by the backend.
    pub created_at: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub like_count: i64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub retweet_count: i64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub reply_count: i64,
    /// Whether the session user liked this tweet.
    #[serde(default)]
    pub is_liked: bool,
    /// Whether the session user retweeted this tweet.
    #[serde(default)]
    pub is_retweeted: bool,
    /// Whether this timeline entry is a retweet of someone else's tweet.
    #[serde(default)]
    pub is_retweet: bool,
    #[serde(default)]
    pub retweeted_by: Option<UserSummary>,
    #[serde(default)]
    pub reply_to: Option<ReplyTo>,
}

/// Parent reference of a reply. The backend sends either the bare id or a
/// populated parent tweet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyTo {
    Id(String),
    Tweet(ReplyTarget),
}

impl ReplyTo {
    /// Handle of the replied-to author, when the parent is populated.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Tweet(target) => target.user.as_ref().map(|user| user.username.as_str()),
        }
    }
}

/// Populated parent tweet embedded in a reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTarget {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

/// Kind of activity a notification reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Retweet,
    Mention,
    Follow,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// User whose action produced the notification.
    pub sender: UserSummary,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: String,
}

/// Trending hashtag shown in the side panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    #[serde(rename = "_id")]
    pub id: String,
    pub hashtag: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub tweet_count: i64,
}

/// `POST /auth/login` response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /tweets` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTweet {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// `PUT /users/profile` body, as edited on the profile edit view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub profile_image: String,
}

impl From<&UserProfile> for ProfileUpdate {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.user.name.clone(),
            bio: profile.bio.clone().unwrap_or_default(),
            location: profile.location.clone().unwrap_or_default(),
            website: profile.website.clone().unwrap_or_default(),
            profile_image: profile.user.profile_image.clone().unwrap_or_default(),
        }
    }
}

/// Error body shape: `{ "message": "..." }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extract the backend's `message` from an error response body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .map(|message| message.trim().to_owned())
        .filter(|message| !message.is_empty())
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(0),
        serde_json::Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(int);
            }
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            if let Some(float) = number.as_f64()
                && float.is_finite()
                && float.fract() == 0.0
                && float >= i64::MIN as f64
                && float <= i64::MAX as f64
            {
                return Ok(float as i64);
            }
            Err(D::Error::custom("expected integer-compatible number"))
        }
        _ => Err(D::Error::custom("expected number")),
    }
}
