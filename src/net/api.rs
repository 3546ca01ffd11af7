//! REST client for the Chirp backend.
//!
//! Every call goes through [`ApiClient::send`], which attaches the stored
//! credential token as `Authorization: Bearer <token>` when one exists and
//! classifies the response into `Ok(T)`, `AuthDenied` or `Failed`.
//!
//! ERROR HANDLING
//! ==============
//! The client never clears tokens or navigates. Callers that act on behalf
//! of a view route results through `SessionManager::authorized`, which owns
//! the reaction to `AuthDenied`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, ApiResult, Failure};
use super::types::{
    LoginRequest, LoginResponse, NewTweet, Notification, ProfileUpdate, RegisterRequest, Trend, Tweet, UserProfile,
    UserSummary, error_message,
};
use crate::config::{ClientConfig, ConfigError};
use crate::state::token::TokenStore;

/// HTTP client bound to one backend and one token slot.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Build a client for `config.api_url` that reads credentials from `tokens`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails to build.
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ConfigError> {
        let base = Url::parse(&config.api_url).map_err(|_| ConfigError::InvalidApiUrl(config.api_url.clone()))?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidApiUrl(config.api_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base, tokens })
    }

    /// The token slot this client reads from.
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// `GET /auth/me`: identity behind the stored token.
    pub async fn current_user(&self) -> ApiResult<UserSummary> {
        self.get(&["auth", "me"]).await
    }

    /// `POST /auth/login`: exchange credentials for a token and user.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.post(&["auth", "login"], &LoginRequest { email, password })
            .await
    }

    /// `POST /auth/register`: create an account. Does not sign in.
    pub async fn register(&self, name: &str, username: &str, email: &str, password: &str) -> ApiResult<Value> {
        self.post(&["auth", "register"], &RegisterRequest { name, username, email, password })
            .await
    }

    // =========================================================================
    // USERS
    // =========================================================================

    /// `GET /users/{username}`.
    pub async fn user_profile(&self, username: &str) -> ApiResult<UserProfile> {
        self.get(&["users", username]).await
    }

    /// `PUT /users/profile`.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Value> {
        let url = self.url(&["users", "profile"])?;
        self.send(Method::PUT, url, Some(to_body(update)?)).await
    }

    /// `POST /users/{id}/follow`.
    pub async fn follow(&self, user_id: &str) -> ApiResult<Value> {
        self.post_empty(&["users", user_id, "follow"]).await
    }

    /// `POST /users/{id}/unfollow`.
    pub async fn unfollow(&self, user_id: &str) -> ApiResult<Value> {
        self.post_empty(&["users", user_id, "unfollow"]).await
    }

    /// `GET /users/{username}/tweets`.
    pub async fn user_tweets(&self, username: &str) -> ApiResult<Vec<Tweet>> {
        self.get(&["users", username, "tweets"]).await
    }

    /// `GET /users/suggestions`.
    pub async fn suggested_users(&self) -> ApiResult<Vec<UserSummary>> {
        self.get(&["users", "suggestions"]).await
    }

    // =========================================================================
    // TWEETS
    // =========================================================================

    /// `POST /tweets`: new tweet, or a reply when `reply_to` is set.
    pub async fn create_tweet(&self, content: &str, reply_to: Option<&str>) -> ApiResult<Tweet> {
        let body = NewTweet { content: content.to_owned(), reply_to: reply_to.map(str::to_owned) };
        self.post(&["tweets"], &body).await
    }

    /// `GET /tweets/timeline`.
    pub async fn timeline(&self) -> ApiResult<Vec<Tweet>> {
        self.get(&["tweets", "timeline"]).await
    }

    /// `GET /tweets/{id}`.
    pub async fn tweet(&self, tweet_id: &str) -> ApiResult<Tweet> {
        self.get(&["tweets", tweet_id]).await
    }

    /// `GET /tweets/{id}/replies`.
    pub async fn tweet_replies(&self, tweet_id: &str) -> ApiResult<Vec<Tweet>> {
        self.get(&["tweets", tweet_id, "replies"]).await
    }

    pub async fn like(&self, tweet_id: &str) -> ApiResult<Value> {
        self.post_empty(&["tweets", tweet_id, "like"]).await
    }

    pub async fn unlike(&self, tweet_id: &str) -> ApiResult<Value> {
        self.post_empty(&["tweets", tweet_id, "unlike"]).await
    }

    pub async fn retweet(&self, tweet_id: &str) -> ApiResult<Value> {
        self.post_empty(&["tweets", tweet_id, "retweet"]).await
    }

    pub async fn unretweet(&self, tweet_id: &str) -> ApiResult<Value> {
        self.post_empty(&["tweets", tweet_id, "unretweet"]).await
    }

    // =========================================================================
    // EXPLORE / SEARCH
    // =========================================================================

    /// `GET /tweets/explore`.
    pub async fn explore(&self) -> ApiResult<Vec<Tweet>> {
        self.get(&["tweets", "explore"]).await
    }

    /// `GET /search?q=...`.
    pub async fn search(&self, query: &str) -> ApiResult<Vec<Tweet>> {
        let mut url = self.url(&["search"])?;
        url.query_pairs_mut().append_pair("q", query);
        self.send(Method::GET, url, None).await
    }

    /// `GET /trends`.
    pub async fn trends(&self) -> ApiResult<Vec<Trend>> {
        self.get(&["trends"]).await
    }

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================

    /// `GET /notifications`.
    pub async fn notifications(&self) -> ApiResult<Vec<Notification>> {
        self.get(&["notifications"]).await
    }

    /// `POST /notifications/{id}/read`.
    pub async fn mark_notification_read(&self, notification_id: &str) -> ApiResult<Value> {
        self.post_empty(&["notifications", notification_id, "read"])
            .await
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    /// `{base}/api/{segments...}` with each segment percent-encoded.
    pub(crate) fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Failed(Failure::local("backend URL cannot carry a path")))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let url = self.url(segments)?;
        self.send(Method::GET, url, None).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, segments: &[&str], body: &B) -> ApiResult<T> {
        let url = self.url(segments)?;
        self.send(Method::POST, url, Some(to_body(body)?)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let url = self.url(segments)?;
        self.send(Method::POST, url, None).await
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, url: Url, body: Option<Value>) -> ApiResult<T> {
        let path = url.path().to_owned();
        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = self.tokens.load() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "request failed");
            ApiError::Failed(Failure::transport())
        })?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            tracing::warn!(%method, %path, status, error = %e, "response body read failed");
            ApiError::Failed(Failure::status(status, None))
        })?;

        tracing::debug!(%method, %path, status, "response");
        decode_response(status, &text)
    }
}

fn to_body<B: Serialize>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Failed(Failure::local(format!("request encoding failed: {e}"))))
}

/// Classify a response: `401` is `AuthDenied`, other non-2xx is `Failed`,
/// 2xx decodes the body (an empty body decodes as JSON `null`).
pub(crate) fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
    if status == 401 {
        return Err(ApiError::AuthDenied { message: error_message(body) });
    }
    if !(200..300).contains(&status) {
        return Err(ApiError::Failed(Failure::status(status, error_message(body))));
    }
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(status, error = %e, "response decode failed");
        ApiError::Failed(Failure::status(status, None))
    })
}
