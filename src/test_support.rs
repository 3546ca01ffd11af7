//! In-process mock of the Chirp backend for async tests.
//!
//! Serves a small slice of the REST API on `127.0.0.1:0` with axum and
//! records the `Authorization` header of every request it sees.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::net::api::ApiClient;
use crate::router::History;
use crate::state::session::SessionManager;
use crate::state::token::{MemoryTokenStore, TokenStore};

/// Token the mock accepts from the start, bound to `ada`.
pub const VALID_TOKEN: &str = "valid-token";
/// Token the mock never accepts.
pub const STALE_TOKEN: &str = "stale-token";
/// Token minted by a successful login.
pub const LOGIN_TOKEN: &str = "login-token";
/// Id that makes action endpoints fail with a 500.
pub const BROKEN_ID: &str = "broken";

#[derive(Default)]
pub struct MockState {
    valid_tokens: Mutex<HashSet<String>>,
    seen: Mutex<Vec<(String, Option<String>)>>,
    me_calls: AtomicUsize,
}

impl MockState {
    /// Invalidate every token, as if the backend expired all sessions.
    pub fn revoke_all(&self) {
        self.valid_tokens.lock().unwrap().clear();
    }

    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    /// `(path, Authorization header)` for every request, in order.
    pub fn seen(&self) -> Vec<(String, Option<String>)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn auth_header_for(&self, path: &str) -> Option<Option<String>> {
        self.seen()
            .into_iter()
            .rev()
            .find(|(seen_path, _)| seen_path == path)
            .map(|(_, auth)| auth)
    }

    fn record(&self, path: &str, headers: &HeaderMap) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        self.seen.lock().unwrap().push((path.to_owned(), auth));
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| self.valid_tokens.lock().unwrap().contains(token))
    }
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        state.valid_tokens.lock().unwrap().insert(VALID_TOKEN.to_owned());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock backend should bind");
        let addr = listener.local_addr().expect("mock backend addr");
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend failed");
        });
        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.url()).expect("mock URL is valid")
    }

    pub fn client(&self, tokens: Arc<dyn TokenStore>) -> ApiClient {
        ApiClient::new(&self.config(), tokens).expect("client should build")
    }

    /// Session manager wired to this backend, plus the history it navigates.
    pub fn session(&self, tokens: Arc<dyn TokenStore>) -> (SessionManager, Arc<History>) {
        let history = Arc::new(History::new());
        let session = SessionManager::new(self.client(tokens), history.clone());
        (session, history)
    }

    /// Session manager whose slot already holds `token`.
    pub fn session_with_token(&self, token: &str) -> (SessionManager, Arc<History>, Arc<MemoryTokenStore>) {
        let tokens = Arc::new(MemoryTokenStore::with_token(token));
        let (session, history) = self.session(tokens.clone());
        (session, history, tokens)
    }
}

pub fn ada() -> Value {
    json!({ "_id": "u1", "name": "Ada Lovelace", "username": "ada", "profileImage": null })
}

pub fn grace() -> Value {
    json!({ "_id": "u2", "name": "Grace Hopper", "username": "grace" })
}

pub fn tweet(id: &str, content: &str) -> Value {
    json!({
        "_id": id,
        "content": content,
        "user": grace(),
        "createdAt": "2024-03-01T10:00:00.000Z",
        "likeCount": 2,
        "retweetCount": 1,
        "replyCount": 0,
        "isLiked": false,
        "isRetweeted": false
    })
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/tweets", post(create_tweet))
        .route("/api/tweets/timeline", get(timeline))
        .route("/api/tweets/explore", get(timeline))
        .route("/api/tweets/{id}", get(show_tweet))
        .route("/api/tweets/{id}/{action}", get(tweet_replies).post(ok_action))
        .route("/api/search", get(search))
        .route("/api/trends", get(trends))
        .route("/api/notifications", get(notifications))
        .route("/api/notifications/{id}/{action}", post(ok_action))
        .route("/api/users/suggestions", get(suggestions))
        .route("/api/users/profile", put(update_profile))
        .route("/api/users/{key}", get(profile))
        .route("/api/users/{key}/{action}", get(user_tweets).post(ok_action))
        .with_state(state)
}

fn denied() -> Response {
    (StatusCode::UNAUTHORIZED, axum::Json(json!({ "message": "Not authorized, token failed" }))).into_response()
}

fn ok(body: Value) -> Response {
    axum::Json(body).into_response()
}

/// Record the request and reject it unless it carries a valid bearer token.
fn gate(state: &MockState, path: &str, headers: &HeaderMap) -> Option<Response> {
    state.record(path, headers);
    if state.authorized(headers) { None } else { Some(denied()) }
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.me_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(rejection) = gate(&state, "/api/auth/me", &headers) {
        return rejection;
    }
    ok(ada())
}

async fn login(State(state): State<Arc<MockState>>, headers: HeaderMap, axum::Json(body): axum::Json<Value>) -> Response {
    state.record("/api/auth/login", &headers);
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    if email == Some("a@b.com") && password == Some("x") {
        state.valid_tokens.lock().unwrap().insert(LOGIN_TOKEN.to_owned());
        return ok(json!({ "token": LOGIN_TOKEN, "user": ada() }));
    }
    (StatusCode::UNAUTHORIZED, axum::Json(json!({ "message": "Invalid email or password" }))).into_response()
}

async fn register(State(state): State<Arc<MockState>>, headers: HeaderMap, axum::Json(body): axum::Json<Value>) -> Response {
    state.record("/api/auth/register", &headers);
    if body.get("username").and_then(Value::as_str) == Some("taken") {
        return (StatusCode::BAD_REQUEST, axum::Json(json!({ "message": "User already exists" }))).into_response();
    }
    (StatusCode::CREATED, axum::Json(json!({ "_id": "u9", "name": body["name"], "username": body["username"] })))
        .into_response()
}

async fn create_tweet(State(state): State<Arc<MockState>>, headers: HeaderMap, axum::Json(body): axum::Json<Value>) -> Response {
    if let Some(rejection) = gate(&state, "/api/tweets", &headers) {
        return rejection;
    }
    let mut created = tweet("t-new", body["content"].as_str().unwrap_or_default());
    created["user"] = ada();
    if let Some(parent) = body.get("replyTo") {
        created["replyTo"] = parent.clone();
    }
    (StatusCode::CREATED, axum::Json(created)).into_response()
}

async fn timeline(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(rejection) = gate(&state, "/api/tweets/timeline", &headers) {
        return rejection;
    }
    ok(json!([tweet("t1", "first chirp"), tweet("t2", "second chirp")]))
}

async fn show_tweet(State(state): State<Arc<MockState>>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Some(rejection) = gate(&state, &format!("/api/tweets/{id}"), &headers) {
        return rejection;
    }
    if id == "missing" {
        return (StatusCode::NOT_FOUND, axum::Json(json!({ "message": "Tweet not found" }))).into_response();
    }
    ok(tweet(&id, "detail"))
}

async fn tweet_replies(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path((id, action)): Path<(String, String)>,
) -> Response {
    if let Some(rejection) = gate(&state, &format!("/api/tweets/{id}/{action}"), &headers) {
        return rejection;
    }
    ok(json!([{ "_id": "r1", "content": "a reply", "user": ada(), "createdAt": "2024-03-02T10:00:00.000Z", "replyTo": id }]))
}

/// Shared handler for like/unlike/retweet/follow/read style actions.
async fn ok_action(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path((id, action)): Path<(String, String)>,
) -> Response {
    if let Some(rejection) = gate(&state, &format!("/{id}/{action}"), &headers) {
        return rejection;
    }
    if id == BROKEN_ID {
        return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(json!({ "message": "Server error" }))).into_response();
    }
    ok(json!({ "message": format!("{action} ok") }))
}

async fn search(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Some(rejection) = gate(&state, "/api/search", &headers) {
        return rejection;
    }
    let q = params.get("q").cloned().unwrap_or_default();
    ok(json!([tweet("s1", &q)]))
}

async fn trends(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("/api/trends", &headers);
    (StatusCode::SERVICE_UNAVAILABLE, axum::Json(json!({ "message": "Trends unavailable" }))).into_response()
}

async fn notifications(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(rejection) = gate(&state, "/api/notifications", &headers) {
        return rejection;
    }
    ok(json!([
        { "_id": "n1", "type": "like", "sender": grace(), "message": "liked your chirp", "read": false, "createdAt": "2024-03-01T10:00:00.000Z" },
        { "_id": "n2", "type": "follow", "sender": grace(), "message": "followed you", "read": true, "createdAt": "2024-03-01T09:00:00.000Z" },
        { "_id": BROKEN_ID, "type": "mention", "sender": grace(), "message": "mentioned you", "read": false, "createdAt": "2024-03-01T08:00:00.000Z" }
    ]))
}

async fn suggestions(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Some(rejection) = gate(&state, "/api/users/suggestions", &headers) {
        return rejection;
    }
    ok(json!([grace(), { "_id": BROKEN_ID, "name": "Broken", "username": "broken" }]))
}

async fn update_profile(State(state): State<Arc<MockState>>, headers: HeaderMap, axum::Json(body): axum::Json<Value>) -> Response {
    if let Some(rejection) = gate(&state, "/api/users/profile", &headers) {
        return rejection;
    }
    let mut updated = ada();
    updated["name"] = body["name"].clone();
    ok(updated)
}

async fn profile(State(state): State<Arc<MockState>>, headers: HeaderMap, Path(key): Path<String>) -> Response {
    if let Some(rejection) = gate(&state, &format!("/api/users/{key}"), &headers) {
        return rejection;
    }
    let id = if key == BROKEN_ID { BROKEN_ID } else { "u2" };
    ok(json!({
        "_id": id,
        "name": "Grace Hopper",
        "username": key,
        "bio": "COBOL",
        "followers": 10,
        "following": 3,
        "isFollowing": false
    }))
}

async fn user_tweets(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path((key, action)): Path<(String, String)>,
) -> Response {
    if let Some(rejection) = gate(&state, &format!("/api/users/{key}/{action}"), &headers) {
        return rejection;
    }
    ok(json!([tweet("t1", "first chirp")]))
}
