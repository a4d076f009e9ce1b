//! In-memory stand-in for the OPTIKORM backend.
//!
//! Serves the auth, resource, calculation and root endpoints, records every request it sees,
//! and can be told to misbehave through [`Behavior`].
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::{
    atomic::{AtomicI64, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

pub mod prelude {
    pub use crate::{spawn, Behavior, CalculateBody, MockServer, MockState, RecordedRequest};
    pub use axum::http::Method;
}

/// Switches for failure modes of the mock.
#[derive(Debug, Clone, Default)]
pub struct Behavior {
    /// Store the account but answer registration with 400, as for an existing username.
    pub register_conflict: bool,
    /// Answer registration with 201 and a body that is not JSON.
    pub garbled_register: bool,
    pub reject_login: bool,
    pub reject_nutrients: bool,
    pub reject_fish: bool,
    /// Answer 503 once more than this many requests per second arrive.
    pub max_tps: Option<NonZeroU32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub fish_id: i64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateBody {
    pub fish_selections: Vec<Selection>,
}

pub struct MockState {
    behavior: Behavior,
    limiter: Option<DefaultDirectRateLimiter>,
    next_id: AtomicI64,
    accounts: Mutex<HashMap<String, String>>,
    tokens: Mutex<HashSet<String>>,
    nutrients: Mutex<Vec<Value>>,
    fish: Mutex<Vec<Value>>,
    feeds: Mutex<Vec<Value>>,
    calculations: Mutex<Vec<CalculateBody>>,
    log: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            limiter: behavior.max_tps.map(rate_limiter),
            behavior,
            next_id: AtomicI64::new(1),
            accounts: Mutex::default(),
            tokens: Mutex::default(),
            nutrients: Mutex::default(),
            fish: Mutex::default(),
            feeds: Mutex::default(),
            calculations: Mutex::default(),
            log: Mutex::default(),
        }
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.log).clone()
    }

    pub fn count(&self, method: &Method, path: &str) -> usize {
        lock(&self.log)
            .iter()
            .filter(|r| r.method == *method && r.path == path)
            .count()
    }

    /// Bodies of every calculation request that reached the handler.
    pub fn calculations(&self) -> Vec<CalculateBody> {
        lock(&self.calculations).clone()
    }

    pub fn has_account(&self, username: &str) -> bool {
        lock(&self.accounts).contains_key(username)
    }

    fn issue_token(&self) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        lock(&self.tokens).insert(token.clone());
        token
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Token "))
            .is_some_and(|token| lock(&self.tokens).contains(token))
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

pub type SharedState = Arc<MockState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/", get(api_root))
        .route("/api/auth/register/", post(register))
        .route("/api/auth/login/", post(login))
        .route("/api/nutrients/", get(list_nutrients).post(create_nutrient))
        .route("/api/fish/", get(list_fish).post(create_fish))
        .route("/api/feeds/", get(list_feeds).post(create_feed))
        .route("/api/calculate/", post(calculate))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A mock bound to an ephemeral local port.
pub struct MockServer {
    pub addr: SocketAddr,
    pub state: SharedState,
}

impl MockServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Serve a fresh mock on `127.0.0.1:0` in the background.
pub async fn spawn(behavior: Behavior) -> std::io::Result<MockServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = Arc::new(MockState::new(behavior));
    let app = router(state.clone());

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!("Mock service stopped: {err}");
        }
    });

    Ok(MockServer { addr, state })
}

pub async fn run(addr: SocketAddr, behavior: Behavior) -> std::io::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    let app = router(Arc::new(MockState::new(behavior)));
    axum::serve(listener, app).await
}

async fn record(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    metrics::counter!("mock_service_requests").increment(1);
    TPS_MEASURE.fetch_add(1, Ordering::Relaxed);

    lock(&state.log).push(RecordedRequest {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    if let Some(limiter) = &state.limiter {
        if limiter.check().is_err() {
            debug!("Over capacity");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    }

    next.run(request).await
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn register(State(state): State<SharedState>, Json(creds): Json<Credentials>) -> Response {
    {
        let mut accounts = lock(&state.accounts);
        if accounts.contains_key(&creds.username) {
            return bad_request("A user with that username already exists.");
        }
        accounts.insert(creds.username, creds.password);
    }

    if state.behavior.register_conflict {
        return bad_request("A user with that username already exists.");
    }
    if state.behavior.garbled_register {
        return (StatusCode::CREATED, "<html>registered</html>").into_response();
    }

    (StatusCode::CREATED, Json(json!({ "token": state.issue_token() }))).into_response()
}

async fn login(State(state): State<SharedState>, Json(creds): Json<Credentials>) -> Response {
    if state.behavior.reject_login {
        return bad_request("Unable to log in with provided credentials.");
    }

    let valid = lock(&state.accounts)
        .get(&creds.username)
        .is_some_and(|password| *password == creds.password);
    if !valid {
        return bad_request("Unable to log in with provided credentials.");
    }

    Json(json!({ "token": state.issue_token() })).into_response()
}

#[derive(Debug, Deserialize)]
struct NutrientBody {
    name: String,
    unit: String,
}

async fn create_nutrient(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<NutrientBody>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if state.behavior.reject_nutrients {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let nutrient = json!({ "id": state.next_id(), "name": body.name, "unit": body.unit });
    lock(&state.nutrients).push(nutrient.clone());
    (StatusCode::CREATED, Json(nutrient)).into_response()
}

#[derive(Debug, Deserialize)]
struct FishBody {
    name: String,
    nutrients: HashMap<String, String>,
}

async fn create_fish(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<FishBody>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if state.behavior.reject_fish {
        return bad_request("Fish rejected.");
    }
    if !known_nutrients(&state, &body.nutrients) {
        return bad_request("Unknown nutrient.");
    }

    let fish = json!({ "id": state.next_id(), "name": body.name, "nutrients": body.nutrients });
    lock(&state.fish).push(fish.clone());
    (StatusCode::CREATED, Json(fish)).into_response()
}

#[derive(Debug, Deserialize)]
struct FeedBody {
    name: String,
    price: String,
    nutrients: HashMap<String, String>,
}

async fn create_feed(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<FeedBody>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if !known_nutrients(&state, &body.nutrients) {
        return bad_request("Unknown nutrient.");
    }

    let feed = json!({
        "id": state.next_id(),
        "name": body.name,
        "price": body.price,
        "nutrients": body.nutrients,
    });
    lock(&state.feeds).push(feed.clone());
    (StatusCode::CREATED, Json(feed)).into_response()
}

async fn list_nutrients(State(state): State<SharedState>) -> Json<Vec<Value>> {
    Json(lock(&state.nutrients).clone())
}

async fn list_fish(State(state): State<SharedState>) -> Json<Vec<Value>> {
    Json(lock(&state.fish).clone())
}

async fn list_feeds(State(state): State<SharedState>) -> Json<Vec<Value>> {
    Json(lock(&state.feeds).clone())
}

async fn calculate(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<CalculateBody>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    lock(&state.calculations).push(body.clone());

    if body.fish_selections.is_empty() {
        return bad_request("fish_selections must not be empty.");
    }

    let known: HashSet<i64> = lock(&state.fish)
        .iter()
        .filter_map(|f| f["id"].as_i64())
        .collect();
    if body.fish_selections.iter().any(|s| !known.contains(&s.fish_id)) {
        return bad_request("Unknown fish.");
    }

    let total_weight: f64 = body.fish_selections.iter().map(|s| s.weight).sum();
    Json(json!({ "total_weight": total_weight, "fish": body.fish_selections.len() })).into_response()
}

async fn api_root() -> Json<Value> {
    Json(json!({
        "nutrients": "/api/nutrients/",
        "fish": "/api/fish/",
        "feeds": "/api/feeds/",
        "calculate": "/api/calculate/",
    }))
}

/** Utils **/

fn known_nutrients(state: &MockState, nutrients: &HashMap<String, String>) -> bool {
    let known: HashSet<String> = lock(&state.nutrients)
        .iter()
        .filter_map(|n| n["id"].as_i64())
        .map(|id| id.to_string())
        .collect();
    nutrients.keys().all(|id| known.contains(id))
}

fn bad_request(detail: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Authentication credentials were not provided." })),
    )
        .into_response()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn rate_limiter(tps: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(tps))
}

/** TPS Printer **/

static TPS_MEASURE: AtomicU64 = AtomicU64::new(0);

pub async fn tps_measure_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let transactions = TPS_MEASURE.swap(0, Ordering::Relaxed);
        println!("{transactions} TPS");
    }
}
