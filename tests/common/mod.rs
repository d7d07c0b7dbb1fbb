#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use solar_storefront::{
    client::ApiClient,
    storage::{AUTH_TOKEN_KEY, KeyValueStore, MemoryStore, REFRESH_TOKEN_KEY, SharedStore},
};

const JWT_SECRET: &str = "storefront-test-secret";
pub const REFRESH_TOKEN: &str = "refresh-abc";
pub const PASSWORD: &str = "sunshine";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    exp: usize,
    jti: String,
}

pub fn mint_token(user_id: i64, role: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("mint token")
}

/// In-process stand-in for the storefront REST API.
pub struct MockState {
    pub valid_token: Mutex<String>,
    pub refresh_succeeds: AtomicBool,
    pub logout_fails: AtomicBool,
    pub refresh_calls: AtomicUsize,
    pub order_list_calls: AtomicUsize,
    pub product_calls: AtomicUsize,
    pub seen_tokens: Mutex<Vec<Option<String>>>,
    pub created_orders: Mutex<Vec<Value>>,
    pub enquiries: Mutex<Vec<Value>>,
    pub uploaded_bytes: AtomicUsize,
    pub reject_orders: AtomicBool,
    pub forbidden_calls: AtomicUsize,
}

impl MockState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            valid_token: Mutex::new(mint_token(1, "customer")),
            refresh_succeeds: AtomicBool::new(true),
            logout_fails: AtomicBool::new(false),
            refresh_calls: AtomicUsize::new(0),
            order_list_calls: AtomicUsize::new(0),
            product_calls: AtomicUsize::new(0),
            seen_tokens: Mutex::new(Vec::new()),
            created_orders: Mutex::new(Vec::new()),
            enquiries: Mutex::new(Vec::new()),
            uploaded_bytes: AtomicUsize::new(0),
            reject_orders: AtomicBool::new(false),
            forbidden_calls: AtomicUsize::new(0),
        })
    }

    pub fn current_token(&self) -> String {
        self.valid_token.lock().clone()
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        bearer(headers).is_some_and(|token| token == *self.valid_token.lock())
    }
}

pub struct MockApi {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = MockState::new();
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock api");
        let addr = listener.local_addr().expect("mock api addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock api server");
        });
        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    pub fn client(&self, store: SharedStore) -> ApiClient {
        ApiClient::with_http(reqwest::Client::new(), &self.base_url, store)
    }

    /// A client whose stored tokens are `token` and the known refresh token.
    pub async fn client_with_tokens(&self, token: &str) -> (ApiClient, SharedStore) {
        let store = MemoryStore::shared();
        store
            .set(AUTH_TOKEN_KEY, token.to_string())
            .await
            .expect("seed token");
        store
            .set(REFRESH_TOKEN_KEY, REFRESH_TOKEN.to_string())
            .await
            .expect("seed refresh token");
        (self.client(store.clone()), store)
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn ok(data: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "success": true, "data": data })))
}

fn fail(status: StatusCode, code: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "success": false, "error": { "code": code, "message": message } })),
    )
}

pub fn user_json(role: &str) -> Value {
    json!({ "id": 1, "email": "thandi@example.com", "name": "Thandi", "role": role })
}

pub fn product_json(id: i64, price: &str, status: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Mono panel {id}"),
        "description": "Monocrystalline PV module",
        "category": "solar-panels",
        "price": price,
        "images": [format!("/img/{id}.jpg")],
        "features": ["25 year warranty"],
        "specifications": { "power": "450W" },
        "status": status,
        "rating": 4.5,
        "reviewCount": 12
    })
}

fn catalogue() -> Vec<Value> {
    vec![
        product_json(7, "10.00", "available"),
        product_json(8, "2499.50", "available"),
        product_json(9, "15999.00", "out_of_stock"),
    ]
}

pub fn router(state: Arc<MockState>) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route("/orders", post(create_order))
        .route("/orders/my-orders", get(my_orders))
        .route("/orders/track", get(track_order))
        .route("/enquiries", post(create_enquiry))
        .route("/notifications/unread-count", get(unread_count))
        .route("/upload/file", post(upload_file))
        .route("/content/{key}", get(get_content))
        .route("/reports/restricted", get(restricted))
        .route("/boom", get(boom));
    Router::new().nest("/api", api).with_state(state)
}

async fn issue_tokens(state: &MockState, role: &str) -> (StatusCode, Json<Value>) {
    let token = mint_token(1, role);
    *state.valid_token.lock() = token.clone();
    ok(json!({ "user": user_json(role), "token": token, "refreshToken": REFRESH_TOKEN }))
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] != PASSWORD {
        return fail(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", "Invalid email or password");
    }
    let role = if body["email"] == "admin@example.com" { "admin" } else { "customer" };
    issue_tokens(&state, role).await
}

async fn register(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "taken@example.com" {
        return ok_failure("EMAIL_TAKEN", "Email is already taken");
    }
    issue_tokens(&state, "customer").await
}

fn ok_failure(code: &str, message: &str) -> (StatusCode, Json<Value>) {
    fail(StatusCode::OK, code, message)
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if !state.refresh_succeeds.load(Ordering::SeqCst) || body["refreshToken"] != REFRESH_TOKEN {
        return fail(StatusCode::UNAUTHORIZED, "INVALID_REFRESH", "Refresh token expired");
    }
    let token = mint_token(1, "customer");
    *state.valid_token.lock() = token.clone();
    ok(json!({ "token": token }))
}

async fn me(State(state): State<Arc<MockState>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !state.authorized(&headers) {
        return fail(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Token expired");
    }
    ok(user_json("customer"))
}

async fn logout(State(state): State<Arc<MockState>>) -> (StatusCode, Json<Value>) {
    if state.logout_fails.load(Ordering::SeqCst) {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "logout exploded");
    }
    ok(json!({}))
}

#[derive(Deserialize)]
struct ListParams {
    search: Option<String>,
}

async fn list_products(
    State(state): State<Arc<MockState>>,
    Query(params): Query<ListParams>,
) -> (StatusCode, Json<Value>) {
    state.product_calls.fetch_add(1, Ordering::SeqCst);
    let items: Vec<Value> = catalogue()
        .into_iter()
        .filter(|p| match &params.search {
            Some(search) => p["name"].as_str().unwrap_or_default().contains(search.as_str()),
            None => true,
        })
        .collect();
    let total = items.len();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": items,
            "meta": { "page": 1, "perPage": 20, "total": total, "totalPages": 1 }
        })),
    )
}

async fn get_product(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    state.product_calls.fetch_add(1, Ordering::SeqCst);
    match catalogue().into_iter().find(|p| p["id"] == id) {
        Some(product) => ok(product),
        None => ok_failure("NOT_FOUND", "Product not found"),
    }
}

fn order_json(id: i64, body: &Value) -> Value {
    let items = body["items"].as_array().cloned().unwrap_or_default();
    let lines: Vec<Value> = items
        .iter()
        .map(|line| {
            let product = catalogue()
                .into_iter()
                .find(|p| p["id"] == line["productId"])
                .unwrap_or_else(|| product_json(0, "0.00", "available"));
            let price: f64 = product["price"].as_str().unwrap_or("0").parse().unwrap_or(0.0);
            let qty = line["quantity"].as_u64().unwrap_or(0) as f64;
            json!({
                "productId": line["productId"],
                "productName": product["name"],
                "quantity": line["quantity"],
                "price": product["price"],
                "total": format!("{:.2}", price * qty)
            })
        })
        .collect();
    let total: f64 = lines
        .iter()
        .map(|l| l["total"].as_str().unwrap_or("0").parse::<f64>().unwrap_or(0.0))
        .sum();
    json!({
        "id": id,
        "orderNumber": format!("SE-{id:05}"),
        "customerName": body["customerName"],
        "customerEmail": body["customerEmail"],
        "items": lines,
        "subtotal": format!("{total:.2}"),
        "total": format!("{total:.2}"),
        "status": "pending",
        "paymentStatus": "pending",
        "shippingAddress": body["shippingAddress"]
    })
}

async fn create_order(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if state.reject_orders.load(Ordering::SeqCst) {
        return ok_failure("OUT_OF_STOCK", "One or more items are out of stock");
    }
    let mut orders = state.created_orders.lock();
    let order = order_json(orders.len() as i64 + 1, &body);
    orders.push(order.clone());
    ok(order)
}

async fn my_orders(State(state): State<Arc<MockState>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    state.order_list_calls.fetch_add(1, Ordering::SeqCst);
    state.seen_tokens.lock().push(bearer(&headers));
    if !state.authorized(&headers) {
        return fail(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Token expired");
    }
    let orders: Vec<Value> = state.created_orders.lock().clone();
    ok(Value::Array(orders))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackParams {
    order_number: String,
}

async fn track_order(
    State(state): State<Arc<MockState>>,
    Query(params): Query<TrackParams>,
) -> (StatusCode, Json<Value>) {
    let orders = state.created_orders.lock();
    match orders.iter().find(|o| o["orderNumber"] == params.order_number.as_str()) {
        Some(order) => ok(order.clone()),
        None => ok_failure("NOT_FOUND", "Order not found"),
    }
}

async fn create_enquiry(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut enquiries = state.enquiries.lock();
    let mut enquiry = body.clone();
    enquiry["id"] = json!(enquiries.len() + 1);
    enquiry["status"] = json!("new");
    enquiry["priority"] = json!("medium");
    enquiries.push(enquiry.clone());
    ok(enquiry)
}

async fn unread_count() -> (StatusCode, Json<Value>) {
    fail(StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", "notifications offline")
}

async fn upload_file(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    let mut file_name = None;
    let mut size = 0usize;
    let mut folder = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            }
            Some("folder") => folder = field.text().await.ok(),
            _ => {}
        }
    }
    state.uploaded_bytes.store(size, Ordering::SeqCst);
    let folder = folder.unwrap_or_else(|| "misc".to_string());
    let name = file_name.unwrap_or_default();
    ok(json!({
        "url": format!("/uploads/{folder}/{name}"),
        "fileName": name,
        "size": size
    }))
}

async fn get_content(Path(key): Path<String>) -> (StatusCode, Json<Value>) {
    ok(json!({ "key": key, "title": "About us", "published": true }))
}

/// Rejects every caller, refreshed token or not.
async fn restricted(State(state): State<Arc<MockState>>) -> (StatusCode, Json<Value>) {
    state.forbidden_calls.fetch_add(1, Ordering::SeqCst);
    fail(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Not allowed")
}

async fn boom() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "kaboom")
}
