//! In-memory stand-in for the parts of the Toshl API the client uses.
//!
//! Behaviour mirrored from the real service:
//! - every route requires `Authorization: Bearer <token>`;
//! - listings are paged by a zero-based `page` parameter and announce more
//!   data with `Link: <...>; rel="next"`;
//! - a filtered listing that matches exactly one item returns that item
//!   without the enclosing array;
//! - creates answer 201 with an empty body and a `Location` header;
//! - failures carry `{"error_id", "description", "fields"?}`.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const DEFAULT_TOKEN: &str = "test-token";
pub const DEFAULT_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub token: String,
    pub page_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Collections keyed by numeric id so listings come back in creation order.
#[derive(Debug, Default)]
pub struct Store {
    pub accounts: BTreeMap<u64, Value>,
    pub categories: BTreeMap<u64, Value>,
    pub entries: BTreeMap<u64, Value>,
    pub tags: BTreeMap<u64, Value>,
    next_id: u64,
}

impl Store {
    /// A few categories and tags; the client has no way to create them.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        for (name, kind) in [("Food", "expense"), ("Travel", "expense"), ("Salary", "income")] {
            let id = store.allocate_id();
            store
                .categories
                .insert(id, json!({"id": id.to_string(), "name": name, "type": kind}));
        }
        for name in ["groceries", "holiday"] {
            let id = store.allocate_id();
            store
                .tags
                .insert(id, json!({"id": id.to_string(), "name": name}));
        }
        store
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<MockConfig>,
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::seeded())),
        config: Arc::new(config),
    };
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/reorder", post(reorder_accounts))
        .route("/accounts/merge", post(merge_accounts))
        .route(
            "/accounts/{id}",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/accounts/{id}/move", post(move_account))
        .route("/categories", get(list_categories))
        .route("/tags", get(list_tags))
        .route("/entries", get(list_entries).post(create_entry))
        .route("/entries/{id}", get(get_entry).put(update_entry))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

/// Toshl-shaped error response.
pub fn api_error(status: StatusCode, error_id: &str, description: String, fields: Option<Value>) -> Response {
    let mut body = json!({"error_id": error_id, "description": description});
    if let Some(fields) = fields {
        body["fields"] = fields;
    }
    (status, Json(body)).into_response()
}

fn not_found(id: &str) -> Response {
    api_error(
        StatusCode::NOT_FOUND,
        "error.object.not_found",
        format!("Object with id {id} not found."),
        None,
    )
}

fn validation_error(fields: Map<String, Value>) -> Response {
    api_error(
        StatusCode::BAD_REQUEST,
        "error.request.validation",
        "Request validation failed.".to_string(),
        Some(Value::Object(fields)),
    )
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.config.token);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return api_error(
            StatusCode::UNAUTHORIZED,
            "error.auth.required",
            "Authorization required.".to_string(),
            None,
        );
    }
    next.run(request).await
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Slice `items` into the requested page and attach a `next` link when more
/// remain. `filtered` enables the single-item quirk.
fn page_response(path: &str, items: Vec<Value>, params: &ListParams, page_size: usize, filtered: bool) -> Response {
    if filtered && items.len() == 1 {
        return Json(items.into_iter().next().unwrap_or(Value::Null)).into_response();
    }

    let per_page = params.per_page.unwrap_or(page_size).max(1);
    let page = params.page.unwrap_or(0);
    let total = items.len();
    let start = page.saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);
    let page_items: Vec<Value> = items[start..end].to_vec();

    let mut response = Json(page_items).into_response();
    if end < total {
        let mut next = format!("{path}?page={}&per_page={per_page}", page + 1);
        if let (Some(from), Some(to)) = (&params.from, &params.to) {
            next.push_str(&format!("&from={from}&to={to}"));
        }
        if let Ok(value) = HeaderValue::from_str(&format!("<{next}>; rel=\"next\"")) {
            response.headers_mut().insert(header::LINK, value);
        }
    }
    response
}

fn created(path: &str, id: u64) -> Response {
    let mut response = StatusCode::CREATED.into_response();
    if let Ok(value) = HeaderValue::from_str(&format!("{path}/{id}")) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

fn parse_id(id: &str) -> Option<u64> {
    id.parse().ok()
}

// --- accounts ---

async fn list_accounts(State(state): State<AppState>, Query(params): Query<ListParams>) -> Response {
    let store = state.db.read().await;
    let mut accounts: Vec<Value> = store.accounts.values().cloned().collect();
    accounts.sort_by_key(|a| a["order"].as_u64().unwrap_or(u64::MAX));
    page_response("/accounts", accounts, &params, state.config.page_size, false)
}

async fn create_account(State(state): State<AppState>, Json(input): Json<Value>) -> Response {
    let mut missing = Map::new();
    if input.get("name").and_then(Value::as_str).is_none() {
        missing.insert("name".to_string(), json!("required"));
    }
    if input.pointer("/currency/code").and_then(Value::as_str).is_none() {
        missing.insert("currency".to_string(), json!("required"));
    }
    if !missing.is_empty() {
        return validation_error(missing);
    }

    let mut store = state.db.write().await;
    let id = store.allocate_id();
    let order = store.accounts.len();
    let mut account = input;
    account["id"] = json!(id.to_string());
    account["order"] = json!(order);
    account["status"] = json!("active");
    if account.get("balance").is_none() {
        account["balance"] = json!(0);
    }
    store.accounts.insert(id, account);
    debug!(id, "created account");
    created("/accounts", id)
}

async fn get_account(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let store = state.db.read().await;
    match parse_id(&id).and_then(|key| store.accounts.get(&key)) {
        Some(account) => Json(account.clone()).into_response(),
        None => not_found(&id),
    }
}

async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Response {
    let mut store = state.db.write().await;
    let Some(account) = parse_id(&id).and_then(|key| store.accounts.get_mut(&key)) else {
        return not_found(&id);
    };
    let Value::Object(fields) = input else {
        return validation_error(Map::from_iter([("body".to_string(), json!("object expected"))]));
    };
    for (key, value) in fields {
        if key != "id" {
            account[key.as_str()] = value;
        }
    }
    Json(account.clone()).into_response()
}

async fn delete_account(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut store = state.db.write().await;
    match parse_id(&id).and_then(|key| store.accounts.remove(&key)) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(&id),
    }
}

#[derive(Deserialize)]
struct MoveBody {
    position: usize,
}

/// Apply `ids` as the new order; accounts not listed keep their relative
/// order after the listed ones.
fn renumber(store: &mut Store, ids: &[u64]) {
    let mut rest: Vec<(u64, u64)> = store
        .accounts
        .iter()
        .filter(|(id, _)| !ids.contains(*id))
        .map(|(id, a)| (*id, a["order"].as_u64().unwrap_or(u64::MAX)))
        .collect();
    rest.sort_by_key(|(_, order)| *order);

    let sequence = ids.iter().copied().chain(rest.into_iter().map(|(id, _)| id));
    for (position, id) in sequence.enumerate() {
        if let Some(account) = store.accounts.get_mut(&id) {
            account["order"] = json!(position);
        }
    }
}

fn ordered_ids(store: &Store) -> Vec<u64> {
    let mut ids: Vec<(u64, u64)> = store
        .accounts
        .iter()
        .map(|(id, a)| (*id, a["order"].as_u64().unwrap_or(u64::MAX)))
        .collect();
    ids.sort_by_key(|(_, order)| *order);
    ids.into_iter().map(|(id, _)| id).collect()
}

async fn move_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MoveBody>,
) -> Response {
    let mut store = state.db.write().await;
    let Some(key) = parse_id(&id).filter(|key| store.accounts.contains_key(key)) else {
        return not_found(&id);
    };
    let mut ids: Vec<u64> = ordered_ids(&store).into_iter().filter(|i| *i != key).collect();
    let position = input.position.min(ids.len());
    ids.insert(position, key);
    renumber(&mut store, &ids);
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
struct ReorderBody {
    order: Vec<String>,
}

async fn reorder_accounts(State(state): State<AppState>, Json(input): Json<ReorderBody>) -> Response {
    let mut store = state.db.write().await;
    let mut ids = Vec::with_capacity(input.order.len());
    for raw in &input.order {
        match parse_id(raw).filter(|key| store.accounts.contains_key(key)) {
            Some(key) => ids.push(key),
            None => return not_found(raw),
        }
    }
    renumber(&mut store, &ids);
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
struct MergeBody {
    accounts: Vec<String>,
    account: String,
}

async fn merge_accounts(State(state): State<AppState>, Json(input): Json<MergeBody>) -> Response {
    let mut store = state.db.write().await;
    let Some(target) = parse_id(&input.account).filter(|key| store.accounts.contains_key(key)) else {
        return not_found(&input.account);
    };
    let mut sources = Vec::new();
    for raw in &input.accounts {
        match parse_id(raw).filter(|key| store.accounts.contains_key(key)) {
            Some(key) if key != target => sources.push(key),
            Some(_) => {}
            None => return not_found(raw),
        }
    }

    let mut moved = 0.0;
    for key in &sources {
        if let Some(account) = store.accounts.remove(key) {
            moved += account["balance"].as_f64().unwrap_or(0.0);
        }
    }
    if let Some(account) = store.accounts.get_mut(&target) {
        let balance = account["balance"].as_f64().unwrap_or(0.0) + moved;
        account["balance"] = json!(balance);
    }
    let source_ids: Vec<String> = sources.iter().map(|k| k.to_string()).collect();
    let target_id = target.to_string();
    for entry in store.entries.values_mut() {
        if entry["account"].as_str().is_some_and(|a| source_ids.iter().any(|s| s == a)) {
            entry["account"] = json!(target_id);
        }
    }
    let ids = ordered_ids(&store);
    renumber(&mut store, &ids);
    StatusCode::NO_CONTENT.into_response()
}

// --- categories & tags ---

async fn list_categories(State(state): State<AppState>, Query(params): Query<ListParams>) -> Response {
    let store = state.db.read().await;
    let categories = store.categories.values().cloned().collect();
    page_response("/categories", categories, &params, state.config.page_size, false)
}

async fn list_tags(State(state): State<AppState>, Query(params): Query<ListParams>) -> Response {
    let store = state.db.read().await;
    let tags = store.tags.values().cloned().collect();
    page_response("/tags", tags, &params, state.config.page_size, false)
}

// --- entries ---

async fn list_entries(State(state): State<AppState>, Query(params): Query<ListParams>) -> Response {
    let (Some(from), Some(to)) = (params.from.clone(), params.to.clone()) else {
        let mut fields = Map::new();
        if params.from.is_none() {
            fields.insert("from".to_string(), json!("required"));
        }
        if params.to.is_none() {
            fields.insert("to".to_string(), json!("required"));
        }
        return validation_error(fields);
    };

    let store = state.db.read().await;
    // ISO dates compare correctly as strings.
    let entries: Vec<Value> = store
        .entries
        .values()
        .filter(|e| {
            e["date"]
                .as_str()
                .is_some_and(|d| d >= from.as_str() && d <= to.as_str())
        })
        .cloned()
        .collect();
    page_response("/entries", entries, &params, state.config.page_size, true)
}

async fn create_entry(State(state): State<AppState>, Json(input): Json<Value>) -> Response {
    let mut missing = Map::new();
    for field in ["amount", "currency", "date", "account", "category"] {
        if input.get(field).is_none() {
            missing.insert(field.to_string(), json!("required"));
        }
    }
    if !missing.is_empty() {
        return validation_error(missing);
    }

    let mut store = state.db.write().await;
    let id = store.allocate_id();
    let mut entry = input;
    entry["id"] = json!(id.to_string());
    store.entries.insert(id, entry);
    debug!(id, "created entry");
    created("/entries", id)
}

async fn get_entry(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let store = state.db.read().await;
    match parse_id(&id).and_then(|key| store.entries.get(&key)) {
        Some(entry) => Json(entry.clone()).into_response(),
        None => not_found(&id),
    }
}

async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> Response {
    let mut store = state.db.write().await;
    let Some(entry) = parse_id(&id).and_then(|key| store.entries.get_mut(&key)) else {
        return not_found(&id);
    };
    if !input.is_object() {
        return validation_error(Map::from_iter([("body".to_string(), json!("object expected"))]));
    }
    let mut replacement = input;
    replacement["id"] = json!(id);
    *entry = replacement;
    Json(entry.clone()).into_response()
}
