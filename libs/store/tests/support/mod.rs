//! In-process marketplace API used by the store integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use client::http::HttpClient;
use client::session::SessionHandle;
use client::token_store::MemoryTokenStore;
use common::config::ClientConfig;

const PER_PAGE: usize = 10;

fn init_tracing() {
    // First caller wins; later suites in the same process are a no-op.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Clone)]
struct ApiState {
    users: Arc<Mutex<Vec<Value>>>,
    partners: Arc<Mutex<Vec<Value>>>,
    searches: Arc<Mutex<Vec<String>>>,
    list_hits: Arc<AtomicUsize>,
}

/// Handles into the spawned mock API
pub struct MockApi {
    pub base_url: String,
    /// Every `search` value the user list endpoint received, in order.
    pub searches: Arc<Mutex<Vec<String>>>,
    /// Number of user list requests served.
    pub list_hits: Arc<AtomicUsize>,
}

fn ok_env(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "message": "OK", "data": data }))
}

fn err_env(message: &str) -> Json<Value> {
    Json(json!({ "success": false, "message": message }))
}

fn seed_user(id: usize) -> Value {
    json!({
        "id": id,
        "name": format!("user-{id}"),
        "email": format!("user-{id}@example.com"),
        "role": "client",
        "status": "active",
        "listings_count": 0
    })
}

fn seed_partner(id: usize) -> Value {
    json!({
        "id": id,
        "name": format!("partner-{id}"),
        "website": null,
        "logo_url": null,
        "sort_order": 0,
        "status": "active"
    })
}

fn paginate(items: &[Value], page: usize) -> Value {
    let total = items.len();
    let last_page = total.div_ceil(PER_PAGE).max(1);
    let start = ((page - 1) * PER_PAGE).min(total);
    let end = (start + PER_PAGE).min(total);
    json!({
        "data": items[start..end].to_vec(),
        "pagination": {
            "current_page": page,
            "last_page": last_page,
            "per_page": PER_PAGE,
            "total": total,
            "has_more_pages": page < last_page
        }
    })
}

async fn list_users(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.list_hits.fetch_add(1, Ordering::SeqCst);

    let search = params.get("search").cloned().unwrap_or_default();
    state
        .searches
        .lock()
        .unwrap()
        .push(search.clone());

    match search.as_str() {
        "boom" => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                err_env("backend exploded"),
            );
        }
        "pending-account" => {
            return (
                StatusCode::FORBIDDEN,
                err_env("Your account has not been activated yet"),
            );
        }
        "slow" => tokio::time::sleep(Duration::from_millis(400)).await,
        _ => {}
    }

    if !search.is_empty() {
        // Echo the search term back as a single-item page so tests can tell
        // which request's response was applied.
        let user = json!({
            "id": 1000,
            "name": search,
            "email": format!("{search}@example.com"),
            "role": "client",
            "status": "active",
            "listings_count": 0
        });
        return (
            StatusCode::OK,
            ok_env(json!({
                "data": [user],
                "pagination": {
                    "current_page": 1,
                    "last_page": 1,
                    "per_page": PER_PAGE,
                    "total": 1,
                    "has_more_pages": false
                }
            })),
        );
    }

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let users = state.users.lock().unwrap().clone();
    (StatusCode::OK, ok_env(paginate(&users, page)))
}

async fn update_user_status(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    // Id 5 is wired to fail so tests can observe an untouched page.
    if id == 5 {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            err_env("mutation backend unavailable"),
        );
    }

    let mut users = state.users.lock().unwrap();
    let Some(user) = users.iter_mut().find(|u| u["id"] == id) else {
        return (StatusCode::NOT_FOUND, err_env("No such user"));
    };

    user["status"] = body["status"].clone();
    // Server-owned derived field, recomputed on every update.
    user["listings_count"] = json!(99);
    (StatusCode::OK, ok_env(user.clone()))
}

async fn delete_user(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Value>) {
    if id == 5 {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            err_env("delete backend unavailable"),
        );
    }

    let mut users = state.users.lock().unwrap();
    users.retain(|u| u["id"] != id);
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Deleted", "data": null })),
    )
}

async fn list_partners(State(state): State<ApiState>) -> (StatusCode, Json<Value>) {
    let partners = state.partners.lock().unwrap().clone();
    (StatusCode::OK, ok_env(paginate(&partners, 1)))
}

async fn create_partner(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut name = String::new();
    let mut website: Option<String> = None;
    let mut logo_file: Option<String> = None;

    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name().unwrap_or_default() {
            "name" => name = field.text().await.unwrap(),
            "website" => website = Some(field.text().await.unwrap()),
            "logo" => {
                let file_name = field.file_name().unwrap_or("logo.png").to_string();
                let _ = field.bytes().await.unwrap();
                logo_file = Some(file_name);
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    let mut partners = state.partners.lock().unwrap();
    let id = partners.len() + 1;
    let logo_url = logo_file.map(|f| format!("https://cdn.example/logos/{id}-{f}"));
    let partner = json!({
        "id": id,
        "name": name,
        "website": website,
        "logo_url": logo_url,
        "sort_order": 0,
        "status": "active"
    });
    partners.push(partner.clone());
    (StatusCode::OK, ok_env(partner))
}

async fn update_partner(
    State(state): State<ApiState>,
    Path(id): Path<u64>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut method_override = String::new();
    let mut name: Option<String> = None;
    let mut logo_file: Option<String> = None;

    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name().unwrap_or_default() {
            "_method" => method_override = field.text().await.unwrap(),
            "name" => name = Some(field.text().await.unwrap()),
            "logo" => {
                let file_name = field.file_name().unwrap_or("logo.png").to_string();
                let _ = field.bytes().await.unwrap();
                logo_file = Some(file_name);
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    if method_override != "PUT" {
        return (
            StatusCode::BAD_REQUEST,
            err_env("missing _method override"),
        );
    }

    let mut partners = state.partners.lock().unwrap();
    let Some(partner) = partners.iter_mut().find(|p| p["id"] == id) else {
        return (StatusCode::NOT_FOUND, err_env("No such partner"));
    };

    if let Some(name) = name {
        partner["name"] = json!(name);
    }
    if let Some(file) = logo_file {
        partner["logo_url"] = json!(format!("https://cdn.example/logos/{id}-{file}"));
    }
    (StatusCode::OK, ok_env(partner.clone()))
}

/// Spawn the mock API with the given seed data and return handles into it.
pub async fn spawn_marketplace_api(user_count: usize, partner_count: usize) -> MockApi {
    init_tracing();
    let state = ApiState {
        users: Arc::new(Mutex::new((1..=user_count).map(seed_user).collect())),
        partners: Arc::new(Mutex::new((1..=partner_count).map(seed_partner).collect())),
        searches: Arc::new(Mutex::new(Vec::new())),
        list_hits: Arc::new(AtomicUsize::new(0)),
    };

    let searches = Arc::clone(&state.searches);
    let list_hits = Arc::clone(&state.list_hits);

    let app = Router::new()
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/:id/status", put(update_user_status))
        .route("/api/admin/users/:id", delete(delete_user))
        .route(
            "/api/admin/partners",
            get(list_partners).post(create_partner),
        )
        .route("/api/admin/partners/:id", post(update_partner))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi {
        base_url: format!("http://{addr}/api"),
        searches,
        list_hits,
    }
}

/// Transport pointed at the mock API, with an in-memory session.
pub fn build_http(base_url: &str) -> HttpClient {
    let handle = SessionHandle::new(Box::new(MemoryTokenStore::default()));
    let config = ClientConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        token_file: None,
    };
    HttpClient::new(config, handle).unwrap()
}
