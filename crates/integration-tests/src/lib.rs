//! Integration tests for the repair desk front-end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p repairdesk-integration-tests
//! ```
//!
//! Nothing external is needed: [`FakeBackend`] serves the ticket backend's
//! REST API from memory on an ephemeral port, and [`spawn_frontdesk`] starts
//! the real front desk router pointed at it.
//!
//! # Test Categories
//!
//! - `backend_client` - The HTTP client against canned backend answers
//! - `dashboard_flow` - Login, dashboards and notifications through the pages

#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::indexing_slicing)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use repairdesk_frontdesk::{config::FrontdeskConfig, state::AppState};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::RwLock};

/// Build a token in the backend's format: `header.payload.signature`.
///
/// The signature is never checked by the front desk, so it is a dummy.
#[must_use]
pub fn make_token(email: &str, role: &str, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({ "sub": email, "role": role, "exp": exp })
            .to_string()
            .as_bytes(),
    );
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Expiry far enough in the future for any test.
pub const FAR_FUTURE: i64 = 4_102_444_800;

/// An account known to the fake backend.
#[derive(Debug, Clone)]
pub struct FakeUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: &'static str,
}

impl FakeUser {
    #[must_use]
    pub fn client(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "ana".to_string(),
            last_name: "pérez".to_string(),
            role: "ROLE_CLIENTE",
        }
    }

    #[must_use]
    pub fn admin(email: &str, password: &str) -> Self {
        Self {
            role: "ROLE_ADMIN",
            first_name: "marta".to_string(),
            last_name: "gómez".to_string(),
            ..Self::client(email, password)
        }
    }
}

/// Everything the fake backend stores and how it misbehaves.
#[derive(Debug, Default)]
pub struct BackendData {
    pub users: Vec<FakeUser>,
    pub tickets: Vec<Value>,
    /// Answer ticket list requests with this status instead of the list.
    pub tickets_status: Option<u16>,
    /// Hold every ticket list response this long.
    pub tickets_delay: Option<Duration>,
    /// Hold every notification write this long.
    pub notify_delay: Option<Duration>,
    /// Status answered to notification writes; 204 when unset.
    pub notify_status: Option<u16>,
    /// Ticket ids whose notifications were written.
    pub notify_calls: Vec<i64>,
    /// Answer every authenticated request with 401.
    pub reject_tokens: bool,
    /// Ticket creation and update bodies, in arrival order.
    pub writes: Vec<Value>,
}

/// In-memory stand-in for the ticket backend.
#[derive(Debug, Clone)]
pub struct FakeBackend {
    data: Arc<RwLock<BackendData>>,
    addr: SocketAddr,
}

impl FakeBackend {
    /// Start the fake backend on an ephemeral local port.
    pub async fn start(data: BackendData) -> Self {
        let data = Arc::new(RwLock::new(data));

        let api = Router::new()
            .route("/users/login", post(login))
            .route("/users", post(signup))
            .route("/users/email/{email}", get(profile))
            .route("/tickets", get(all_tickets).post(create_ticket))
            .route("/tickets/cliente/{email}", get(client_tickets))
            .route("/tickets/estadisticas", get(stats))
            .route("/tickets/por-mes", get(monthly))
            .route("/tickets/{id}", put(update_ticket).delete(delete_ticket))
            .route("/tickets/{id}/notificacion", put(notify))
            .with_state(Arc::clone(&data));
        let app = Router::new().nest("/api", api);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { data, addr }
    }

    /// Base URL of the fake backend's API.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Shared access to the stored data, for setup and assertions.
    #[must_use]
    pub fn data(&self) -> &RwLock<BackendData> {
        &self.data
    }
}

/// Start the front desk against `backend_url`; returns its base URL.
pub async fn spawn_frontdesk(backend_url: &str, timeout_secs: u64) -> String {
    let timeout = timeout_secs.to_string();
    let config = FrontdeskConfig::from_lookup(|key| match key {
        "REPAIRDESK_BACKEND_URL" => Some(backend_url.to_string()),
        "REPAIRDESK_BACKEND_TIMEOUT_SECS" => Some(timeout.clone()),
        _ => None,
    })
    .unwrap();
    let state = AppState::new(config).unwrap();
    let app = repairdesk_frontdesk::app(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// A browser-like client that keeps cookies and does not follow redirects.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Log `browser` in through the login form.
pub async fn log_in(browser: &reqwest::Client, frontdesk: &str, email: &str, password: &str) {
    let response = browser
        .post(format!("{frontdesk}/auth/login"))
        .form(&[("email", email), ("password", password)])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
}

type Shared = State<Arc<RwLock<BackendData>>>;

async fn login(State(data): Shared, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let data = data.read().await;

    match data
        .users
        .iter()
        .find(|u| u.email.eq_ignore_ascii_case(email) && u.password == password)
    {
        Some(user) => make_token(&user.email, user.role, FAR_FUTURE).into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn signup(State(data): Shared, Json(body): Json<Value>) -> StatusCode {
    let mut data = data.write().await;
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if data.users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
        return StatusCode::CONFLICT;
    }
    data.users.push(FakeUser {
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
        first_name: body["firstName"].as_str().unwrap_or_default().to_string(),
        last_name: body["lastName"].as_str().unwrap_or_default().to_string(),
        role: "ROLE_CLIENTE",
    });
    StatusCode::CREATED
}

fn authorized(data: &BackendData, headers: &HeaderMap) -> bool {
    !data.reject_tokens
        && headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("Bearer "))
}

async fn profile(State(data): Shared, headers: HeaderMap, Path(email): Path<String>) -> Response {
    let data = data.read().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match data.users.iter().find(|u| u.email.eq_ignore_ascii_case(&email)) {
        Some(user) => Json(json!({
            "firstName": user.first_name,
            "lastName": user.last_name,
            "email": user.email,
        }))
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn client_tickets(
    State(data): Shared,
    headers: HeaderMap,
    Path(email): Path<String>,
) -> Response {
    let delay = data.read().await.tickets_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let data = data.read().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(status) = data.tickets_status {
        return StatusCode::from_u16(status).unwrap().into_response();
    }
    let owned: Vec<&Value> = data
        .tickets
        .iter()
        .filter(|t| {
            t["clienteEmail"]
                .as_str()
                .is_some_and(|owner| owner.eq_ignore_ascii_case(&email))
        })
        .collect();
    Json(owned).into_response()
}

async fn all_tickets(State(data): Shared, headers: HeaderMap) -> Response {
    let data = data.read().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(status) = data.tickets_status {
        return StatusCode::from_u16(status).unwrap().into_response();
    }
    Json(data.tickets.clone()).into_response()
}

async fn stats(State(data): Shared, headers: HeaderMap) -> Response {
    let data = data.read().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let count = |status: &str| {
        data.tickets
            .iter()
            .filter(|t| t["estado"].as_str().is_some_and(|s| s.eq_ignore_ascii_case(status)))
            .count()
    };
    Json(json!({
        "total": data.tickets.len(),
        "pendientes": count("pendiente"),
        "reparacion": count("en reparación"),
        "resueltos": count("listo"),
    }))
    .into_response()
}

async fn monthly(State(data): Shared, headers: HeaderMap) -> Response {
    let data = data.read().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        { "mes": "ene", "tickets": 2 },
        { "mes": "feb", "tickets": 4 },
    ]))
    .into_response()
}

async fn create_ticket(State(data): Shared, headers: HeaderMap, Json(body): Json<Value>) -> StatusCode {
    let mut data = data.write().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED;
    }
    let id = data.tickets.len() + 1;
    let mut ticket = body.clone();
    ticket["id"] = json!(id);
    data.tickets.push(ticket);
    data.writes.push(body);
    StatusCode::CREATED
}

async fn update_ticket(
    State(data): Shared,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> StatusCode {
    let mut data = data.write().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED;
    }
    let Some(ticket) = data.tickets.iter_mut().find(|t| t["id"] == json!(id)) else {
        return StatusCode::NOT_FOUND;
    };
    if let (Some(target), Some(changes)) = (ticket.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    data.writes.push(body);
    StatusCode::OK
}

async fn delete_ticket(State(data): Shared, headers: HeaderMap, Path(id): Path<i64>) -> StatusCode {
    let mut data = data.write().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED;
    }
    let before = data.tickets.len();
    data.tickets.retain(|t| t["id"] != json!(id));
    if data.tickets.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn notify(State(data): Shared, headers: HeaderMap, Path(id): Path<i64>) -> StatusCode {
    let delay = data.read().await.notify_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut data = data.write().await;
    if !authorized(&data, &headers) {
        return StatusCode::UNAUTHORIZED;
    }
    data.notify_calls.push(id);
    let status = data.notify_status.unwrap_or(204);
    if status == 200 || status == 204 {
        if let Some(ticket) = data.tickets.iter_mut().find(|t| t["id"] == json!(id)) {
            ticket["notificarCliente"] = json!(true);
        }
    }
    StatusCode::from_u16(status).unwrap()
}
