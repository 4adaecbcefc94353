//! HTTP route handlers for the front desk.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Redirect to the role's dashboard or login
//! GET  /health                        - Health check
//!
//! # Auth
//! GET  /auth/login                    - Login page
//! POST /auth/login                    - Login action
//! GET  /auth/signup                   - Signup page
//! POST /auth/signup                   - Signup action
//! POST /auth/logout                   - Logout action
//!
//! # Client (requires client role)
//! GET  /client                        - Dashboard shell
//! GET  /client/tickets                - Ticket region fragment (HTMX)
//! POST /client/tickets/{id}/notifications - Enable notifications
//!
//! # Admin (requires admin role)
//! GET  /admin                         - Admin console
//! POST /admin/tickets                 - Create ticket
//! POST /admin/tickets/{id}            - Update ticket
//! POST /admin/tickets/{id}/delete     - Delete ticket
//! ```

pub mod admin;
pub mod auth;
pub mod client;

use axum::{
    Router,
    extract::Request,
    middleware::from_fn,
    response::Redirect,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::backend::UserProfile;
use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Shown when the profile header cannot be loaded.
const PROFILE_FAILED_MESSAGE: &str = "No se pudo cargar el nombre del usuario.";

/// Greeting header shared by both dashboards.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub name: Option<String>,
    pub error: Option<&'static str>,
}

impl ProfileView {
    /// Header for a loaded profile.
    #[must_use]
    pub fn loaded(profile: &UserProfile) -> Self {
        Self {
            name: Some(profile.display_name()),
            error: None,
        }
    }

    /// Header for a profile that failed to load.
    #[must_use]
    pub const fn failed() -> Self {
        Self {
            name: None,
            error: Some(PROFILE_FAILED_MESSAGE),
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create the client dashboard routes router.
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(client::dashboard))
        .route("/tickets", get(client::tickets))
        .route(
            "/tickets/{id}/notifications",
            post(client::enable_notifications),
        )
}

/// Create the admin console routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/tickets", post(admin::create_ticket))
        .route("/tickets/{id}", post(admin::update_ticket))
        .route("/tickets/{id}/delete", post(admin::delete_ticket))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::root))
        .nest("/auth", auth_routes())
        .nest("/client", client_routes())
        .nest("/admin", admin_routes())
}

/// Build the complete application with its middleware stack.
///
/// Sentry layers are added by the binary so tests can run without a hub.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .fallback(|| async { Redirect::to("/auth/login") })
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
