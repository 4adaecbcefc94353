//! HTTP middleware stack for the front desk.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, one hub per request)
//! 2. `TraceLayer` (request tracing, span carries `request_id`)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    AuthRejection, RequireAdmin, RequireClient, SessionContext, clear, current_session,
    hx_redirect, is_htmx, is_notified, remember_notified, sign_out, store_token,
};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
