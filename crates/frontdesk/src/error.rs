//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Expected failures of a page region (an empty
//! ticket list, a failed profile fetch) are values rendered in place and never
//! reach this type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use repairdesk_core::{Email, Role};
use thiserror::Error;

use crate::middleware::hx_redirect;

/// Where a browser goes after the backend rejected its token.
pub const SESSION_EXPIRED_PATH: &str = "/auth/login?error=session";

/// Application-level error type for the front desk.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The backend rejected the session token and the session was cleared.
    #[error("Session token rejected by backend")]
    SignedOut {
        /// The request came from HTMX and needs `HX-Redirect`.
        htmx: bool,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::SignedOut { htmx: true } => hx_redirect(SESSION_EXPIRED_PATH),
            Self::SignedOut { htmx: false } => Redirect::to(SESSION_EXPIRED_PATH).into_response(),
            Self::Session(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
                // Don't expose internal error details to clients
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the current request.
pub fn set_sentry_user(email: &Email, role: Role) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
        scope.set_tag("role", role);
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("tickets", "Enabled notifications", Some(&[("ticket_id", "42")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
