//! Session access and authentication extractors.
//!
//! This is the only module that reads or writes the session token. Handlers
//! get the signed-in user through [`SessionContext`], [`RequireClient`] or
//! [`RequireAdmin`], and change it through [`store_token`] and [`clear`].

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use repairdesk_core::{Role, TicketId, identity::read_token};
use secrecy::{ExposeSecret, SecretString};
use tower_sessions::Session;
use tracing::debug;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentSession, session_keys};

/// Path of the login page.
pub const LOGIN_PATH: &str = "/auth/login";

/// Header HTMX reads to perform a full-page redirect.
pub const HX_REDIRECT: &str = "hx-redirect";

/// Extractor that optionally gets the signed-in user.
///
/// A missing, malformed or expired token gives `None`.
pub struct SessionContext(pub Option<CurrentSession>);

/// Extractor that requires a signed-in client.
///
/// Anonymous requests are sent to the login page; admins are sent to their
/// own dashboard.
pub struct RequireClient(pub CurrentSession);

/// Extractor that requires a signed-in admin.
///
/// Anonymous requests are sent to the login page; clients are sent to their
/// own dashboard.
pub struct RequireAdmin(pub CurrentSession);

/// Error returned when a route needs an identity the request does not have.
#[derive(Debug)]
pub enum AuthRejection {
    /// Send the browser to another page.
    Redirect {
        to: &'static str,
        /// The request came from HTMX, which needs `HX-Redirect` instead
        /// of a 3xx to leave the page.
        htmx: bool,
    },
    /// The session layer is missing.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect { to, htmx: true } => hx_redirect(to),
            Self::Redirect { to, htmx: false } => Redirect::to(to).into_response(),
            Self::Unavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// A `200` that tells HTMX to load `to` as a full page.
#[must_use]
pub fn hx_redirect(to: &'static str) -> Response {
    (StatusCode::OK, [(HX_REDIRECT, HeaderValue::from_static(to))]).into_response()
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current = match parts.extensions.get::<Session>() {
            Some(session) => current_session(session).await,
            None => None,
        };

        Ok(Self(current))
    }
}

impl<S> FromRequestParts<S> for RequireClient
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, Role::Client).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, Role::Admin).await.map(Self)
    }
}

async fn require_role(parts: &Parts, role: Role) -> Result<CurrentSession, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unavailable)?;
    let htmx = is_htmx(&parts.headers);

    let Some(current) = current_session(session).await else {
        return Err(AuthRejection::Redirect {
            to: LOGIN_PATH,
            htmx,
        });
    };

    if current.role() != role {
        debug!(
            expected = %role,
            actual = %current.role(),
            "Identity sent to its own dashboard"
        );
        return Err(AuthRejection::Redirect {
            to: current.role().home_path(),
            htmx,
        });
    }

    set_sentry_user(current.email(), current.role());
    Ok(current)
}

/// Whether the request was sent by HTMX rather than a page load.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|v| v.as_bytes() == b"true")
}

/// Resolve the signed-in user from the session token.
pub async fn current_session(session: &Session) -> Option<CurrentSession> {
    let token: String = session
        .get(session_keys::AUTH_TOKEN)
        .await
        .ok()
        .flatten()?;

    match read_token(&token, Utc::now().timestamp()) {
        Ok(identity) => Some(CurrentSession {
            token: SecretString::from(token),
            identity,
        }),
        Err(e) => {
            debug!(error = %e, "Session token yields no identity");
            None
        }
    }
}

/// Store a freshly issued token, replacing whatever the session held.
///
/// The session id is cycled so a pre-login cookie cannot ride the new login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_token(
    session: &Session,
    token: &SecretString,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .remove::<Vec<i64>>(session_keys::NOTIFIED_TICKETS)
        .await?;
    session
        .insert(session_keys::AUTH_TOKEN, token.expose_secret())
        .await
}

/// Whether notifications for `id` are known to be on in this session.
pub async fn is_notified(session: &Session, id: TicketId) -> bool {
    notified_tickets(session).await.contains(&id.as_i64())
}

/// Remember that notifications for `id` are on.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn remember_notified(
    session: &Session,
    id: TicketId,
) -> Result<(), tower_sessions::session::Error> {
    let mut ids = notified_tickets(session).await;
    if ids.contains(&id.as_i64()) {
        return Ok(());
    }
    ids.push(id.as_i64());
    session.insert(session_keys::NOTIFIED_TICKETS, ids).await
}

async fn notified_tickets(session: &Session) -> Vec<i64> {
    session
        .get(session_keys::NOTIFIED_TICKETS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Drop everything the session holds (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
    crate::error::clear_sentry_user();
    session.flush().await
}

/// Clear the session after the backend rejected its token.
///
/// Returns the error the handler should answer with: a redirect to the
/// login page, or a 500 if the session could not be cleared.
pub async fn sign_out(session: &Session, htmx: bool) -> AppError {
    match clear(session).await {
        Ok(()) => AppError::SignedOut { htmx },
        Err(e) => AppError::Session(e),
    }
}
