//! Authentication route handlers.
//!
//! Handles login, signup and logout. Credentials are checked by the ticket
//! backend; the session only ever holds the token it issues.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::{SessionContext, clear, store_token};
use crate::services::auth::{AuthService, message_for};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Signup form data.
#[derive(Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<&'static str>,
}

// =============================================================================
// Routes
// =============================================================================

/// Send the visitor to their dashboard, or to the login page.
pub async fn root(SessionContext(current): SessionContext) -> Redirect {
    match current {
        Some(current) => Redirect::to(current.role().home_path()),
        None => Redirect::to("/auth/login"),
    }
}

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().and_then(message_for),
        success: query.success.as_deref().and_then(success_message),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.backend());

    let password = SecretString::from(form.password);

    match auth.login(&form.email, &password).await {
        Ok(signed_in) => {
            store_token(&session, &signed_in.token).await?;
            Ok(Redirect::to(signed_in.identity.role.home_path()).into_response())
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            Ok(Redirect::to(&format!("/auth/login?error={}", e.code())).into_response())
        }
    }
}

/// Display the signup page.
pub async fn signup_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    SignupTemplate {
        error: query.error.as_deref().and_then(message_for),
    }
}

/// Handle signup form submission.
pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    let auth = AuthService::new(state.backend());

    match auth
        .signup(
            &form.first_name,
            &form.last_name,
            &form.email,
            SecretString::from(form.password),
        )
        .await
    {
        Ok(()) => Redirect::to("/auth/login?success=registered").into_response(),
        Err(e) => {
            tracing::warn!("Signup failed: {}", e);
            Redirect::to(&format!("/auth/signup?error={}", e.code())).into_response()
        }
    }
}

/// Log out and return to the login page.
pub async fn logout(session: Session) -> Result<Redirect> {
    clear(&session).await?;
    Ok(Redirect::to("/auth/login?success=logged_out"))
}

fn success_message(code: &str) -> Option<&'static str> {
    match code {
        "registered" => Some("Cuenta creada. Ya podés iniciar sesión."),
        "logged_out" => Some("Cerraste sesión."),
        _ => None,
    }
}
