//! Authentication service.
//!
//! Login and signup are delegated to the ticket backend. The front desk only
//! checks that the form was filled in, and after login that the issued token
//! names a role it has a dashboard for.

mod error;

pub use error::{AuthError, message_for};

use chrono::Utc;
use repairdesk_core::{Email, Identity, identity::read_token};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::backend::{BackendClient, BackendError, NewAccount};

/// A successful login.
#[derive(Debug)]
pub struct SignedIn {
    pub token: SecretString,
    pub identity: Identity,
}

/// Authentication service.
pub struct AuthService<'a> {
    backend: &'a BackendClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either field is blank,
    /// `AuthError::InvalidCredentials` if the backend refuses the pair,
    /// `AuthError::Connection` if the backend cannot be reached, and
    /// `AuthError::UnknownRole` if the issued token names no known role.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SignedIn, AuthError> {
        if email.trim().is_empty() || password.expose_secret().is_empty() {
            return Err(AuthError::MissingFields);
        }
        // A malformed address can never match an account.
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let token = self
            .backend
            .login(&email, password)
            .await
            .map_err(|e| match e {
                BackendError::InvalidCredentials => AuthError::InvalidCredentials,
                other => AuthError::Connection(other),
            })?;

        let identity = read_token(token.expose_secret(), Utc::now().timestamp()).map_err(|e| {
            warn!(error = %e, email = %email, "Login token rejected");
            AuthError::UnknownRole(e)
        })?;

        info!(email = %identity.email, role = %identity.role, "User logged in");
        Ok(SignedIn { token, identity })
    }

    /// Create a client account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if any field is blank,
    /// `AuthError::InvalidEmail` if the email is malformed,
    /// `AuthError::Connection` if the backend cannot be reached, and
    /// `AuthError::SignupRejected` if it refuses the account.
    pub async fn signup(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: SecretString,
    ) -> Result<(), AuthError> {
        if [first_name, last_name, email]
            .iter()
            .any(|field| field.trim().is_empty())
            || password.expose_secret().is_empty()
        {
            return Err(AuthError::MissingFields);
        }

        let account = NewAccount {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: Email::parse(email)?,
            password,
        };

        self.backend.signup(&account).await.map_err(|e| {
            if e.is_connection_failure() {
                AuthError::Connection(e)
            } else {
                AuthError::SignupRejected(e)
            }
        })?;

        info!(email = %account.email, "Account created");
        Ok(())
    }
}
