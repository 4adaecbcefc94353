//! Authentication error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur during login and signup.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required form field was blank.
    #[error("missing required fields")]
    MissingFields,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] repairdesk_core::EmailError),

    /// The backend rejected the email/password pair.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The issued token carries no recognized role.
    #[error("token carries no recognized role: {0}")]
    UnknownRole(#[from] repairdesk_core::TokenError),

    /// The backend could not be reached or answered unexpectedly.
    #[error("backend unavailable: {0}")]
    Connection(BackendError),

    /// The backend refused to create the account.
    #[error("signup rejected: {0}")]
    SignupRejected(BackendError),
}

impl AuthError {
    /// Short code carried in the `?error=` query of the redirect.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing",
            Self::InvalidEmail(_) => "email",
            Self::InvalidCredentials => "credentials",
            Self::UnknownRole(_) => "role",
            Self::Connection(_) => "connection",
            Self::SignupRejected(_) => "signup",
        }
    }
}

/// User-facing message for an error code, if the code is known.
#[must_use]
pub fn message_for(code: &str) -> Option<&'static str> {
    let message = match code {
        "missing" => "Completá todos los campos.",
        "email" => "El email no es válido.",
        "credentials" => "Credenciales inválidas, intenta nuevamente.",
        "role" => "Rol no reconocido en el token recibido.",
        "connection" => "Error en la conexión con el servidor. Intenta más tarde.",
        "signup" => "No se pudo crear la cuenta. Revisá los datos e intentá nuevamente.",
        "session" => "Tu sesión expiró. Iniciá sesión nuevamente.",
        _ => return None,
    };
    Some(message)
}
