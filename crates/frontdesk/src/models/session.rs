//! Session-related types.
//!
//! The session stores the raw backend token; the identity is decoded from it
//! on every request so an expired token stops working without a logout.

use repairdesk_core::{Email, Identity, Role};
use secrecy::SecretString;

/// The signed-in user, resolved from the session token.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CurrentSession {
    /// Backend bearer token.
    pub token: SecretString,
    /// Identity decoded from the token.
    pub identity: Identity,
}

impl CurrentSession {
    /// Email of the signed-in user.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.identity.email
    }

    /// Role of the signed-in user.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.identity.role
    }
}

impl std::fmt::Debug for CurrentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentSession")
            .field("token", &"[REDACTED]")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for the backend token returned by login.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// Key for the ids of tickets whose notifications are known to be on.
    pub const NOTIFIED_TICKETS: &str = "notified_tickets";
}
