//! Session identity decoded from the backend's credential token.
//!
//! The backend signs a JWT whose subject is the user's email and whose `role`
//! claim is `ROLE_ADMIN` or `ROLE_CLIENTE`. The front-end never verifies the
//! signature (the backend does that on every call); it only reads the payload
//! to decide which dashboard to show and whose tickets to ask for.
//!
//! Decoding never fails loudly: a missing, malformed or expired token yields
//! no identity, which callers treat as "not signed in".

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::types::{Email, Role};

/// Who is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: Email,
    pub role: Role,
}

impl Identity {
    /// Whether the identity is a shop client.
    #[must_use]
    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }

    /// Whether the identity is shop staff.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Why a token did not yield an identity. Only used for logging; callers of
/// [`decode_identity`] see `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is not three dot-separated segments")]
    Shape,
    #[error("token payload is not base64url: {0}")]
    Base64(String),
    #[error("token payload is not JSON: {0}")]
    Json(String),
    #[error("token carries no email claim")]
    MissingEmail,
    #[error("token email is malformed")]
    BadEmail,
    #[error("token carries no recognized role")]
    UnknownRole,
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Decode the identity carried by `token`, as seen at unix time `now`.
///
/// # Errors
///
/// Returns a [`TokenError`] naming the first problem found.
pub fn read_token(token: &str, now: i64) -> Result<Identity, TokenError> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token);

    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Shape);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenError::Base64(e.to_string()))?;
    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Json(e.to_string()))?;

    if claims.exp.is_some_and(|exp| exp <= now) {
        return Err(TokenError::Expired);
    }

    let raw_email = claims
        .sub
        .or(claims.email)
        .ok_or(TokenError::MissingEmail)?;
    let email = Email::parse(&raw_email).map_err(|_| TokenError::BadEmail)?;
    let role = claims
        .role
        .as_deref()
        .and_then(|r| r.parse::<Role>().ok())
        .ok_or(TokenError::UnknownRole)?;

    Ok(Identity { email, role })
}

/// Decode the identity carried by `token`, or `None` if there is none.
#[must_use]
pub fn decode_identity(token: Option<&str>, now: i64) -> Option<Identity> {
    read_token(token?, now).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_decodes_client_token() {
        let t = token(&serde_json::json!({
            "sub": "ana@taller.com",
            "role": "ROLE_CLIENTE",
            "exp": 2_000_000_000_i64,
        }));
        let identity = decode_identity(Some(&t), 1_700_000_000).unwrap();
        assert_eq!(identity.email.as_str(), "ana@taller.com");
        assert!(identity.is_client());
    }

    #[test]
    fn test_accepts_bearer_prefix_and_email_claim() {
        let t = token(&serde_json::json!({
            "email": "jefe@taller.com",
            "role": "ROLE_ADMIN",
        }));
        let identity = decode_identity(Some(&format!("Bearer {t}")), 0).unwrap();
        assert!(identity.is_admin());
    }

    #[test]
    fn test_no_token_is_no_identity() {
        assert_eq!(decode_identity(None, 0), None);
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(read_token("not-a-jwt", 0), Err(TokenError::Shape));
        assert_eq!(read_token("a.b.c.d", 0), Err(TokenError::Shape));
        assert!(matches!(read_token("a.!!!.c", 0), Err(TokenError::Base64(_))));

        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("plain text"));
        assert!(matches!(read_token(&not_json, 0), Err(TokenError::Json(_))));
    }

    #[test]
    fn test_missing_or_unknown_role() {
        let t = token(&serde_json::json!({ "sub": "ana@taller.com" }));
        assert_eq!(read_token(&t, 0), Err(TokenError::UnknownRole));

        let t = token(&serde_json::json!({ "sub": "ana@taller.com", "role": "ROLE_TECNICO" }));
        assert_eq!(read_token(&t, 0), Err(TokenError::UnknownRole));
    }

    #[test]
    fn test_missing_or_bad_email() {
        let t = token(&serde_json::json!({ "role": "ROLE_ADMIN" }));
        assert_eq!(read_token(&t, 0), Err(TokenError::MissingEmail));

        let t = token(&serde_json::json!({ "sub": "ana", "role": "ROLE_ADMIN" }));
        assert_eq!(read_token(&t, 0), Err(TokenError::BadEmail));
    }

    #[test]
    fn test_expired_token() {
        let t = token(&serde_json::json!({
            "sub": "ana@taller.com",
            "role": "ROLE_CLIENTE",
            "exp": 100,
        }));
        assert_eq!(read_token(&t, 100), Err(TokenError::Expired));
        assert!(read_token(&t, 99).is_ok());
    }
}
