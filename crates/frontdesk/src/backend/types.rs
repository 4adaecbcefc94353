//! Account types exchanged with the ticket backend.

use repairdesk_core::{Email, ticket::null_as_default};
use secrecy::SecretString;
use serde::Deserialize;

/// Profile returned by `GET /users/email/{email}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserProfile {
    /// First and last name with their initials capitalized.
    #[must_use]
    pub fn display_name(&self) -> String {
        [capitalize(&self.first_name), capitalize(&self.last_name)]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Uppercase the first character, leaving the rest untouched.
fn capitalize(word: &str) -> String {
    let word = word.trim();
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// A signup submission.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password: SecretString,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_capitalizes_each_part() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "firstName": "david",
            "lastName": "vall",
            "email": "david@taller.com",
            "role": "ROLE_ADMIN",
        }))
        .unwrap();
        assert_eq!(profile.display_name(), "David Vall");
    }

    #[test]
    fn test_display_name_handles_missing_parts() {
        let profile: UserProfile =
            serde_json::from_value(serde_json::json!({ "firstName": "ángela" })).unwrap();
        assert_eq!(profile.display_name(), "Ángela");
        assert_eq!(UserProfile::default().display_name(), "");
    }

    #[test]
    fn test_null_name_parts_are_skipped() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "firstName": "ana",
            "lastName": null,
            "email": null,
        }))
        .unwrap();
        assert_eq!(profile.display_name(), "Ana");
    }

    #[test]
    fn test_new_account_debug_redacts_password() {
        let account = NewAccount {
            first_name: "Ana".to_string(),
            last_name: "Gómez".to_string(),
            email: Email::parse("ana@taller.com").unwrap(),
            password: SecretString::from("hunter2-super-secret"),
        };
        let debug = format!("{account:?}");
        assert!(debug.contains("ana@taller.com"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2-super-secret"));
    }
}
