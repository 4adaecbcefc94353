//! Closed variants for the free-text vocabularies the backend speaks.
//!
//! The backend stores ticket status, priority and user role as plain strings.
//! They are decoded into enums here, at the point where backend data enters
//! the system, so the rest of the code matches exhaustively instead of
//! comparing strings. Unrecognized values are kept verbatim rather than
//! rejected.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Repair status of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TicketStatus {
    /// `pendiente` - received, waiting for a technician.
    Pending,
    /// `en reparación` - a technician is working on it.
    InRepair,
    /// `listo` - repaired and ready for pickup.
    Done,
    /// Any other value, kept as the backend sent it.
    Unknown(String),
}

impl TicketStatus {
    /// Decode a status string, ignoring case.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "pendiente" => Self::Pending,
            "en reparación" => Self::InRepair,
            "listo" => Self::Done,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// The string sent back to the backend.
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Pending => "pendiente",
            Self::InRepair => "en reparación",
            Self::Done => "listo",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether the status is outside the known vocabulary.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for TicketStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for TicketStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or_else(|| Self::Unknown(String::new()), |s| Self::parse(&s)))
    }
}

/// Repair priority assigned by the shop.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Priority {
    /// `alta`
    High,
    /// `media`
    Medium,
    /// `baja`
    Low,
    /// Any other value, kept as the backend sent it.
    Other(String),
}

impl Priority {
    /// Decode a priority string, ignoring case.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "alta" => Self::High,
            "media" => Self::Medium,
            "baja" => Self::Low,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// The string sent back to the backend.
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::High => "alta",
            Self::Medium => "media",
            Self::Low => "baja",
            Self::Other(raw) => raw,
        }
    }

    /// CSS modifier used for the priority badge.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::High => "badge-high",
            Self::Medium => "badge-medium",
            Self::Low => "badge-low",
            Self::Other(_) => "badge-other",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| Self::parse(&s))
    }
}

/// Role carried in the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Shop client; sees only their own tickets.
    #[serde(rename = "ROLE_CLIENTE")]
    Client,
    /// Shop staff; manages every ticket.
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    /// Path of the dashboard this role lands on after login.
    #[must_use]
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::Client => "/client",
            Self::Admin => "/admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "ROLE_CLIENTE"),
            Self::Admin => write!(f, "ROLE_ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_CLIENTE" => Ok(Self::Client),
            "ROLE_ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_ignores_case() {
        assert_eq!(TicketStatus::parse("Pendiente"), TicketStatus::Pending);
        assert_eq!(TicketStatus::parse("EN REPARACIÓN"), TicketStatus::InRepair);
        assert_eq!(TicketStatus::parse("LISTO"), TicketStatus::Done);
    }

    #[test]
    fn test_status_unknown_keeps_raw_value() {
        let status = TicketStatus::parse("Archivado");
        assert_eq!(status, TicketStatus::Unknown("Archivado".to_string()));
        assert_eq!(status.as_wire(), "Archivado");
        assert!(status.is_unknown());
    }

    #[test]
    fn test_status_null_is_unknown() {
        let status: TicketStatus = serde_json::from_str("null").unwrap();
        assert!(status.is_unknown());
    }

    #[test]
    fn test_status_serializes_canonical_label() {
        let json = serde_json::to_string(&TicketStatus::parse("Listo")).unwrap();
        assert_eq!(json, "\"listo\"");
    }

    #[test]
    fn test_priority_badge() {
        assert_eq!(Priority::parse("ALTA").badge_class(), "badge-high");
        assert_eq!(Priority::parse("urgente").badge_class(), "badge-other");
    }

    #[test]
    fn test_role_wire_names() {
        let role: Role = serde_json::from_str("\"ROLE_CLIENTE\"").unwrap();
        assert_eq!(role, Role::Client);
        assert_eq!("ROLE_ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("ROLE_TECNICO".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "ROLE_ADMIN");
    }
}
