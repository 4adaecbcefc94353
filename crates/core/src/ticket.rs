//! Ticket records as exchanged with the backend.
//!
//! The backend owns every ticket: it assigns ids, records status changes and
//! their dates, and enforces the one-way notification flag. These types only
//! mirror its JSON (camelCase, Spanish field names) so the front-end can read
//! and submit them.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Email, Price, Priority, TicketId, TicketStatus};

/// A repair work order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    /// Email of the owning client. Kept as text: a malformed or null owner
    /// must not make the whole ticket list undecodable.
    #[serde(rename = "clienteEmail", default, deserialize_with = "null_as_default")]
    pub client_email: String,
    #[serde(
        rename = "descripcionProblema",
        default,
        deserialize_with = "null_as_default"
    )]
    pub description: String,
    #[serde(rename = "estado", default = "missing_status")]
    pub status: TicketStatus,
    #[serde(rename = "solucion", default)]
    pub solution: Option<String>,
    #[serde(rename = "precio", default)]
    pub price: Option<Price>,
    #[serde(rename = "prioridad", default)]
    pub priority: Option<Priority>,
    #[serde(rename = "fechaCreacion", default)]
    pub created_on: Option<NaiveDate>,
    #[serde(rename = "fechaPendiente", default)]
    pub pending_since: Option<NaiveDate>,
    #[serde(rename = "fechaReparacion", default)]
    pub repair_started_on: Option<NaiveDate>,
    #[serde(rename = "fechaListo", default)]
    pub completed_on: Option<NaiveDate>,
    /// Whether the client opted into status-change emails.
    #[serde(
        rename = "notificarCliente",
        default,
        deserialize_with = "null_as_default"
    )]
    pub notify: bool,
}

fn missing_status() -> TicketStatus {
    TicketStatus::Unknown(String::new())
}

/// Read a JSON `null` the same as a missing field.
///
/// # Errors
///
/// Fails when the value is present but of the wrong type.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Request body for creating a ticket from the admin console.
#[derive(Debug, Clone, Serialize)]
pub struct NewTicket {
    #[serde(rename = "clienteEmail")]
    pub client_email: String,
    #[serde(rename = "descripcionProblema")]
    pub description: String,
    #[serde(rename = "estado")]
    pub status: TicketStatus,
    #[serde(rename = "prioridad", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(rename = "precio", skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(rename = "fechaCreacion")]
    pub created_on: NaiveDate,
}

impl NewTicket {
    /// A new ticket always starts out pending, owned by the lowercase email.
    #[must_use]
    pub fn pending(
        client: &Email,
        description: String,
        priority: Option<Priority>,
        price: Option<Price>,
        today: NaiveDate,
    ) -> Self {
        Self {
            client_email: client.normalized(),
            description,
            status: TicketStatus::Pending,
            priority,
            price,
            created_on: today,
        }
    }
}

/// Partial update for an existing ticket. Absent fields are left untouched
/// by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketUpdate {
    #[serde(rename = "estado", skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(rename = "solucion", skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(rename = "precio", skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(rename = "prioridad", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(rename = "descripcionProblema", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TicketUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.solution.is_none()
            && self.price.is_none()
            && self.priority.is_none()
            && self.description.is_none()
    }
}

/// Shop-wide ticket counters for the admin summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TicketStats {
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "pendientes", default)]
    pub pending: u64,
    #[serde(rename = "reparacion", default)]
    pub in_repair: u64,
    #[serde(rename = "resueltos", default)]
    pub done: u64,
}

/// Number of tickets created in one month, as returned for the chart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonthlyCount {
    /// Short Spanish month name (`ene`, `feb`, ...).
    #[serde(rename = "mes")]
    pub month: String,
    #[serde(rename = "tickets")]
    pub count: u64,
}
