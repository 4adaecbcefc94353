//! Email notification opt-in for the featured ticket.
//!
//! The initial state comes from a fresh read of the client's tickets, matched
//! by id. Turning notifications on is a single backend write driven through
//! [`NotificationToggle`]; once the toggle is on, nothing writes again.
//! Tickets known to be on are remembered in the session by the caller and
//! passed in as `remembered`. Writes still outstanding are tracked across
//! requests in [`PendingWrites`], so overlapping submissions write once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use repairdesk_core::{NotificationToggle, TicketId, Trigger};
use tracing::{debug, info, warn};

use crate::backend::TicketSource;
use crate::error::add_breadcrumb;
use crate::models::CurrentSession;

/// Shown when the current state could not be read.
pub const PROBE_FAILED_MESSAGE: &str = "No se pudo verificar el estado de las notificaciones.";

/// Shown when the write was refused or did not complete.
pub const ENABLE_FAILED_MESSAGE: &str =
    "No se pudieron activar las notificaciones. Intenta nuevamente.";

/// What the notification region shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRegion {
    pub ticket_id: TicketId,
    pub toggle: NotificationToggle,
    pub error: Option<&'static str>,
}

/// Toggles whose backend write is outstanding, shared by every request.
///
/// An entry exists only between the trigger and the end of its write.
#[derive(Debug, Clone, Default)]
pub struct PendingWrites {
    toggles: Arc<Mutex<HashMap<TicketId, NotificationToggle>>>,
}

impl PendingWrites {
    /// Start the write for `id`, or hand back the outstanding toggle.
    fn trigger(&self, id: TicketId) -> Result<PendingWrite<'_>, NotificationToggle> {
        let mut toggles = self.lock();
        let toggle = toggles.entry(id).or_default();
        match toggle.trigger() {
            Trigger::Write => Ok(PendingWrite { writes: self, id }),
            Trigger::AlreadyOn | Trigger::InFlight => Err(*toggle),
        }
    }

    /// Whether a write for `id` is outstanding.
    #[must_use]
    pub fn is_pending(&self, id: TicketId) -> bool {
        self.lock().contains_key(&id)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TicketId, NotificationToggle>> {
        self.toggles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the pending entry when the write ends, even if the request is dropped.
struct PendingWrite<'a> {
    writes: &'a PendingWrites,
    id: TicketId,
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        self.writes.lock().remove(&self.id);
    }
}

/// Outcome of reading or changing the notify flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Region(NotifyRegion),
    /// The backend rejected the token; the session must be treated as signed out.
    SignedOut,
}

/// Read the notify flag of ticket `id`.
///
/// A ticket missing from the list, or a failed read, leaves the toggle off.
pub async fn probe<S: TicketSource>(
    source: &S,
    current: &CurrentSession,
    id: TicketId,
    remembered: bool,
) -> NotifyOutcome {
    if remembered {
        return region(id, NotificationToggle::from_remote(true), None);
    }

    match source.tickets_for(&current.token, current.email()).await {
        Ok(tickets) => {
            let flag = tickets.iter().any(|t| t.id == id && t.notify);
            region(id, NotificationToggle::from_remote(flag), None)
        }
        Err(e) if e.is_unauthorized() => NotifyOutcome::SignedOut,
        Err(e) => {
            warn!(error = %e, ticket_id = %id, "Failed to read notification state");
            region(id, NotificationToggle::new(), Some(PROBE_FAILED_MESSAGE))
        }
    }
}

/// Turn notifications on for ticket `id`.
///
/// Performs the backend write only if the toggle is still off and no other
/// request is already writing it.
pub async fn enable<S: TicketSource>(
    source: &S,
    pending: &PendingWrites,
    current: &CurrentSession,
    id: TicketId,
    remembered: bool,
) -> NotifyOutcome {
    let mut toggle = NotificationToggle::from_remote(remembered);
    if toggle.is_on() {
        return region(id, toggle, None);
    }

    let write = match pending.trigger(id) {
        Ok(write) => write,
        Err(outstanding) => {
            debug!(ticket_id = %id, "Notification write already in flight");
            return region(id, outstanding, None);
        }
    };
    let result = source.enable_notifications(&current.token, id).await;
    drop(write);

    match result {
        Ok(()) => {
            toggle.complete(true);
            info!(ticket_id = %id, email = %current.email(), "Notifications enabled");
            let ticket_id = id.to_string();
            add_breadcrumb(
                "tickets",
                "Enabled notifications",
                Some(&[("ticket_id", ticket_id.as_str())][..]),
            );
            region(id, toggle, None)
        }
        Err(e) if e.is_unauthorized() => NotifyOutcome::SignedOut,
        Err(e) => {
            toggle.complete(false);
            warn!(error = %e, ticket_id = %id, "Failed to enable notifications");
            region(id, toggle, Some(ENABLE_FAILED_MESSAGE))
        }
    }
}

const fn region(
    ticket_id: TicketId,
    toggle: NotificationToggle,
    error: Option<&'static str>,
) -> NotifyOutcome {
    NotifyOutcome::Region(NotifyRegion {
        ticket_id,
        toggle,
        error,
    })
}
