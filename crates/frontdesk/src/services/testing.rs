//! In-memory [`TicketSource`] for service tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use repairdesk_core::{Email, Identity, Role, Ticket, TicketId};
use secrecy::SecretString;

use crate::backend::{BackendError, TicketSource};
use crate::models::CurrentSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Ok,
    Fail,
    Unauthorized,
}

/// A ticket source answering from memory and recording what it was asked.
pub struct FakeSource {
    tickets: Vec<Ticket>,
    mode: Mode,
    notify_succeeds: bool,
    requested_emails: Mutex<Vec<String>>,
    notify_writes: Mutex<Vec<TicketId>>,
}

impl FakeSource {
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        Self {
            tickets,
            mode: Mode::Ok,
            notify_succeeds: true,
            requested_emails: Mutex::new(Vec::new()),
            notify_writes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            mode: Mode::Fail,
            notify_succeeds: false,
            ..Self::with_tickets(vec![])
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            mode: Mode::Unauthorized,
            ..Self::with_tickets(vec![])
        }
    }

    /// Reads succeed but the notify write is refused.
    pub fn rejecting_notify(tickets: Vec<Ticket>) -> Self {
        Self {
            notify_succeeds: false,
            ..Self::with_tickets(tickets)
        }
    }

    pub fn requested_emails(&self) -> Vec<String> {
        self.requested_emails.lock().unwrap().clone()
    }

    pub fn notify_writes(&self) -> Vec<TicketId> {
        self.notify_writes.lock().unwrap().clone()
    }

    fn failure(&self) -> Option<BackendError> {
        match self.mode {
            Mode::Ok => None,
            Mode::Fail => Some(BackendError::Transport("connection refused".to_string())),
            Mode::Unauthorized => Some(BackendError::Unauthorized),
        }
    }
}

impl TicketSource for FakeSource {
    async fn tickets_for(
        &self,
        _token: &SecretString,
        email: &Email,
    ) -> Result<Vec<Ticket>, BackendError> {
        self.requested_emails
            .lock()
            .unwrap()
            .push(email.as_str().to_string());
        match self.failure() {
            Some(e) => Err(e),
            None => Ok(self.tickets.clone()),
        }
    }

    async fn enable_notifications(
        &self,
        _token: &SecretString,
        id: TicketId,
    ) -> Result<(), BackendError> {
        self.notify_writes.lock().unwrap().push(id);
        if let Some(e) = self.failure() {
            return Err(e);
        }
        if self.notify_succeeds {
            Ok(())
        } else {
            Err(BackendError::status(500, "mail relay down"))
        }
    }
}

/// A signed-in session for `email` with a dummy token.
pub fn session_for(email: &str, role: Role) -> CurrentSession {
    CurrentSession {
        token: SecretString::from("test-token"),
        identity: Identity {
            email: Email::parse(email).unwrap(),
            role,
        },
    }
}
