//! Ticket backend integration.
//!
//! The backend owns users, tickets and authentication. This module provides:
//! - [`BackendClient`] for every REST call the front desk makes
//! - [`TicketSource`], the seam the client dashboard services depend on
//! - [`BackendError`], one error type for transport, status and decode failures
//!
//! # Endpoints
//!
//! ```text
//! POST   /users/login                  - Exchange credentials for a token (body text)
//! POST   /users                        - Create an account
//! GET    /users/email/{email}          - Profile of a user
//! GET    /tickets                      - Every ticket
//! GET    /tickets/cliente/{email}      - Tickets owned by a client
//! GET    /tickets/estadisticas         - Summary counters
//! GET    /tickets/por-mes              - Tickets created per month
//! POST   /tickets                      - Create a ticket
//! PUT    /tickets/{id}                 - Update a ticket
//! DELETE /tickets/{id}                 - Delete a ticket
//! PUT    /tickets/{id}/notificacion    - Enable status-change emails
//! ```

mod client;
mod error;
mod types;

pub use client::{BackendClient, TicketSource};
pub use error::BackendError;
pub use types::{NewAccount, UserProfile};
