//! Repair Desk Core - Shared types and view-model logic.
//!
//! This crate holds everything the front-end knows about repair tickets that
//! does not involve I/O:
//!
//! - [`types`] - newtypes and closed variants for emails, ids, prices, statuses
//! - [`ticket`] - ticket records in the backend's wire format
//! - [`lifecycle`] - status → stage progress mapping
//! - [`notification`] - the one-way notify toggle state machine
//! - [`identity`] - decoding the signed-in identity from the session token
//! - [`selection`] - choosing which ticket the dashboard features
//!
//! # Architecture
//!
//! No HTTP clients, no sessions, no templates. The `frontdesk` crate feeds
//! backend data in and renders what comes out.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod identity;
pub mod lifecycle;
pub mod notification;
pub mod selection;
pub mod ticket;
pub mod types;

pub use identity::{Identity, TokenError, decode_identity};
pub use lifecycle::{Lifecycle, Stage, StageView};
pub use notification::{NotificationToggle, NotifyState, Trigger};
pub use selection::TicketSelection;
pub use ticket::{MonthlyCount, NewTicket, Ticket, TicketStats, TicketUpdate};
pub use types::*;
