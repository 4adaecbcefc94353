//! Business logic services for the front desk.
//!
//! # Services
//!
//! - `auth` - Login and signup against the backend
//! - `tickets` - The client's ticket feed and its three outcomes
//! - `notifications` - Reading and enabling a ticket's email opt-in

pub mod auth;
pub mod notifications;
pub mod tickets;

#[cfg(test)]
pub(crate) mod testing;
