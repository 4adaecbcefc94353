//! Types stored in or derived from the session.

pub mod session;

pub use session::{CurrentSession, keys as session_keys};
