//! Client ticket feed.
//!
//! Loads the signed-in client's tickets and classifies the result into the
//! three outcomes the dashboard renders differently. A result is only handed
//! back if the session still belongs to the identity the fetch was issued
//! for; otherwise it is dropped as superseded.

use std::future::Future;

use repairdesk_core::{Identity, Ticket};
use tracing::{info, warn};

use crate::backend::TicketSource;
use crate::models::CurrentSession;

/// Shown when the client has no tickets.
pub const EMPTY_MESSAGE: &str = "No tenés tickets creados todavía.";

/// Shown when the tickets could not be loaded.
pub const FAILED_MESSAGE: &str = "Hubo un problema al cargar tus tickets.";

/// Shown while the tickets are being loaded.
pub const LOADING_MESSAGE: &str = "Cargando tus tickets...";

/// What the ticket region shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketFeed {
    /// At least one ticket, in the backend's order.
    Loaded(Vec<Ticket>),
    /// The backend answered with an empty list.
    Empty,
    /// Transport failure, non-success status or undecodable body.
    Failed,
}

impl TicketFeed {
    /// The message shown instead of the table, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Loaded(_) => None,
            Self::Empty => Some(EMPTY_MESSAGE),
            Self::Failed => Some(FAILED_MESSAGE),
        }
    }

    /// The tickets, empty unless loaded.
    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        match self {
            Self::Loaded(tickets) => tickets,
            Self::Empty | Self::Failed => &[],
        }
    }
}

/// Result of a fetch, checked against the session when it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The feed for the identity that is still signed in.
    Current(TicketFeed),
    /// The backend rejected the token; the session must be treated as signed out.
    SignedOut,
    /// The session changed identity while the fetch was in flight.
    Superseded,
}

/// Fetch the tickets of the signed-in client.
///
/// `reread` resolves the session's identity again once the response is in;
/// the feed is only returned if it matches the identity the fetch used.
pub async fn load_feed<S, R, Fut>(
    source: &S,
    current: &CurrentSession,
    reread: R,
) -> FeedOutcome
where
    S: TicketSource,
    R: FnOnce() -> Fut,
    Fut: Future<Output = Option<Identity>>,
{
    let result = source.tickets_for(&current.token, current.email()).await;

    if !still_current(&current.identity, reread().await.as_ref()) {
        info!(email = %current.email(), "Discarding ticket feed for superseded identity");
        return FeedOutcome::Superseded;
    }

    let feed = match result {
        Ok(tickets) if tickets.is_empty() => TicketFeed::Empty,
        Ok(tickets) => TicketFeed::Loaded(tickets),
        Err(e) if e.is_unauthorized() => return FeedOutcome::SignedOut,
        Err(e) => {
            warn!(error = %e, email = %current.email(), "Failed to load client tickets");
            TicketFeed::Failed
        }
    };

    FeedOutcome::Current(feed)
}

/// Whether the identity a fetch was issued for is still signed in.
fn still_current(issued_for: &Identity, now: Option<&Identity>) -> bool {
    now.is_some_and(|now| {
        now.role == issued_for.role && now.email.same_identity(&issued_for.email)
    })
}
