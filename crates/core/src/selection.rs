//! Which ticket drives the progress and notification widgets.
//!
//! The client dashboard shows one ticket's lifecycle at a time. The backend
//! returns tickets in no guaranteed order, so the choice is a named policy
//! rather than "index 0", and an explicit request for a ticket in the list
//! always wins.

use std::str::FromStr;

use crate::ticket::Ticket;
use crate::types::TicketId;

/// Policy for picking the ticket when none is requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TicketSelection {
    /// The first ticket in the order the backend returned them.
    #[default]
    First,
    /// The most recently created ticket (latest creation date, then highest id).
    Latest,
}

impl FromStr for TicketSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(Self::First),
            "latest" => Ok(Self::Latest),
            other => Err(format!("expected 'first' or 'latest', got '{other}'")),
        }
    }
}

impl TicketSelection {
    /// Pick the ticket to feature.
    ///
    /// `requested` wins when it names a ticket in `tickets`; otherwise the
    /// policy decides. Returns `None` only for an empty list.
    #[must_use]
    pub fn select(self, tickets: &[Ticket], requested: Option<TicketId>) -> Option<&Ticket> {
        if let Some(id) = requested
            && let Some(ticket) = tickets.iter().find(|t| t.id == id)
        {
            return Some(ticket);
        }

        match self {
            Self::First => tickets.first(),
            Self::Latest => tickets
                .iter()
                .max_by_key(|t| (t.created_on, t.id.as_i64())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::types::TicketStatus;

    fn ticket(id: i64, created: Option<(i32, u32, u32)>) -> Ticket {
        Ticket {
            id: TicketId::new(id),
            client_email: "x@y.com".to_string(),
            description: String::new(),
            status: TicketStatus::Pending,
            solution: None,
            price: None,
            priority: None,
            created_on: created.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            pending_since: None,
            repair_started_on: None,
            completed_on: None,
            notify: false,
        }
    }

    #[test]
    fn test_first_keeps_backend_order() {
        let tickets = vec![ticket(5, Some((2025, 1, 1))), ticket(9, Some((2025, 6, 1)))];
        let picked = TicketSelection::First.select(&tickets, None).unwrap();
        assert_eq!(picked.id, TicketId::new(5));
    }

    #[test]
    fn test_latest_prefers_newest_creation_date() {
        let tickets = vec![
            ticket(5, Some((2025, 1, 1))),
            ticket(9, Some((2025, 6, 1))),
            ticket(12, None),
        ];
        let picked = TicketSelection::Latest.select(&tickets, None).unwrap();
        assert_eq!(picked.id, TicketId::new(9));
    }

    #[test]
    fn test_requested_ticket_wins_when_present() {
        let tickets = vec![ticket(5, None), ticket(9, None)];
        let picked = TicketSelection::First
            .select(&tickets, Some(TicketId::new(9)))
            .unwrap();
        assert_eq!(picked.id, TicketId::new(9));

        // A ticket that is not in the list falls back to the policy.
        let picked = TicketSelection::First
            .select(&tickets, Some(TicketId::new(77)))
            .unwrap();
        assert_eq!(picked.id, TicketId::new(5));
    }

    #[test]
    fn test_empty_list() {
        assert!(TicketSelection::Latest.select(&[], None).is_none());
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("LATEST".parse::<TicketSelection>().unwrap(), TicketSelection::Latest);
        assert!("random".parse::<TicketSelection>().is_err());
    }
}
