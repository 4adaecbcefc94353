//! Repair lifecycle progress derived from a ticket's status.
//!
//! A ticket moves through three stages in a fixed order:
//!
//! ```text
//! pendiente (0) -> en reparación (1) -> listo (2)
//! ```
//!
//! The current status is mapped to an ordinal in that sequence, and every
//! stage at or before the ordinal is shown as completed. The mapping is a pure
//! function of the status the backend reports right now: there is no memory of
//! earlier statuses, so a ticket moved back to `pendiente` renders exactly
//! that. Statuses outside the vocabulary map to [`UNKNOWN_ORDINAL`] and leave
//! every stage incomplete.

use chrono::NaiveDate;

use crate::ticket::Ticket;
use crate::types::TicketStatus;

/// Ordinal of a status outside the stage sequence.
pub const UNKNOWN_ORDINAL: i8 = -1;

/// Rendered in place of a stage date the backend has not recorded.
pub const DATE_PLACEHOLDER: &str = "—";

/// One step of the repair lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Pending,
    InRepair,
    Done,
}

impl Stage {
    /// The stages in lifecycle order.
    pub const SEQUENCE: [Self; 3] = [Self::Pending, Self::InRepair, Self::Done];

    /// Position of the stage in [`Stage::SEQUENCE`].
    #[must_use]
    pub const fn ordinal(self) -> i8 {
        match self {
            Self::Pending => 0,
            Self::InRepair => 1,
            Self::Done => 2,
        }
    }

    /// Label shown under the stage marker.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::InRepair => "en reparación",
            Self::Done => "listo",
        }
    }

    /// Colour token shared by the progress markers and the ticket table.
    #[must_use]
    pub const fn tone(self) -> &'static str {
        match self {
            Self::Pending => "yellow",
            Self::InRepair => "orange",
            Self::Done => "green",
        }
    }

    /// The stage a status corresponds to, if any.
    #[must_use]
    pub const fn of(status: &TicketStatus) -> Option<Self> {
        match status {
            TicketStatus::Pending => Some(Self::Pending),
            TicketStatus::InRepair => Some(Self::InRepair),
            TicketStatus::Done => Some(Self::Done),
            TicketStatus::Unknown(_) => None,
        }
    }
}

/// Ordinal of a raw status string, ignoring case.
#[must_use]
pub fn ordinal_of(raw_status: &str) -> i8 {
    status_ordinal(&TicketStatus::parse(raw_status))
}

/// Ordinal of a decoded status; [`UNKNOWN_ORDINAL`] for unknown values.
#[must_use]
pub const fn status_ordinal(status: &TicketStatus) -> i8 {
    match Stage::of(status) {
        Some(stage) => stage.ordinal(),
        None => UNKNOWN_ORDINAL,
    }
}

/// Whether the stage at `stage_ordinal` counts as reached for a ticket at
/// `current_ordinal`.
#[must_use]
pub const fn is_completed(stage_ordinal: i8, current_ordinal: i8) -> bool {
    stage_ordinal <= current_ordinal
}

/// Format a stage date the way the shop writes dates (`DD/MM/YYYY`).
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// The date recorded for each stage, when the backend has one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageDates {
    pub pending: Option<NaiveDate>,
    pub in_repair: Option<NaiveDate>,
    pub done: Option<NaiveDate>,
}

impl StageDates {
    /// Dates of a ticket. The pending stage is dated by the creation date,
    /// falling back to the pending-since date.
    #[must_use]
    pub fn of(ticket: &Ticket) -> Self {
        Self {
            pending: ticket.created_on.or(ticket.pending_since),
            in_repair: ticket.repair_started_on,
            done: ticket.completed_on,
        }
    }

    const fn get(&self, stage: Stage) -> Option<NaiveDate> {
        match stage {
            Stage::Pending => self.pending,
            Stage::InRepair => self.in_repair,
            Stage::Done => self.done,
        }
    }
}

/// Display state of one stage marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageView {
    pub stage: Stage,
    pub completed: bool,
    /// Formatted date, or [`DATE_PLACEHOLDER`].
    pub date: String,
}

impl StageView {
    /// Label of the stage.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.stage.label()
    }

    /// Colour token of the stage.
    #[must_use]
    pub const fn tone(&self) -> &'static str {
        self.stage.tone()
    }
}

/// The full progress widget state for one ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    ordinal: i8,
    stages: Vec<StageView>,
}

impl Lifecycle {
    /// Build the progress state from a status and its stage dates.
    #[must_use]
    pub fn new(status: &TicketStatus, dates: StageDates) -> Self {
        let ordinal = status_ordinal(status);
        let stages = Stage::SEQUENCE
            .iter()
            .map(|&stage| StageView {
                stage,
                completed: is_completed(stage.ordinal(), ordinal),
                date: dates
                    .get(stage)
                    .map_or_else(|| DATE_PLACEHOLDER.to_string(), format_date),
            })
            .collect();

        Self { ordinal, stages }
    }

    /// Build the progress state for a ticket.
    #[must_use]
    pub fn for_ticket(ticket: &Ticket) -> Self {
        Self::new(&ticket.status, StageDates::of(ticket))
    }

    /// Current ordinal; [`UNKNOWN_ORDINAL`] when the status is not a stage.
    #[must_use]
    pub const fn ordinal(&self) -> i8 {
        self.ordinal
    }

    /// Whether the status was outside the stage vocabulary.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.ordinal == UNKNOWN_ORDINAL
    }

    /// The three stage markers in lifecycle order.
    #[must_use]
    pub fn stages(&self) -> &[StageView] {
        &self.stages
    }

    /// Number of completed stages.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.stages.iter().filter(|s| s.completed).count()
    }
}
