//! Client dashboard route handlers.
//!
//! The dashboard page renders immediately with a loading region; HTMX then
//! fetches the ticket region from `/client/tickets`. The profile header, the
//! ticket table and the notification control each fail on their own.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use repairdesk_core::{
    Lifecycle, StageView, Ticket, TicketId, TicketStatus, lifecycle::DATE_PLACEHOLDER,
    lifecycle::format_date,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::backend::BackendError;
use crate::error::Result;
use crate::middleware::{
    RequireClient, current_session, hx_redirect, is_htmx, is_notified, remember_notified,
    sign_out,
};
use crate::models::CurrentSession;
use crate::routes::ProfileView;
use crate::services::notifications::{self, NotifyOutcome, NotifyRegion};
use crate::services::tickets::{FeedOutcome, LOADING_MESSAGE, TicketFeed, load_feed};
use crate::state::AppState;

/// Shown in the price column until the shop sets a price.
const PRICE_PLACEHOLDER: &str = "—";

/// Frequently asked questions shown under the ticket region.
const FAQ: &[(&str, &str)] = &[
    (
        "¿Cuándo recibiré mi equipo reparado?",
        "Recibirás tu equipo dentro de los 3 a 5 días hábiles, dependiendo de la complejidad del problema.",
    ),
    (
        "¿Dónde puedo consultar el estado de mi reparación?",
        "Desde este panel podés ver en qué etapa está tu ticket: pendiente, en reparación o listo.",
    ),
    (
        "¿Qué pasa si no estoy conforme con la reparación?",
        "Podés contactarnos dentro de los 7 días para realizar un reclamo o revisión adicional sin costo.",
    ),
    (
        "¿Cómo me notifican los avances?",
        "Te enviamos actualizaciones por email. También podés revisar este panel con tu usuario.",
    ),
    (
        "¿Cuáles son los métodos de pago?",
        "Podés pagar en efectivo, transferencia o con tarjeta al momento de retirar el equipo.",
    ),
];

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters selecting the featured ticket.
#[derive(Debug, Default, Deserialize)]
pub struct TicketQuery {
    pub ticket: Option<i64>,
}

impl TicketQuery {
    fn requested(&self) -> Option<TicketId> {
        self.ticket.map(TicketId::new)
    }
}

// =============================================================================
// View Types
// =============================================================================

/// One row of the client's ticket table.
#[derive(Debug, Clone)]
pub struct TicketRowView {
    pub id: i64,
    pub description: String,
    pub status: String,
    pub tone: &'static str,
    pub created_on: String,
    pub price: String,
    pub solution: String,
    pub selected: bool,
}

impl TicketRowView {
    fn new(ticket: &Ticket, selected: bool) -> Self {
        Self {
            id: ticket.id.as_i64(),
            description: ticket.description.clone(),
            status: status_label(&ticket.status),
            tone: status_tone(&ticket.status),
            created_on: ticket
                .created_on
                .map_or_else(|| DATE_PLACEHOLDER.to_string(), format_date),
            price: ticket
                .price
                .map_or_else(|| PRICE_PLACEHOLDER.to_string(), |p| format!("$ {p}")),
            solution: ticket.solution.clone().unwrap_or_default(),
            selected,
        }
    }
}

/// Notification control for the featured ticket.
#[derive(Debug, Clone)]
pub struct NotifyView {
    pub ticket_id: i64,
    pub on: bool,
    pub disabled: bool,
    pub error: Option<&'static str>,
}

impl NotifyView {
    fn new(region: &NotifyRegion) -> Self {
        Self {
            ticket_id: region.ticket_id.as_i64(),
            on: region.toggle.is_on(),
            disabled: region.toggle.is_disabled(),
            error: region.error,
        }
    }

    /// Button caption.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        if self.on {
            "Notificaciones activadas"
        } else {
            "Activar notificaciones"
        }
    }
}

/// Lifecycle progress and notification control of the featured ticket.
#[derive(Debug, Clone)]
pub struct FeaturedView {
    pub id: i64,
    pub description: String,
    pub status: String,
    pub unknown: bool,
    pub stages: Vec<StageView>,
    pub notify: NotifyView,
}

// =============================================================================
// Templates
// =============================================================================

/// Client dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "client/dashboard.html")]
pub struct DashboardTemplate {
    pub profile: ProfileView,
    pub tickets_url: String,
    pub loading_message: &'static str,
    pub faq: &'static [(&'static str, &'static str)],
}

/// Ticket region fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "client/tickets.html")]
pub struct TicketsFragment {
    pub message: Option<&'static str>,
    pub rows: Vec<TicketRowView>,
    pub featured: Option<FeaturedView>,
}

/// Notification control fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "client/notify.html")]
pub struct NotifyFragment {
    pub notify: NotifyView,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the client dashboard shell.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireClient(current): RequireClient,
    session: Session,
    Query(query): Query<TicketQuery>,
) -> Result<Response> {
    let profile = match state.backend().profile(&current.token, current.email()).await {
        Ok(profile) => ProfileView::loaded(&profile),
        Err(BackendError::Unauthorized) => return Err(sign_out(&session, false).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load client profile");
            ProfileView::failed()
        }
    };

    let tickets_url = match query.ticket {
        Some(id) => format!("/client/tickets?ticket={id}"),
        None => "/client/tickets".to_string(),
    };

    Ok(DashboardTemplate {
        profile,
        tickets_url,
        loading_message: LOADING_MESSAGE,
        faq: FAQ,
    }
    .into_response())
}

/// Load the ticket region (HTMX fragment).
pub async fn tickets(
    State(state): State<AppState>,
    RequireClient(current): RequireClient,
    session: Session,
    Query(query): Query<TicketQuery>,
) -> Result<Response> {
    let reread = || async { current_session(&session).await.map(|c| c.identity) };

    let feed = match load_feed(state.backend(), &current, reread).await {
        FeedOutcome::Current(feed) => feed,
        FeedOutcome::SignedOut => return Err(sign_out(&session, true).await),
        FeedOutcome::Superseded => return Ok(hx_redirect("/")),
    };

    let selected = state
        .config()
        .ticket_selection
        .select(feed.tickets(), query.requested());

    let featured = match selected {
        Some(ticket) => match featured_view(&state, &current, &session, ticket).await {
            Some(view) => Some(view),
            None => return Err(sign_out(&session, true).await),
        },
        None => None,
    };

    Ok(TicketsFragment {
        message: feed.message(),
        rows: rows(&feed, selected.map(|t| t.id)),
        featured,
    }
    .into_response())
}

/// Turn on notifications for a ticket.
///
/// Answers HTMX with the refreshed control; plain form posts are sent back
/// to the dashboard.
pub async fn enable_notifications(
    State(state): State<AppState>,
    RequireClient(current): RequireClient,
    session: Session,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Response> {
    let id = TicketId::new(id);
    let htmx = is_htmx(&headers);
    let remembered = is_notified(&session, id).await;

    let region = match notifications::enable(
        state.backend(),
        state.pending_notifications(),
        &current,
        id,
        remembered,
    )
    .await
    {
        NotifyOutcome::Region(region) => region,
        NotifyOutcome::SignedOut => return Err(sign_out(&session, htmx).await),
    };

    if region.toggle.is_on() {
        remember(&session, id).await;
    }

    if htmx {
        Ok(NotifyFragment {
            notify: NotifyView::new(&region),
        }
        .into_response())
    } else {
        Ok(Redirect::to(&format!("/client?ticket={id}")).into_response())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Build the featured ticket view. `None` means the token was rejected.
async fn featured_view(
    state: &AppState,
    current: &CurrentSession,
    session: &Session,
    ticket: &Ticket,
) -> Option<FeaturedView> {
    let remembered = is_notified(session, ticket.id).await;
    let region = match notifications::probe(state.backend(), current, ticket.id, remembered).await
    {
        NotifyOutcome::Region(region) => region,
        NotifyOutcome::SignedOut => return None,
    };
    if region.toggle.is_on() && !remembered {
        remember(session, ticket.id).await;
    }

    let lifecycle = Lifecycle::for_ticket(ticket);
    Some(FeaturedView {
        id: ticket.id.as_i64(),
        description: ticket.description.clone(),
        status: status_label(&ticket.status),
        unknown: lifecycle.is_unknown(),
        stages: lifecycle.stages().to_vec(),
        notify: NotifyView::new(&region),
    })
}

fn rows(feed: &TicketFeed, selected: Option<TicketId>) -> Vec<TicketRowView> {
    feed.tickets()
        .iter()
        .map(|t| TicketRowView::new(t, Some(t.id) == selected))
        .collect()
}

async fn remember(session: &Session, id: TicketId) {
    if let Err(e) = remember_notified(session, id).await {
        tracing::warn!(error = %e, ticket_id = %id, "Failed to remember notification state");
    }
}

/// Status text as shown to the client.
fn status_label(status: &TicketStatus) -> String {
    match status {
        TicketStatus::Unknown(raw) if raw.trim().is_empty() => "desconocido".to_string(),
        other => other.as_wire().to_string(),
    }
}

/// Colour token of a status; unknown statuses are grey.
pub(crate) fn status_tone(status: &TicketStatus) -> &'static str {
    repairdesk_core::Stage::of(status).map_or("grey", repairdesk_core::Stage::tone)
}
