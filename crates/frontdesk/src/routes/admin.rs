//! Admin console route handlers.
//!
//! The console shows every ticket, the summary counters and the monthly
//! chart. The four regions are fetched concurrently and each one that fails
//! shows its own message while the others render normally.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Local;
use repairdesk_core::{
    Email, MonthlyCount, NewTicket, Price, PriceError, Priority, Ticket, TicketId, TicketStats,
    TicketStatus, TicketUpdate, lifecycle::DATE_PLACEHOLDER, lifecycle::format_date,
};
use serde::Deserialize;
use tower_sessions::Session;

use super::auth::MessageQuery;
use super::client::status_tone;
use crate::backend::BackendError;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequireAdmin, sign_out};
use crate::routes::ProfileView;
use crate::state::AppState;

const TICKETS_FAILED: &str = "No se pudieron cargar los tickets.";
const TICKETS_EMPTY: &str = "No hay tickets registrados.";
const STATS_FAILED: &str = "No se pudieron cargar las estadísticas.";
const CHART_FAILED: &str = "No se pudo cargar el gráfico.";

/// Status values offered in the update form.
const STATUS_OPTIONS: [&str; 3] = ["pendiente", "en reparación", "listo"];

/// Priority values offered in the forms.
const PRIORITY_OPTIONS: [&str; 3] = ["alta", "media", "baja"];

// =============================================================================
// Form Types
// =============================================================================

/// Ticket creation form data.
#[derive(Debug, Deserialize)]
pub struct CreateTicketForm {
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<String>,
    pub price: Option<String>,
}

/// Ticket update form data. Blank fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateTicketForm {
    pub status: Option<String>,
    pub solution: Option<String>,
    pub price: Option<String>,
    pub priority: Option<String>,
}

// =============================================================================
// View Types
// =============================================================================

/// One row of the all-tickets table.
#[derive(Debug, Clone)]
pub struct AdminTicketRow {
    pub id: i64,
    pub client_email: String,
    pub description: String,
    pub status: String,
    pub tone: &'static str,
    pub priority: Option<String>,
    pub priority_class: &'static str,
    pub price: String,
    pub solution: String,
    pub created_on: String,
}

impl AdminTicketRow {
    fn new(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id.as_i64(),
            client_email: ticket.client_email.clone(),
            description: ticket.description.clone(),
            status: ticket.status.as_wire().to_string(),
            tone: status_tone(&ticket.status),
            priority: ticket.priority.as_ref().map(|p| p.as_wire().to_string()),
            priority_class: ticket
                .priority
                .as_ref()
                .map_or("badge-other", Priority::badge_class),
            price: ticket.price.map(|p| p.to_string()).unwrap_or_default(),
            solution: ticket.solution.clone().unwrap_or_default(),
            created_on: ticket
                .created_on
                .map_or_else(|| DATE_PLACEHOLDER.to_string(), format_date),
        }
    }
}

/// One bar of the monthly chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBar {
    pub month: String,
    pub count: u64,
    /// Height relative to the busiest month, 0 to 100.
    pub height_pct: u64,
}

/// A region that either loaded or shows a message.
#[derive(Debug, Clone)]
pub struct Region<T> {
    pub data: T,
    pub message: Option<&'static str>,
}

// =============================================================================
// Templates
// =============================================================================

/// Admin console page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub profile: ProfileView,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
    pub tickets: Region<Vec<AdminTicketRow>>,
    pub stats: Region<Option<TicketStats>>,
    pub chart: Region<Vec<ChartBar>>,
    pub status_options: [&'static str; 3],
    pub priority_options: [&'static str; 3],
}

// =============================================================================
// Routes
// =============================================================================

/// Display the admin console.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let backend = state.backend();
    let (tickets, stats, monthly, profile) = tokio::join!(
        backend.all_tickets(&current.token),
        backend.stats(&current.token),
        backend.monthly_counts(&current.token),
        backend.profile(&current.token, current.email()),
    );

    if [
        tickets.as_ref().err(),
        stats.as_ref().err(),
        monthly.as_ref().err(),
        profile.as_ref().err(),
    ]
    .into_iter()
    .flatten()
    .any(BackendError::is_unauthorized)
    {
        return Err(sign_out(&session, false).await);
    }

    let tickets = match tickets {
        Ok(list) if list.is_empty() => Region {
            data: Vec::new(),
            message: Some(TICKETS_EMPTY),
        },
        Ok(list) => Region {
            data: list.iter().map(AdminTicketRow::new).collect(),
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load tickets");
            Region {
                data: Vec::new(),
                message: Some(TICKETS_FAILED),
            }
        }
    };

    let stats = match stats {
        Ok(stats) => Region {
            data: Some(stats),
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load ticket stats");
            Region {
                data: None,
                message: Some(STATS_FAILED),
            }
        }
    };

    let chart = match monthly {
        Ok(months) => Region {
            data: chart_bars(&months),
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load monthly counts");
            Region {
                data: Vec::new(),
                message: Some(CHART_FAILED),
            }
        }
    };

    let profile = match profile {
        Ok(profile) => ProfileView::loaded(&profile),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load admin profile");
            ProfileView::failed()
        }
    };

    Ok(DashboardTemplate {
        profile,
        error: query.error.as_deref().and_then(error_message),
        success: query.success.as_deref().and_then(success_message),
        tickets,
        stats,
        chart,
        status_options: STATUS_OPTIONS,
        priority_options: PRIORITY_OPTIONS,
    }
    .into_response())
}

/// Create a ticket.
pub async fn create_ticket(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    session: Session,
    Form(form): Form<CreateTicketForm>,
) -> Result<Response> {
    if form.client_email.trim().is_empty() || form.description.trim().is_empty() {
        return Ok(back_with_error("missing"));
    }
    let Ok(client) = Email::parse(&form.client_email) else {
        return Ok(back_with_error("email"));
    };
    let Ok(price) = parse_price(form.price.as_deref()) else {
        return Ok(back_with_error("price"));
    };

    let ticket = NewTicket::pending(
        &client,
        form.description.trim().to_string(),
        non_blank(form.priority.as_deref()).map(Priority::parse),
        price,
        Local::now().date_naive(),
    );

    match state.backend().create_ticket(&current.token, &ticket).await {
        Ok(()) => {
            add_breadcrumb(
                "tickets",
                "Created ticket",
                Some(&[("client", client.as_str())][..]),
            );
            Ok(Redirect::to("/admin?success=created").into_response())
        }
        Err(e) => backend_failure(&session, &e).await,
    }
}

/// Update a ticket's status, solution, price or priority.
pub async fn update_ticket(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    session: Session,
    Path(id): Path<i64>,
    Form(form): Form<UpdateTicketForm>,
) -> Result<Response> {
    let Ok(price) = parse_price(form.price.as_deref()) else {
        return Ok(back_with_error("price"));
    };
    let update = TicketUpdate {
        status: non_blank(form.status.as_deref()).map(TicketStatus::parse),
        solution: non_blank(form.solution.as_deref()).map(String::from),
        price,
        priority: non_blank(form.priority.as_deref()).map(Priority::parse),
        description: None,
    };
    if update.is_empty() {
        return Ok(back_with_error("empty_update"));
    }

    let id = TicketId::new(id);
    match state.backend().update_ticket(&current.token, id, &update).await {
        Ok(()) => Ok(Redirect::to("/admin?success=updated").into_response()),
        Err(e) => backend_failure(&session, &e).await,
    }
}

/// Delete a ticket.
pub async fn delete_ticket(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response> {
    let id = TicketId::new(id);
    match state.backend().delete_ticket(&current.token, id).await {
        Ok(()) => Ok(Redirect::to("/admin?success=deleted").into_response()),
        Err(e) => backend_failure(&session, &e).await,
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Scale monthly counts to bar heights relative to the busiest month.
#[must_use]
pub fn chart_bars(months: &[MonthlyCount]) -> Vec<ChartBar> {
    let max = months.iter().map(|m| m.count).max().unwrap_or(0);
    months
        .iter()
        .map(|m| ChartBar {
            month: m.month.clone(),
            count: m.count,
            height_pct: if max == 0 { 0 } else { m.count * 100 / max },
        })
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(value: Option<&str>) -> std::result::Result<Option<Price>, PriceError> {
    non_blank(value).map(Price::parse).transpose()
}

fn back_with_error(code: &str) -> Response {
    Redirect::to(&format!("/admin?error={code}")).into_response()
}

async fn backend_failure(session: &Session, err: &BackendError) -> Result<Response> {
    if err.is_unauthorized() {
        return Err(sign_out(session, false).await);
    }
    tracing::warn!(error = %err, "Ticket change refused by backend");
    Ok(back_with_error("backend"))
}

fn error_message(code: &str) -> Option<&'static str> {
    match code {
        "missing" => Some("El email del cliente y la descripción son obligatorios."),
        "email" => Some("El email del cliente no es válido."),
        "price" => Some("El precio debe ser un número positivo."),
        "empty_update" => Some("No hay cambios para guardar."),
        "backend" => Some("El servidor rechazó la operación. Intenta más tarde."),
        _ => None,
    }
}

fn success_message(code: &str) -> Option<&'static str> {
    match code {
        "created" => Some("Ticket creado."),
        "updated" => Some("Ticket actualizado."),
        "deleted" => Some("Ticket eliminado."),
        _ => None,
    }
}
