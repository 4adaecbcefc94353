//! End-to-end tests through the front desk pages.
//!
//! Each test starts a fake ticket backend and a front desk pointed at it,
//! then drives the pages with a cookie-keeping client the way a browser
//! with HTMX would.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use reqwest::{Client, StatusCode};
use repairdesk_integration_tests::{
    BackendData, FakeBackend, FakeUser, browser, log_in, spawn_frontdesk,
};
use serde_json::json;

const CLIENT: &str = "ana@taller.com";
const ADMIN: &str = "marta@taller.com";
const PASSWORD: &str = "secreto";

struct Harness {
    backend: FakeBackend,
    frontdesk: String,
    browser: Client,
}

impl Harness {
    async fn start(data: BackendData) -> Self {
        let mut data = data;
        data.users.push(FakeUser::client(CLIENT, PASSWORD));
        data.users.push(FakeUser::admin(ADMIN, PASSWORD));
        let backend = FakeBackend::start(data).await;
        let frontdesk = spawn_frontdesk(&backend.url(), 1).await;
        Self {
            backend,
            frontdesk,
            browser: browser(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.frontdesk)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.browser.get(self.url(path)).send().await.unwrap()
    }

    async fn htmx_get(&self, path: &str) -> reqwest::Response {
        self.browser
            .get(self.url(path))
            .header("hx-request", "true")
            .send()
            .await
            .unwrap()
    }
}

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
}

fn ticket(id: i64, status: &str, description: &str) -> serde_json::Value {
    json!({
        "id": id,
        "clienteEmail": CLIENT,
        "descripcionProblema": description,
        "estado": status,
        "fechaCreacion": "2025-03-01",
        "fechaPendiente": "2025-03-01",
    })
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_anonymous_visitors_are_sent_to_login() {
    let h = Harness::start(BackendData::default()).await;

    let response = h.get("/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");

    let response = h.get("/client").await;
    assert_eq!(location(&response), "/auth/login");

    let response = h.htmx_get("/client/tickets").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("hx-redirect").unwrap(),
        "/auth/login"
    );
}

#[tokio::test]
async fn test_login_routes_each_role_home() {
    let h = Harness::start(BackendData::default()).await;

    let response = h
        .browser
        .post(h.url("/auth/login"))
        .form(&[("email", CLIENT), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/client");

    let admin = browser();
    let response = admin
        .post(h.url("/auth/login"))
        .form(&[("email", ADMIN), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/admin");

    // Each role is kept out of the other's dashboard.
    let response = h.get("/admin").await;
    assert_eq!(location(&response), "/client");
    let response = admin.get(h.url("/client")).send().await.unwrap();
    assert_eq!(location(&response), "/admin");
}

#[tokio::test]
async fn test_login_failures_come_back_with_a_code() {
    let h = Harness::start(BackendData::default()).await;

    let response = h
        .browser
        .post(h.url("/auth/login"))
        .form(&[("email", CLIENT), ("password", "otra")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/auth/login?error=credentials");

    let response = h
        .browser
        .post(h.url("/auth/login"))
        .form(&[("email", ""), ("password", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/auth/login?error=missing");

    let page = h.get("/auth/login?error=credentials").await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("alert-error"));
}

#[tokio::test]
async fn test_signup_then_login() {
    let h = Harness::start(BackendData::default()).await;

    let response = h
        .browser
        .post(h.url("/auth/signup"))
        .form(&[
            ("first_name", "luis"),
            ("last_name", "ramos"),
            ("email", "luis@taller.com"),
            ("password", "clave123"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/auth/login?success=registered");

    log_in(&h.browser, &h.frontdesk, "luis@taller.com", "clave123").await;
    let page = h.get("/client").await.text().await.unwrap();
    assert!(page.contains("Hola, Luis Ramos"));
}

#[tokio::test]
async fn test_logout_clears_the_session() {
    let h = Harness::start(BackendData::default()).await;
    log_in(&h.browser, &h.frontdesk, CLIENT, PASSWORD).await;

    let response = h.browser.post(h.url("/auth/logout")).send().await.unwrap();
    assert_eq!(location(&response), "/auth/login?success=logged_out");

    let response = h.get("/client").await;
    assert_eq!(location(&response), "/auth/login");
}

// ============================================================================
// Client dashboard
// ============================================================================

#[tokio::test]
async fn test_dashboard_shell_then_empty_ticket_region() {
    let h = Harness::start(BackendData::default()).await;
    log_in(&h.browser, &h.frontdesk, CLIENT, PASSWORD).await;

    let page = h.get("/client").await;
    assert_eq!(page.status(), StatusCode::OK);
    let page = page.text().await.unwrap();
    assert!(page.contains("Hola, Ana Pérez"));
    assert!(page.contains("Cargando tus tickets..."));
    assert!(page.contains("hx-get=\"/client/tickets\""));
    assert!(page.contains("Preguntas frecuentes"));

    let fragment = h.htmx_get("/client/tickets").await.text().await.unwrap();
    assert!(fragment.contains("No tenés tickets creados todavía."));
    assert!(!fragment.contains("<table"));
}

#[tokio::test]
async fn test_ticket_region_failure_message() {
    let h = Harness::start(BackendData {
        tickets_status: Some(500),
        ..BackendData::default()
    })
    .await;
    log_in(&h.browser, &h.frontdesk, CLIENT, PASSWORD).await;

    let fragment = h.htmx_get("/client/tickets").await;
    assert_eq!(fragment.status(), StatusCode::OK);
    let fragment = fragment.text().await.unwrap();
    assert!(fragment.contains("Hubo un problema al cargar tus tickets."));
}

#[tokio::test]
async fn test_slow_backend_shows_failure_not_a_hang() {
    let h = Harness::start(BackendData {
        tickets_delay: Some(Duration::from_secs(3)),
        ..BackendData::default()
    })
    .await;
    log_in(&h.browser, &h.frontdesk, CLIENT, PASSWORD).await;

    let fragment = h.htmx_get("/client/tickets").await.text().await.unwrap();
    assert!(fragment.contains("Hubo un problema al cargar tus tickets."));
}

#[tokio::test]
async fn test_featured_ticket_and_lifecycle() {
    let h = Harness::start(BackendData {
        tickets: vec![
            ticket(1, "pendiente", "Batería hinchada"),
            ticket(2, "en reparación", "Pantalla rota"),
        ],
        ..BackendData::default()
    })
    .await;
    log_in(&h.browser, &h.frontdesk, CLIENT, PASSWORD).await;

    let fragment = h.htmx_get("/client/tickets").await.text().await.unwrap();
    assert!(fragment.contains("Ticket #1: Batería hinchada"));
    assert!(fragment.contains("Pantalla rota"));
    assert!(fragment.contains("01/03/2025"));
    assert!(fragment.contains("Activar notificaciones"));

    let fragment = h
        .htmx_get("/client/tickets?ticket=2")
        .await
        .text()
        .await
        .unwrap();
    assert!(fragment.contains("Ticket #2: Pantalla rota"));
}

#[tokio::test]
async fn test_enable_notifications_is_one_way() {
    let h = Harness::start(BackendData {
        tickets: vec![ticket(1, "pendiente", "Batería hinchada")],
        ..BackendData::default()
    })
    .await;
    log_in(&h.browser, &h.frontdesk, CLIENT, PASSWORD).await;

    let response = h
        .browser
        .post(h.url("/client/tickets/1/notifications"))
        .header("hx-request", "true")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fragment = response.text().await.unwrap();
    assert!(fragment.contains("Notificaciones activadas"));
    assert!(fragment.contains("disabled"));

    // A second click does not write again.
    h.browser
        .post(h.url("/client/tickets/1/notifications"))
        .header("hx-request", "true")
        .send()
        .await
        .unwrap();
    assert_eq!(h.backend.data().read().await.notify_calls, vec![1]);

    let fragment = h.htmx_get("/client/tickets").await.text().await.unwrap();
    assert!(fragment.contains("Notificaciones activadas"));
}

#[tokio::test]
async fn test_overlapping_notify_submissions_write_once() {
    let h = Harness::start(BackendData {
        tickets: vec![ticket(1, "pendiente", "Batería hinchada")],
        notify_delay: Some(Duration::from_millis(300)),
        ..BackendData::default()
    })
    .await;
    log_in(&h.browser, &h.frontdesk, CLIENT, PASSWORD).await;

    let submit = || {
        h.browser
            .post(h.url("/client/tickets/1/notifications"))
            .header("hx-request", "true")
            .send()
    };
    let (first, second) = tokio::join!(submit(), submit());
    assert_eq!(first.unwrap().status(), StatusCode::OK);
    assert_eq!(second.unwrap().status(), StatusCode::OK);

    assert_eq!(h.backend.data().read().await.notify_calls, vec![1]);
    let fragment = h.htmx_get("/client/tickets").await.text().await.unwrap();
    assert!(fragment.contains("Notificaciones activadas"));
}

#[tokio::test]
async fn test_ticket_with_null_fields_still_lists() {
    let mut sparse = ticket(2, "pendiente", "");
    sparse["descripcionProblema"] = serde_json::Value::Null;
    let h = Harness::start(BackendData {
        tickets: vec![ticket(1, "en reparación", "Pantalla rota"), sparse],
        ..BackendData::default()
    })
    .await;
    log_in(&h.browser, &h.frontdesk, CLIENT, PASSWORD).await;

    let fragment = h.htmx_get("/client/tickets").await.text().await.unwrap();
    assert!(fragment.contains("Pantalla rota"));
    assert!(!fragment.contains("Hubo un problema al cargar tus tickets."));
}

#[tokio::test]
async fn test_notify_failure_keeps_the_button_available() {
    let h = Harness::start(BackendData {
        tickets: vec![ticket(1, "pendiente", "Batería hinchada")],
        notify_status: Some(500),
        ..BackendData::default()
    })
    .await;
    log_in(&h.browser, &h.frontdesk, CLIENT, PASSWORD).await;

    let fragment = h
        .browser
        .post(h.url("/client/tickets/1/notifications"))
        .header("hx-request", "true")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(fragment.contains("Activar notificaciones"));
    assert!(fragment.contains("alert-error"));
}

#[tokio::test]
async fn test_rejected_token_signs_the_browser_out() {
    let h = Harness::start(BackendData::default()).await;
    log_in(&h.browser, &h.frontdesk, CLIENT, PASSWORD).await;
    h.backend.data().write().await.reject_tokens = true;

    let response = h.htmx_get("/client/tickets").await;
    assert_eq!(
        response.headers().get("hx-redirect").unwrap(),
        "/auth/login?error=session"
    );

    let response = h.get("/client").await;
    assert_eq!(location(&response), "/auth/login");
}

// ============================================================================
// Admin console
// ============================================================================

#[tokio::test]
async fn test_admin_console_regions() {
    let h = Harness::start(BackendData {
        tickets: vec![
            ticket(1, "pendiente", "Batería hinchada"),
            ticket(2, "listo", "Pantalla rota"),
        ],
        ..BackendData::default()
    })
    .await;
    log_in(&h.browser, &h.frontdesk, ADMIN, PASSWORD).await;

    let page = h.get("/admin").await;
    assert_eq!(page.status(), StatusCode::OK);
    let page = page.text().await.unwrap();
    assert!(page.contains("Hola, Marta Gómez"));
    assert!(page.contains("Batería hinchada"));
    assert!(page.contains("height: 50%"));
    assert!(page.contains("height: 100%"));
}

#[tokio::test]
async fn test_admin_ticket_changes() {
    let h = Harness::start(BackendData {
        tickets: vec![ticket(1, "pendiente", "Batería hinchada")],
        ..BackendData::default()
    })
    .await;
    log_in(&h.browser, &h.frontdesk, ADMIN, PASSWORD).await;

    let response = h
        .browser
        .post(h.url("/admin/tickets"))
        .form(&[
            ("client_email", "Nuevo@Taller.com"),
            ("description", "No carga"),
            ("priority", "alta"),
            ("price", "1500,50"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/admin?success=created");

    let response = h
        .browser
        .post(h.url("/admin/tickets"))
        .form(&[
            ("client_email", "nuevo@taller.com"),
            ("description", "No carga"),
            ("price", "caro"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/admin?error=price");

    let response = h
        .browser
        .post(h.url("/admin/tickets/1"))
        .form(&[("status", "en reparación"), ("solution", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/admin?success=updated");

    let response = h
        .browser
        .post(h.url("/admin/tickets/1/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/admin?success=deleted");

    let data = h.backend.data().read().await;
    assert_eq!(data.writes.len(), 2);
    assert_eq!(data.writes[0]["clienteEmail"], "nuevo@taller.com");
    assert_eq!(data.writes[0]["estado"], "pendiente");
    assert_eq!(data.writes[0]["precio"], 1500.5);
    assert_eq!(data.writes[1], json!({ "estado": "en reparación" }));
    assert_eq!(data.tickets.len(), 1);
}
