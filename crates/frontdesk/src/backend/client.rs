//! Ticket backend REST client.
//!
//! Every authenticated call sends the session token as a bearer token. A 401
//! from any of them becomes [`BackendError::Unauthorized`]; everything else
//! that is not a 2xx becomes [`BackendError::Status`].

use std::future::Future;

use repairdesk_core::{
    Email, MonthlyCount, NewTicket, Ticket, TicketId, TicketStats, TicketUpdate,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::BackendError;
use super::types::{NewAccount, UserProfile};
use crate::config::BackendConfig;

/// Read access to a client's tickets and the notify write.
///
/// The client dashboard only needs these two calls; services are written
/// against this trait so they can run against an in-memory source in tests.
pub trait TicketSource: Send + Sync {
    /// Tickets owned by `email`, in the backend's order.
    fn tickets_for(
        &self,
        token: &SecretString,
        email: &Email,
    ) -> impl Future<Output = Result<Vec<Ticket>, BackendError>> + Send;

    /// Turn on status-change emails for a ticket.
    fn enable_notifications(
        &self,
        token: &SecretString,
        id: TicketId,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Client for the ticket backend REST API.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// HTTP client with the request timeout applied.
    client: Client,
    /// Base URL, always ending in `/`.
    base_url: Url,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchange an email and password for a session token.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for any non-success status, or a
    /// transport error if the backend cannot be reached.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<SecretString, BackendError> {
        #[derive(serde::Serialize)]
        struct LoginRequest<'a> {
            email: &'a str,
            password: &'a str,
        }

        let request = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };

        let response = self
            .client
            .post(self.endpoint(&["users", "login"])?)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Login rejected by backend");
            return Err(BackendError::InvalidCredentials);
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;
        let token = body.trim().trim_matches('"');
        if token.is_empty() {
            return Err(BackendError::Decode("empty token".to_string()));
        }

        debug!("Login accepted");
        Ok(SecretString::from(token.to_string()))
    }

    /// Create a client account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses it.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn signup(&self, account: &NewAccount) -> Result<(), BackendError> {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SignupRequest<'a> {
            first_name: &'a str,
            last_name: &'a str,
            email: &'a str,
            password: &'a str,
        }

        let request = SignupRequest {
            first_name: account.first_name.trim(),
            last_name: account.last_name.trim(),
            email: account.email.as_str(),
            password: account.password.expose_secret(),
        };

        let response = self
            .client
            .post(self.endpoint(&["users"])?)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;

        check(response).await?;
        debug!("Account created");
        Ok(())
    }

    /// Fetch the profile of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a profile.
    #[instrument(skip(self, token), fields(email = %email))]
    pub async fn profile(
        &self,
        token: &SecretString,
        email: &Email,
    ) -> Result<UserProfile, BackendError> {
        let url = self.endpoint(&["users", "email", email.as_str()])?;
        self.get_json(self.client.get(url), token).await
    }

    /// Fetch the tickets owned by `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a ticket list.
    #[instrument(skip(self, token), fields(email = %email))]
    pub async fn tickets_for(
        &self,
        token: &SecretString,
        email: &Email,
    ) -> Result<Vec<Ticket>, BackendError> {
        let url = self.endpoint(&["tickets", "cliente", email.as_str()])?;
        let tickets: Vec<Ticket> = self.get_json(self.client.get(url), token).await?;
        debug!(count = tickets.len(), "Fetched client tickets");
        Ok(tickets)
    }

    /// Fetch every ticket in the shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a ticket list.
    #[instrument(skip(self, token))]
    pub async fn all_tickets(&self, token: &SecretString) -> Result<Vec<Ticket>, BackendError> {
        let url = self.endpoint(&["tickets"])?;
        let tickets: Vec<Ticket> = self.get_json(self.client.get(url), token).await?;
        debug!(count = tickets.len(), "Fetched all tickets");
        Ok(tickets)
    }

    /// Fetch the shop-wide ticket counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a stats object.
    #[instrument(skip(self, token))]
    pub async fn stats(&self, token: &SecretString) -> Result<TicketStats, BackendError> {
        let url = self.endpoint(&["tickets", "estadisticas"])?;
        self.get_json(self.client.get(url), token).await
    }

    /// Fetch tickets created per month over the last year.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a month list.
    #[instrument(skip(self, token))]
    pub async fn monthly_counts(
        &self,
        token: &SecretString,
    ) -> Result<Vec<MonthlyCount>, BackendError> {
        let url = self.endpoint(&["tickets", "por-mes"])?;
        self.get_json(self.client.get(url), token).await
    }

    /// Create a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses it.
    #[instrument(skip(self, token, ticket), fields(client = %ticket.client_email))]
    pub async fn create_ticket(
        &self,
        token: &SecretString,
        ticket: &NewTicket,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&["tickets"])?;
        self.send(self.client.post(url).json(ticket), token).await?;
        debug!("Ticket created");
        Ok(())
    }

    /// Apply a partial update to a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses it.
    #[instrument(skip(self, token, update), fields(ticket_id = %id))]
    pub async fn update_ticket(
        &self,
        token: &SecretString,
        id: TicketId,
        update: &TicketUpdate,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&["tickets", &id.to_string()])?;
        self.send(self.client.put(url).json(update), token).await?;
        debug!("Ticket updated");
        Ok(())
    }

    /// Delete a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses it.
    #[instrument(skip(self, token), fields(ticket_id = %id))]
    pub async fn delete_ticket(&self, token: &SecretString, id: TicketId) -> Result<(), BackendError> {
        let url = self.endpoint(&["tickets", &id.to_string()])?;
        self.send(self.client.delete(url), token).await?;
        debug!("Ticket deleted");
        Ok(())
    }

    /// Turn on status-change emails for a ticket.
    ///
    /// Only 200 and 204 count as success.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers anything
    /// other than 200 or 204.
    #[instrument(skip(self, token), fields(ticket_id = %id))]
    pub async fn enable_notifications(
        &self,
        token: &SecretString,
        id: TicketId,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&["tickets", &id.to_string(), "notificacion"])?;
        let response = self.send(self.client.put(url), token).await?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                debug!("Notifications enabled");
                Ok(())
            }
            other => Err(BackendError::status(other.as_u16(), "")),
        }
    }

    /// Resolve a path under the base URL, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::Transport("backend URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send an authenticated request and check its status.
    async fn send(
        &self,
        request: RequestBuilder,
        token: &SecretString,
    ) -> Result<Response, BackendError> {
        let response = request
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| BackendError::from_transport(&e))?;
        check(response).await
    }

    /// Send an authenticated request and decode its JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: &SecretString,
    ) -> Result<T, BackendError> {
        self.send(request, token)
            .await?
            .json::<T>()
            .await
            .map_err(|e| BackendError::from_decode(&e))
    }
}

impl TicketSource for BackendClient {
    async fn tickets_for(
        &self,
        token: &SecretString,
        email: &Email,
    ) -> Result<Vec<Ticket>, BackendError> {
        Self::tickets_for(self, token, email).await
    }

    async fn enable_notifications(
        &self,
        token: &SecretString,
        id: TicketId,
    ) -> Result<(), BackendError> {
        Self::enable_notifications(self, token, id).await
    }
}

/// Map 401 and other non-success statuses to errors.
async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        warn!("Backend rejected session token");
        return Err(BackendError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "Backend returned error status");
        return Err(BackendError::status(status.as_u16(), &body));
    }
    Ok(response)
}
