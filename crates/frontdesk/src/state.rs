//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::config::FrontdeskConfig;
use crate::services::notifications::PendingWrites;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the pooled backend client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: FrontdeskConfig,
    backend: BackendClient,
    pending_notifications: PendingWrites,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: FrontdeskConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                pending_notifications: PendingWrites::default(),
            }),
        })
    }

    /// Get a reference to the front desk configuration.
    #[must_use]
    pub fn config(&self) -> &FrontdeskConfig {
        &self.inner.config
    }

    /// Get a reference to the ticket backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Notification writes outstanding across all requests.
    #[must_use]
    pub fn pending_notifications(&self) -> &PendingWrites {
        &self.inner.pending_notifications
    }
}
