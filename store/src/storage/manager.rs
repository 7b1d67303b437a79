//! Lifecycle tracking for the active backend.
//!
//! Construct one [`ConnectionManager`] at the composition root and pass it
//! where needed; there is no global instance. The manager owns one active
//! [`Store`] view per backend at a time.

use std::sync::Mutex;
use tracing::{info, warn};

use super::jsonfile::JsonStoreConfig;
use super::postgres::RelationalConfig;
use super::sqlite::DocumentConfig;
use crate::error::StoreResult;
use crate::registry::Store;

/// Which backend to wire the registry to.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Always available; optionally seeded with the demo fixtures.
    Memory { seeded: bool },
    JsonFile(JsonStoreConfig),
    Document(DocumentConfig),
    Relational(RelationalConfig),
}

impl BackendConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Memory { .. } => "memory",
            BackendConfig::JsonFile(_) => "jsonfile",
            BackendConfig::Document(_) => "document",
            BackendConfig::Relational(_) => "relational",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

#[derive(Default)]
struct Inner {
    state: ConnectionState,
    config: Option<BackendConfig>,
    last_error: Option<String>,
    active: Option<Store>,
}

/// Tracks the connect/disconnect lifecycle of the active backend:
/// `Disconnected -> Connecting -> Connected`, or `Connecting -> Error` when
/// initialization fails.
pub struct ConnectionManager {
    inner: Mutex<Inner>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Initialize the backend named by `config`. On success the manager
    /// holds the active store (also returned); on failure the cause is kept
    /// for [`last_error`](Self::last_error).
    pub async fn connect(&self, config: BackendConfig) -> StoreResult<Store> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.state = ConnectionState::Connecting;
            inner.last_error = None;
        }
        info!(backend = config.kind(), "connecting");

        let result = Store::open(&config).await;

        let mut inner = self.inner.lock().unwrap();
        match result {
            Ok(store) => {
                inner.state = ConnectionState::Connected;
                inner.config = Some(config);
                inner.active = Some(store.clone());
                Ok(store)
            }
            Err(error) => {
                warn!(backend = config.kind(), error = %error, "connect failed");
                inner.state = ConnectionState::Error;
                inner.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Release the active backend. Meaningful only when connected; a no-op
    /// success from any other state.
    pub async fn disconnect(&self) {
        let store = {
            let mut inner = self.inner.lock().unwrap();
            if inner.state != ConnectionState::Connected {
                return;
            }
            inner.state = ConnectionState::Disconnected;
            inner.active.take()
        };
        if let Some(store) = store {
            store.close().await;
        }
        info!("disconnected");
    }

    /// Force the state machine back to disconnected and drop the stored
    /// config, error, and store handle, without guaranteeing that backend
    /// resources were released. Test and recovery scenarios only.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = Inner::default();
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().unwrap().state
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().unwrap().last_error.clone()
    }

    pub fn config(&self) -> Option<BackendConfig> {
        self.inner.lock().unwrap().config.clone()
    }

    /// The store handle from the last successful connect, if still held.
    pub fn active(&self) -> Option<Store> {
        self.inner.lock().unwrap().active.clone()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
