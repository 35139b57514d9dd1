//! Shared application state for the observer.

use std::sync::Arc;

use kommunity_store::{RecordStore, StoreError};

use crate::error::ObserverError;
use crate::pages::PageRenderer;

/// State shared by every handler.
///
/// The store is the only source of truth; nothing is cached between
/// requests, so pages always reflect what the actor loop last wrote.
#[derive(Debug)]
pub struct AppState {
    /// The topic store being observed.
    pub store: Arc<RecordStore>,
    /// Compiled HTML page templates.
    pub pages: PageRenderer,
}

impl AppState {
    /// Build state over `store` with the built-in page templates.
    pub fn new(store: Arc<RecordStore>) -> Result<Self, ObserverError> {
        Ok(Self {
            store,
            pages: PageRenderer::new()?,
        })
    }

    /// Run a store read on the blocking pool.
    pub async fn read<T, F>(&self, f: F) -> Result<Result<T, StoreError>, ObserverError>
    where
        T: Send + 'static,
        F: FnOnce(&RecordStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| ObserverError::Internal(format!("store task failed: {e}")))
    }
}
