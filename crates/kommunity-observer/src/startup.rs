//! Running the observer next to the actor loop.
//!
//! [`spawn_observer`] binds eagerly, so a taken port fails startup instead
//! of surfacing later from a background task, then serves on its own Tokio
//! task.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, bind, serve};
use crate::state::AppState;

/// Bind the observer and serve it on a background task.
///
/// Returns the bound address (useful with port `0`) and the task handle.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the listener cannot be bound.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
    let listener = bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state).await {
            tracing::error!(error = %e, "observer exited with error");
        }
    });

    tracing::info!(%addr, "observer spawned on background task");
    Ok((addr, handle))
}
