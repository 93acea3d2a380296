//! Read Endpoint
//!
//! Serves the latest snapshot. Handlers never trigger a refresh and never
//! report check errors as HTTP errors; the worst case is an empty list.

pub mod error;
pub mod router;

pub use error::{ServerError, ServerResult};
pub use router::{router, DeploysEnvelope};

use crate::core::shutdown::ShutdownCoordinator;
use crate::refresh::SnapshotCache;
use std::net::SocketAddr;
use std::sync::Arc;

pub const DEFAULT_PORT: u16 = 5000;

/// Bind `addr` and serve until `shutdown` fires
pub async fn serve(
    addr: SocketAddr,
    cache: Arc<SnapshotCache>,
    shutdown: ShutdownCoordinator,
) -> ServerResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    serve_listener(listener, cache, shutdown).await
}

/// Serve on an already-bound listener (tests bind `127.0.0.1:0`)
pub async fn serve_listener(
    listener: tokio::net::TcpListener,
    cache: Arc<SnapshotCache>,
    shutdown: ShutdownCoordinator,
) -> ServerResult<()> {
    if let Ok(local) = listener.local_addr() {
        log::info!("Starting up server on {}", local);
    }

    axum::serve(listener, router(cache))
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
        .map_err(|source| ServerError::Serve { source })?;

    log::info!("Server stopped");
    Ok(())
}
