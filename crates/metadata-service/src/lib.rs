//! The API service and its two gateways (components D and E, spec §4.4,
//! §4.5): one [`api::MetadataApi`] implementation served identically as
//! JSON over HTTP (`axum`) and as binary RPC (`tonic`/`prost`).

pub mod api;
pub mod error;
pub mod routes;
pub mod rpc;
pub mod state;

pub use api::MetadataApi;
pub use error::ServiceError;
pub use state::ApiState;

use std::net::SocketAddr;

use tokio::sync::watch;
use tonic::transport::Server as TonicServer;
use tracing::info;

use rpc::proto::metadata_service_server::MetadataServiceServer;
use rpc::MetadataRpc;

/// Serves the HTTP gateway and the RPC gateway concurrently until
/// `shutdown` reports `true` (spec §5 "Cancellation / timeouts": a single
/// shutdown signal propagates to the RPC server, the HTTP server, and
/// every watcher).
pub async fn serve(
    state: ApiState,
    http_addr: SocketAddr,
    rpc_addr: SocketAddr,
    shutdown: watch::Receiver<bool>,
) -> Result<(), ServiceError> {
    let http_shutdown = shutdown.clone();
    let http_router = routes::router().with_state(state.clone());
    let http_listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .map_err(|err| ServiceError::Internal {
            message: format!("failed to bind HTTP listener on {http_addr}: {err}"),
        })?;
    info!(%http_addr, "HTTP gateway listening");

    let rpc_service = MetadataServiceServer::new(MetadataRpc::new(state));
    info!(%rpc_addr, "RPC gateway listening");

    let http_task = async move {
        axum::serve(http_listener, http_router)
            .with_graceful_shutdown(wait_for_shutdown(http_shutdown))
            .await
            .map_err(|err| ServiceError::Internal {
                message: format!("HTTP server error: {err}"),
            })
    };

    let rpc_task = async move {
        TonicServer::builder()
            .add_service(rpc_service)
            .serve_with_shutdown(rpc_addr, wait_for_shutdown(shutdown.clone()))
            .await
            .map_err(|err| ServiceError::Internal {
                message: format!("RPC server error: {err}"),
            })
    };

    let (http_result, rpc_result) = tokio::join!(http_task, rpc_task);
    http_result?;
    rpc_result?;
    Ok(())
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
