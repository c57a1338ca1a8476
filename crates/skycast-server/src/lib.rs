//! Local HTTP API for the kiosk: settings persistence, OS probes, and
//! the live display status, served on localhost.

pub mod routes;
pub mod sysinfo;
pub mod window;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use skycast_state::AppState;

/// Serve the API on `127.0.0.1:{port}` until the token is cancelled.
pub async fn serve(
    state: Arc<AppState>,
    window_classes: Vec<String>,
    port: u16,
    shutdown: CancellationToken,
) {
    let routes = routes::routes(state, Arc::new(window_classes));
    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(
        ([127, 0, 0, 1], port),
        async move { shutdown.cancelled().await },
    );
    tracing::info!("Listening on http://{}", addr);
    server.await;
}
