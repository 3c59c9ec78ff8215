//! HTTP surface.
//!
//! Serves the heatmap UI out of a directory, exposes the current point
//! table as JSON under `/api/points` and upgrades `/ws` to the live feed.

use axum::{
    Json, Router,
    extract::{State, WebSocketUpgrade},
    response::Response,
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

use crate::hub::{SharedHub, lock};
use crate::points::PointSnapshot;
use crate::transport::handle_socket;
use crate::utils::Error;

pub fn router(hub: SharedHub, static_dir: &str) -> Router {
    Router::new()
        .route("/api/points", get(get_points))
        .route("/ws", get(ws_upgrade))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(hub)
}

async fn get_points(State(hub): State<SharedHub>) -> Json<Vec<PointSnapshot>> {
    let snapshot = lock(&hub).snapshot();
    Json(snapshot)
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(hub): State<SharedHub>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

pub async fn start_http_server(
    addr: String,
    hub: SharedHub,
    static_dir: String,
) -> Result<(), Error> {
    let listener = TcpListener::bind(&addr).await?;
    info!("Server is running and listening on http://{addr} (serving {static_dir}, live feed at /ws)");
    serve_http(listener, hub, &static_dir).await
}

pub async fn serve_http(
    listener: TcpListener,
    hub: SharedHub,
    static_dir: &str,
) -> Result<(), Error> {
    axum::serve(listener, router(hub, static_dir)).await?;
    Ok(())
}
