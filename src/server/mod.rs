pub mod routes;

pub use routes::{parse_filter, routes, AppState};

use std::net::SocketAddr;

pub async fn serve(state: AppState, port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("✅ Query server listening on {}", addr);
    warp::serve(routes(state)).run(addr).await;
}
