include!("../../lib.rs");
use std::net::SocketAddr;
use axum::{
    routing::post,
    Router,
};
use crate::core::controller::AppState;
use crate::core::repository::RepositoryStore;
use crate::holds::controller::{place_hold, query_holds, release_hold};
use crate::holds::factory::create_hold_reaper;
use crate::utils::trace::setup_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let state = AppState::new("default", RepositoryStore::InMemory);

    // the reaper sweeps lapsed reservations alongside the request handlers
    let reaper = create_hold_reaper(&state.config, state.store).await;
    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        reaper.run(cancel_rx).await;
    });

    let app = Router::new()
        .route("/holds", post(place_hold).get(query_holds))
        .route("/holds/release", post(release_hold))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8081));
    axum::Server::bind(&addr).serve(app.into_make_service()).await?;
    let _ = cancel_tx.send(true);
    Ok(())
}
