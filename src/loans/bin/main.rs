include!("../../lib.rs");
use std::net::SocketAddr;
use axum::{
    routing::{get, post},
    Router,
};
use crate::core::controller::AppState;
use crate::core::repository::RepositoryStore;
use crate::loans::controller::{checkout_title, notify_loan, query_loans, return_title};
use crate::utils::trace::setup_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let state = AppState::new("default", RepositoryStore::InMemory);

    let app = Router::new()
        .route("/loans/checkout", post(checkout_title))
        .route("/loans/return", post(return_title))
        .route("/loans/:loan_id/notify", post(notify_loan))
        .route("/loans", get(query_loans))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    axum::Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
