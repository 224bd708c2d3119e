use async_trait::async_trait;
use std::collections::HashMap;
use serde::Serialize;
use crate::core::circulation::{CirculationResult, PaginatedResult};
use crate::holds::dto::HoldDto;
use crate::loans::dto::LoanDto;

pub mod model;
pub mod service;

// Explicit outcome of the borrow flow. Callers switch on the variant instead
// of catching a "no copies" failure to decide whether to queue.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub(crate) enum CheckoutOutcome {
    Granted { loan: LoanDto },
    Queued { hold: HoldDto },
}

#[async_trait]
pub(crate) trait LoanService: Sync + Send {
    async fn checkout(&self, patron_id: &str, pool_id: &str) -> CirculationResult<LoanDto>;

    // checkout, falling back to a hold when every copy is taken
    async fn checkout_or_hold(&self, patron_id: &str, pool_id: &str) -> CirculationResult<CheckoutOutcome>;

    async fn checkin(&self, patron_id: &str, pool_id: &str) -> CirculationResult<LoanDto>;

    // reconciliation entry point, driven by the remote's notification
    // callback or a periodic sync. None means the loan is over and gone.
    async fn sync_loan(&self, loan_id: &str) -> CirculationResult<Option<LoanDto>>;

    async fn query_loans(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> CirculationResult<PaginatedResult<LoanDto>>;
}
