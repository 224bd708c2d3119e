use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::Value;

use crate::core::command::{Command, CommandError};
use crate::core::controller::{json_to_server_error, AppState, ServerError};
use crate::loans::command::checkout_title_cmd::{CheckoutTitleCommand, CheckoutTitleCommandRequest, CheckoutTitleCommandResponse};
use crate::loans::command::query_loans_cmd::{QueryLoansCommand, QueryLoansCommandRequest, QueryLoansCommandResponse};
use crate::loans::command::return_title_cmd::{ReturnTitleCommand, ReturnTitleCommandRequest, ReturnTitleCommandResponse};
use crate::loans::command::sync_loan_cmd::{SyncLoanCommand, SyncLoanCommandRequest, SyncLoanCommandResponse};
use crate::loans::domain::LoanService;
use crate::loans::factory;

async fn build_service(state: &AppState) -> Result<Box<dyn LoanService>, ServerError> {
    factory::create_loan_service(&state.config, state.store).await
        .map_err(|err| ServerError::from(CommandError::from(err)))
}

pub(crate) async fn checkout_title(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<CheckoutTitleCommandResponse>, ServerError> {
    let req: CheckoutTitleCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state).await?;
    let res = CheckoutTitleCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn return_title(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<ReturnTitleCommandResponse>, ServerError> {
    let req: ReturnTitleCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state).await?;
    let res = ReturnTitleCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

// notification callback hit by the remote distributor when a loan changes
// out of band
pub(crate) async fn notify_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<String>) -> Result<Json<SyncLoanCommandResponse>, ServerError> {
    let req = SyncLoanCommandRequest::new(loan_id.as_str());
    let svc = build_service(&state).await?;
    let res = SyncLoanCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn query_loans(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>) -> Result<Json<QueryLoansCommandResponse>, ServerError> {
    let mut predicate = params;
    let page = predicate.remove("page");
    let page_size = predicate.remove("page_size").and_then(|size| size.parse::<usize>().ok());
    let req = QueryLoansCommandRequest {
        predicate,
        page,
        page_size,
    };
    let svc = build_service(&state).await?;
    let res = QueryLoansCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}
