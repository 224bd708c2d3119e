use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde_json::Value;

use crate::core::command::Command;
use crate::core::controller::{json_to_server_error, AppState, ServerError};
use crate::holds::command::place_hold_cmd::{PlaceHoldCommand, PlaceHoldCommandRequest, PlaceHoldCommandResponse};
use crate::holds::command::query_holds_cmd::{QueryHoldsCommand, QueryHoldsCommandRequest, QueryHoldsCommandResponse};
use crate::holds::command::release_hold_cmd::{ReleaseHoldCommand, ReleaseHoldCommandRequest, ReleaseHoldCommandResponse};
use crate::holds::domain::HoldService;
use crate::holds::factory;

async fn build_service(state: &AppState) -> Box<dyn HoldService> {
    factory::create_hold_service(&state.config, state.store).await
}

pub(crate) async fn place_hold(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<PlaceHoldCommandResponse>, ServerError> {
    let req: PlaceHoldCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state).await;
    let res = PlaceHoldCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn release_hold(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<ReleaseHoldCommandResponse>, ServerError> {
    let req: ReleaseHoldCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state).await;
    let res = ReleaseHoldCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn query_holds(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>) -> Result<Json<QueryHoldsCommandResponse>, ServerError> {
    let mut predicate = params;
    let page = predicate.remove("page");
    let page_size = predicate.remove("page_size").and_then(|size| size.parse::<usize>().ok());
    let req = QueryHoldsCommandRequest {
        predicate,
        page,
        page_size,
    };
    let svc = build_service(&state).await;
    let res = QueryHoldsCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}
