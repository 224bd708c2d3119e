use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::holds::domain::HoldService;
use crate::holds::dto::HoldDto;

pub(crate) struct PlaceHoldCommand {
    hold_service: Box<dyn HoldService>,
}

impl PlaceHoldCommand {
    pub(crate) fn new(hold_service: Box<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaceHoldCommandRequest {
    patron_id: String,
    pool_id: String,
}

impl PlaceHoldCommandRequest {
    pub fn new(patron_id: &str, pool_id: &str) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            pool_id: pool_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PlaceHoldCommandResponse {
    pub(crate) hold: HoldDto,
}

impl PlaceHoldCommandResponse {
    pub fn new(hold: HoldDto) -> Self {
        Self {
            hold,
        }
    }
}

#[async_trait]
impl Command<PlaceHoldCommandRequest, PlaceHoldCommandResponse> for PlaceHoldCommand {
    async fn execute(&self, req: PlaceHoldCommandRequest) -> Result<PlaceHoldCommandResponse, CommandError> {
        self.hold_service.place_hold(req.patron_id.as_str(), req.pool_id.as_str())
            .await.map_err(CommandError::from).map(PlaceHoldCommandResponse::new)
    }
}
