use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::holds::domain::HoldService;
use crate::holds::dto::HoldDto;

pub(crate) struct ReleaseHoldCommand {
    hold_service: Box<dyn HoldService>,
}

impl ReleaseHoldCommand {
    pub(crate) fn new(hold_service: Box<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReleaseHoldCommandRequest {
    patron_id: String,
    pool_id: String,
}

impl ReleaseHoldCommandRequest {
    pub fn new(patron_id: &str, pool_id: &str) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            pool_id: pool_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReleaseHoldCommandResponse {
    hold: HoldDto,
}

impl ReleaseHoldCommandResponse {
    pub fn new(hold: HoldDto) -> Self {
        Self {
            hold,
        }
    }
}

#[async_trait]
impl Command<ReleaseHoldCommandRequest, ReleaseHoldCommandResponse> for ReleaseHoldCommand {
    async fn execute(&self, req: ReleaseHoldCommandRequest) -> Result<ReleaseHoldCommandResponse, CommandError> {
        self.hold_service.release_hold(req.patron_id.as_str(), req.pool_id.as_str())
            .await.map_err(CommandError::from).map(ReleaseHoldCommandResponse::new)
    }
}
