use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::loans::domain::LoanService;
use crate::loans::dto::LoanDto;

pub(crate) struct ReturnTitleCommand {
    loan_service: Box<dyn LoanService>,
}

impl ReturnTitleCommand {
    pub(crate) fn new(loan_service: Box<dyn LoanService>) -> Self {
        Self {
            loan_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnTitleCommandRequest {
    patron_id: String,
    pool_id: String,
}

impl ReturnTitleCommandRequest {
    pub fn new(patron_id: &str, pool_id: &str) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            pool_id: pool_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReturnTitleCommandResponse {
    loan: LoanDto,
}

impl ReturnTitleCommandResponse {
    pub fn new(loan: LoanDto) -> Self {
        Self {
            loan,
        }
    }
}

#[async_trait]
impl Command<ReturnTitleCommandRequest, ReturnTitleCommandResponse> for ReturnTitleCommand {
    async fn execute(&self, req: ReturnTitleCommandRequest) -> Result<ReturnTitleCommandResponse, CommandError> {
        self.loan_service.checkin(req.patron_id.as_str(), req.pool_id.as_str())
            .await.map_err(CommandError::from).map(ReturnTitleCommandResponse::new)
    }
}
