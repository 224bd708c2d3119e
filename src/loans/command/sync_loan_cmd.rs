use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::loans::domain::LoanService;
use crate::loans::dto::LoanDto;

// Runs the reconciliation triggered by the remote distributor's push
// notification for one local loan.
pub(crate) struct SyncLoanCommand {
    loan_service: Box<dyn LoanService>,
}

impl SyncLoanCommand {
    pub(crate) fn new(loan_service: Box<dyn LoanService>) -> Self {
        Self {
            loan_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SyncLoanCommandRequest {
    pub loan_id: String,
}

impl SyncLoanCommandRequest {
    pub fn new(loan_id: &str) -> Self {
        Self {
            loan_id: loan_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SyncLoanCommandResponse {
    // None once the remote side ended the loan and the local row is gone
    loan: Option<LoanDto>,
}

impl SyncLoanCommandResponse {
    pub fn new(loan: Option<LoanDto>) -> Self {
        Self {
            loan,
        }
    }
}

#[async_trait]
impl Command<SyncLoanCommandRequest, SyncLoanCommandResponse> for SyncLoanCommand {
    async fn execute(&self, req: SyncLoanCommandRequest) -> Result<SyncLoanCommandResponse, CommandError> {
        self.loan_service.sync_loan(req.loan_id.as_str())
            .await.map_err(CommandError::from).map(SyncLoanCommandResponse::new)
    }
}
