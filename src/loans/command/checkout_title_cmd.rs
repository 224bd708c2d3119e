use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::loans::domain::{CheckoutOutcome, LoanService};

pub(crate) struct CheckoutTitleCommand {
    loan_service: Box<dyn LoanService>,
}

impl CheckoutTitleCommand {
    pub(crate) fn new(loan_service: Box<dyn LoanService>) -> Self {
        Self {
            loan_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckoutTitleCommandRequest {
    patron_id: String,
    pool_id: String,
}

impl CheckoutTitleCommandRequest {
    pub fn new(patron_id: &str, pool_id: &str) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            pool_id: pool_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutTitleCommandResponse {
    outcome: CheckoutOutcome,
}

impl CheckoutTitleCommandResponse {
    pub fn new(outcome: CheckoutOutcome) -> Self {
        Self {
            outcome,
        }
    }
}

#[async_trait]
impl Command<CheckoutTitleCommandRequest, CheckoutTitleCommandResponse> for CheckoutTitleCommand {
    async fn execute(&self, req: CheckoutTitleCommandRequest) -> Result<CheckoutTitleCommandResponse, CommandError> {
        self.loan_service.checkout_or_hold(req.patron_id.as_str(), req.pool_id.as_str())
            .await.map_err(CommandError::from).map(CheckoutTitleCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::loans::command::checkout_title_cmd::{CheckoutTitleCommand, CheckoutTitleCommandRequest};
    use crate::loans::factory::create_loan_service;
    use crate::pools::domain::model::LicensePoolEntity;
    use crate::pools::factory::create_pool_repository;

    lazy_static! {
        static ref CHECKOUT_CMD: AsyncOnce<CheckoutTitleCommand> = AsyncOnce::new(async {
                let svc = create_loan_service(&Configuration::new("test"), RepositoryStore::InMemory)
                    .await.expect("should build service");
                CheckoutTitleCommand::new(svc)
            });
    }

    #[tokio::test]
    async fn test_should_reject_checkout_for_missing_pool() {
        let cmd: &CheckoutTitleCommand = CHECKOUT_CMD.get().await.clone();
        let res = cmd.execute(CheckoutTitleCommandRequest::new("patron1", "missing-pool")).await;
        assert!(matches!(res, Err(CommandError::NotFound { message: _ })));
    }

    #[tokio::test]
    async fn test_should_reject_checkout_without_licenses() {
        // a pool with no licenses fails before any remote call
        let pool_repo = create_pool_repository(RepositoryStore::InMemory).await;
        let pool = LicensePoolEntity::new("collection1", "title1");
        pool_repo.create(&pool).await.expect("should create pool");

        let cmd: &CheckoutTitleCommand = CHECKOUT_CMD.get().await.clone();
        let res = cmd.execute(CheckoutTitleCommandRequest::new("patron1", pool.pool_id.as_str())).await;
        assert!(matches!(res, Err(CommandError::Conflict { message: _ })));
    }
}
