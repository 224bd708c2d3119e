use std::sync::Arc;

use crate::core::circulation::CirculationResult;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::gateway::factory::create_publisher;
use crate::gateway::lsd::client::{HttpStatusClient, StatusClient};
use crate::holds::factory::{create_hold_repository, create_hold_service};
use crate::loans::domain::LoanService;
use crate::loans::domain::service::LoanServiceImpl;
use crate::loans::repository::LoanRepository;
use crate::loans::repository::mem_loan_repository::MemLoanRepository;
use crate::pools::factory::create_pool_service;

pub(crate) async fn create_loan_repository(store: RepositoryStore) -> Arc<dyn LoanRepository> {
    match store {
        RepositoryStore::InMemory => {
            Arc::new(MemLoanRepository::new("loans"))
        }
    }
}

pub(crate) fn create_status_client(config: &Configuration) -> CirculationResult<Box<dyn StatusClient>> {
    Ok(Box::new(HttpStatusClient::new(config)?))
}

pub(crate) async fn create_loan_service(config: &Configuration, store: RepositoryStore) -> CirculationResult<Box<dyn LoanService>> {
    let loan_repository = create_loan_repository(store).await;
    let hold_repository = create_hold_repository(store).await;
    let pool_service = create_pool_service(config, store).await;
    let hold_service = create_hold_service(config, store).await;
    let status_client = create_status_client(config)?;
    let publisher = create_publisher(store.gateway_publisher()).await;
    Ok(Box::new(LoanServiceImpl::new(config, loan_repository, hold_repository,
                                     pool_service, hold_service, status_client, publisher)))
}
