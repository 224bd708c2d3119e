use std::sync::Arc;

use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::holds::factory::create_hold_repository;
use crate::loans::factory::create_loan_repository;
use crate::pools::domain::PoolService;
use crate::pools::domain::service::PoolServiceImpl;
use crate::pools::repository::PoolRepository;
use crate::pools::repository::mem_pool_repository::MemPoolRepository;

pub(crate) async fn create_pool_repository(store: RepositoryStore) -> Arc<dyn PoolRepository> {
    match store {
        RepositoryStore::InMemory => {
            Arc::new(MemPoolRepository::new("pools"))
        }
    }
}

pub(crate) async fn create_pool_service(config: &Configuration, store: RepositoryStore) -> Box<dyn PoolService> {
    let pool_repository = create_pool_repository(store).await;
    let loan_repository = create_loan_repository(store).await;
    let hold_repository = create_hold_repository(store).await;
    Box::new(PoolServiceImpl::new(config, pool_repository, loan_repository, hold_repository))
}
