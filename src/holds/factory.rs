use std::sync::Arc;

use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::gateway::factory::create_publisher;
use crate::holds::domain::HoldService;
use crate::holds::domain::reaper::HoldReaper;
use crate::holds::domain::service::HoldServiceImpl;
use crate::holds::repository::HoldRepository;
use crate::holds::repository::mem_hold_repository::MemHoldRepository;
use crate::pools::factory::create_pool_service;

pub(crate) async fn create_hold_repository(store: RepositoryStore) -> Arc<dyn HoldRepository> {
    match store {
        RepositoryStore::InMemory => {
            Arc::new(MemHoldRepository::new("holds"))
        }
    }
}

pub(crate) async fn create_hold_service(config: &Configuration, store: RepositoryStore) -> Box<dyn HoldService> {
    let hold_repository = create_hold_repository(store).await;
    let pool_service = create_pool_service(config, store).await;
    let publisher = create_publisher(store.gateway_publisher()).await;
    Box::new(HoldServiceImpl::new(config, hold_repository, pool_service, publisher))
}

pub(crate) async fn create_hold_reaper(config: &Configuration, store: RepositoryStore) -> HoldReaper {
    let hold_repository = create_hold_repository(store).await;
    let pool_service = create_pool_service(config, store).await;
    let publisher = create_publisher(store.gateway_publisher()).await;
    HoldReaper::new(hold_repository, pool_service, publisher, config.reaper_interval_secs)
}
