use async_trait::async_trait;
use core::option::Option;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::core::circulation::{CirculationResult, PaginatedResult};
use crate::gateway::GatewayPublisherVia;

#[async_trait]
pub trait Repository<Entity>: Sync + Send {
    // create an entity
    async fn create(&self, entity: &Entity) -> CirculationResult<usize>;

    // updates an entity
    async fn update(&self, entity: &Entity) -> CirculationResult<usize>;

    // get an entity
    async fn get(&self, id: &str) -> CirculationResult<Entity>;

    // delete an entity
    async fn delete(&self, id: &str) -> CirculationResult<usize>;

    // find by matching properties
    async fn query(&self, predicate: &HashMap::<String, String>,
                   page: Option<&str>, page_size: usize) -> CirculationResult<PaginatedResult<Entity>>;
}

// Storage backing the repositories. Loans, holds and licenses are arena rows
// addressed by id, the catalog importer that feeds pools lives outside this core.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub(crate) enum RepositoryStore {
    InMemory,
}

impl RepositoryStore {
    pub fn gateway_publisher(&self) -> GatewayPublisherVia {
        match self {
            RepositoryStore::InMemory => { GatewayPublisherVia::Logs }
        }
    }
}
