use async_trait::async_trait;
use std::collections::HashMap;
use crate::core::circulation::{CirculationResult, PaginatedResult};
use crate::holds::dto::HoldDto;

pub mod model;
pub mod reaper;
pub mod service;

#[async_trait]
pub(crate) trait HoldService: Sync + Send {
    async fn place_hold(&self, patron_id: &str, pool_id: &str) -> CirculationResult<HoldDto>;
    async fn release_hold(&self, patron_id: &str, pool_id: &str) -> CirculationResult<HoldDto>;
    async fn query_holds(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> CirculationResult<PaginatedResult<HoldDto>>;
}
