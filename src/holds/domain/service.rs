use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::circulation::{CirculationError, CirculationResult, PaginatedResult};
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::repository::Repository;
use crate::gateway::events::EventPublisher;
use crate::holds::domain::HoldService;
use crate::holds::domain::model::HoldEntity;
use crate::holds::dto::HoldDto;
use crate::holds::repository::HoldRepository;
use crate::pools::domain::PoolService;

pub(crate) struct HoldServiceImpl {
    hold_repository: Arc<dyn HoldRepository>,
    pool_service: Box<dyn PoolService>,
    events_publisher: Box<dyn EventPublisher>,
}

impl HoldServiceImpl {
    pub(crate) fn new(_config: &Configuration, hold_repository: Arc<dyn HoldRepository>,
                      pool_service: Box<dyn PoolService>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            hold_repository,
            pool_service,
            events_publisher,
        }
    }
}

#[async_trait]
impl HoldService for HoldServiceImpl {
    async fn place_hold(&self, patron_id: &str, pool_id: &str) -> CirculationResult<HoldDto> {
        if self.hold_repository.find_by_patron_pool(patron_id, pool_id).await?.is_some() {
            return Err(CirculationError::already_on_hold(
                format!("patron {} already holds pool {}", patron_id, pool_id).as_str()));
        }
        let pool = self.pool_service.recompute(pool_id).await?;
        if pool.licenses_available > 0 {
            return Err(CirculationError::currently_available(
                format!("pool {} has available copies, check out instead", pool_id).as_str()));
        }
        let hold = HoldEntity::new(pool_id, patron_id, pool.patrons_in_hold_queue + 1);
        self.hold_repository.create(&hold).await.map_err(|err| match err {
            CirculationError::DuplicateKey { message } => {
                CirculationError::already_on_hold(message.as_str())
            }
            err => err,
        })?;
        // assigns the real position and end estimate
        self.pool_service.recompute(pool_id).await?;
        let hold = self.hold_repository.get(hold.hold_id.as_str()).await?;
        let hold = HoldDto::from(&hold);
        let _ = self.events_publisher.publish(&DomainEvent::added(
            "hold_placed", "hold", hold.hold_id.as_str(), &HashMap::new(), &hold.clone())?).await?;
        Ok(hold)
    }

    async fn release_hold(&self, patron_id: &str, pool_id: &str) -> CirculationResult<HoldDto> {
        let hold = match self.hold_repository.find_by_patron_pool(patron_id, pool_id).await? {
            Some(hold) => hold,
            None => {
                return Err(CirculationError::not_on_hold(
                    format!("patron {} has no hold for pool {}", patron_id, pool_id).as_str()));
            }
        };
        self.hold_repository.delete(hold.hold_id.as_str()).await?;
        // may promote the next hold in line to a reserved copy
        self.pool_service.recompute(pool_id).await?;
        let hold = HoldDto::from(&hold);
        let _ = self.events_publisher.publish(&DomainEvent::deleted(
            "hold_released", "hold", hold.hold_id.as_str(), &HashMap::new(), &hold.clone())?).await?;
        Ok(hold)
    }

    async fn query_holds(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> CirculationResult<PaginatedResult<HoldDto>> {
        let res = self.hold_repository.query(predicate, page, page_size).await?;
        let records = res.records.iter().map(HoldDto::from).collect();
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }
}

impl From<&HoldEntity> for HoldDto {
    fn from(other: &HoldEntity) -> HoldDto {
        HoldDto {
            hold_id: other.hold_id.to_string(),
            version: other.version,
            pool_id: other.pool_id.to_string(),
            patron_id: other.patron_id.to_string(),
            position: other.position,
            start: other.start,
            end: other.end,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&HoldDto> for HoldEntity {
    fn from(other: &HoldDto) -> HoldEntity {
        HoldEntity {
            hold_id: other.hold_id.to_string(),
            version: other.version,
            pool_id: other.pool_id.to_string(),
            patron_id: other.patron_id.to_string(),
            position: other.position,
            start: other.start,
            end: other.end,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
