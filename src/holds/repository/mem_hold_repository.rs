use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use lazy_static::lazy_static;

use crate::core::circulation::{CirculationError, CirculationResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::holds::domain::model::HoldEntity;
use crate::holds::repository::HoldRepository;
use crate::utils::mem::{matches_predicate, paginate};

lazy_static! {
    static ref TABLES: RwLock<HashMap<String, HashMap<String, HoldEntity>>> =
        RwLock::new(HashMap::new());
}

#[derive(Debug)]
pub(crate) struct MemHoldRepository {
    table_name: String,
}

impl MemHoldRepository {
    pub(crate) fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
        }
    }
}

fn lock_error<T>(err: T) -> CirculationError where T: std::fmt::Debug {
    CirculationError::storage(format!("hold table lock {:?}", err).as_str(), None, true)
}

#[async_trait]
impl Repository<HoldEntity> for MemHoldRepository {
    async fn create(&self, entity: &HoldEntity) -> CirculationResult<usize> {
        let mut tables = TABLES.write().map_err(lock_error)?;
        let rows = tables.entry(self.table_name.to_string()).or_default();
        if rows.contains_key(entity.hold_id.as_str()) {
            return Err(CirculationError::duplicate_key(
                format!("hold {} already exists", entity.hold_id).as_str()));
        }
        if rows.values().any(|row| row.patron_id == entity.patron_id
            && row.pool_id == entity.pool_id) {
            return Err(CirculationError::duplicate_key(
                format!("patron {} already has a hold for pool {}",
                        entity.patron_id, entity.pool_id).as_str()));
        }
        rows.insert(entity.hold_id.to_string(), entity.clone());
        Ok(1)
    }

    async fn update(&self, entity: &HoldEntity) -> CirculationResult<usize> {
        let mut tables = TABLES.write().map_err(lock_error)?;
        let rows = tables.entry(self.table_name.to_string()).or_default();
        let stored_version = rows.get(entity.hold_id.as_str()).map(|row| row.version);
        match stored_version {
            Some(version) if version != entity.version => {
                Err(CirculationError::storage(
                    format!("hold {} version conflict {} != {}",
                            entity.hold_id, version, entity.version).as_str(), None, true))
            }
            Some(_) => {
                let mut next = entity.clone();
                next.version += 1;
                rows.insert(entity.hold_id.to_string(), next);
                Ok(1)
            }
            None => {
                Err(CirculationError::not_found(
                    format!("hold {} not found", entity.hold_id).as_str()))
            }
        }
    }

    async fn get(&self, id: &str) -> CirculationResult<HoldEntity> {
        let tables = TABLES.read().map_err(lock_error)?;
        tables.get(self.table_name.as_str())
            .and_then(|rows| rows.get(id))
            .cloned()
            .ok_or_else(|| CirculationError::not_found(format!("hold {} not found", id).as_str()))
    }

    async fn delete(&self, id: &str) -> CirculationResult<usize> {
        let mut tables = TABLES.write().map_err(lock_error)?;
        let rows = tables.entry(self.table_name.to_string()).or_default();
        match rows.remove(id) {
            Some(_) => Ok(1),
            None => Err(CirculationError::not_found(format!("hold {} not found", id).as_str())),
        }
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> CirculationResult<PaginatedResult<HoldEntity>> {
        let tables = TABLES.read().map_err(lock_error)?;
        let mut records: Vec<HoldEntity> = Vec::new();
        if let Some(rows) = tables.get(self.table_name.as_str()) {
            for row in rows.values() {
                if matches_predicate(row, predicate)? {
                    records.push(row.clone());
                }
            }
        }
        records.sort_by(|first, second| first.created_at.cmp(&second.created_at)
            .then(first.hold_id.cmp(&second.hold_id)));
        paginate(records, page, page_size)
    }
}

#[async_trait]
impl HoldRepository for MemHoldRepository {
    async fn find_by_patron_pool(&self, patron_id: &str, pool_id: &str) -> CirculationResult<Option<HoldEntity>> {
        let tables = TABLES.read().map_err(lock_error)?;
        Ok(tables.get(self.table_name.as_str())
            .and_then(|rows| rows.values()
                .find(|row| row.patron_id == patron_id && row.pool_id == pool_id))
            .cloned())
    }

    async fn find_live_by_pool(&self, pool_id: &str, as_of: NaiveDateTime) -> CirculationResult<Vec<HoldEntity>> {
        let tables = TABLES.read().map_err(lock_error)?;
        let mut records: Vec<HoldEntity> = tables.get(self.table_name.as_str())
            .map(|rows| rows.values()
                .filter(|row| row.pool_id == pool_id && row.is_live(as_of))
                .cloned()
                .collect())
            .unwrap_or_default();
        records.sort_by(|first, second| first.start.cmp(&second.start)
            .then(first.hold_id.cmp(&second.hold_id)));
        Ok(records)
    }

    async fn query_expired_reservations(&self, as_of: NaiveDateTime) -> CirculationResult<Vec<HoldEntity>> {
        let tables = TABLES.read().map_err(lock_error)?;
        let mut records: Vec<HoldEntity> = tables.get(self.table_name.as_str())
            .map(|rows| rows.values()
                .filter(|row| row.is_expired_reservation(as_of))
                .cloned()
                .collect())
            .unwrap_or_default();
        records.sort_by(|first, second| first.start.cmp(&second.start)
            .then(first.hold_id.cmp(&second.hold_id)));
        Ok(records)
    }
}
