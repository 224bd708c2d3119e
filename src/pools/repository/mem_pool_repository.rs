use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use lazy_static::lazy_static;

use crate::core::circulation::{CirculationError, CirculationResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::pools::domain::model::LicensePoolEntity;
use crate::pools::repository::PoolRepository;
use crate::utils::mem::{matches_predicate, paginate};

lazy_static! {
    // named tables so separate factories attach to the same arena, the way
    // repositories elsewhere attach to a shared database
    static ref TABLES: RwLock<HashMap<String, HashMap<String, LicensePoolEntity>>> =
        RwLock::new(HashMap::new());
}

#[derive(Debug)]
pub(crate) struct MemPoolRepository {
    table_name: String,
}

impl MemPoolRepository {
    pub(crate) fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
        }
    }
}

fn lock_error<T>(err: T) -> CirculationError where T: std::fmt::Debug {
    CirculationError::storage(format!("pool table lock {:?}", err).as_str(), None, true)
}

#[async_trait]
impl Repository<LicensePoolEntity> for MemPoolRepository {
    async fn create(&self, entity: &LicensePoolEntity) -> CirculationResult<usize> {
        let mut tables = TABLES.write().map_err(lock_error)?;
        let rows = tables.entry(self.table_name.to_string()).or_default();
        if rows.contains_key(entity.pool_id.as_str()) {
            return Err(CirculationError::duplicate_key(
                format!("pool {} already exists", entity.pool_id).as_str()));
        }
        rows.insert(entity.pool_id.to_string(), entity.clone());
        Ok(1)
    }

    async fn update(&self, entity: &LicensePoolEntity) -> CirculationResult<usize> {
        let mut tables = TABLES.write().map_err(lock_error)?;
        let rows = tables.entry(self.table_name.to_string()).or_default();
        let stored_version = rows.get(entity.pool_id.as_str()).map(|row| row.version);
        match stored_version {
            Some(version) if version != entity.version => {
                Err(CirculationError::storage(
                    format!("pool {} version conflict {} != {}",
                            entity.pool_id, version, entity.version).as_str(), None, true))
            }
            Some(_) => {
                let mut next = entity.clone();
                next.version += 1;
                rows.insert(entity.pool_id.to_string(), next);
                Ok(1)
            }
            None => {
                Err(CirculationError::not_found(
                    format!("pool {} not found", entity.pool_id).as_str()))
            }
        }
    }

    async fn get(&self, id: &str) -> CirculationResult<LicensePoolEntity> {
        let tables = TABLES.read().map_err(lock_error)?;
        tables.get(self.table_name.as_str())
            .and_then(|rows| rows.get(id))
            .cloned()
            .ok_or_else(|| CirculationError::not_found(format!("pool {} not found", id).as_str()))
    }

    async fn delete(&self, id: &str) -> CirculationResult<usize> {
        let mut tables = TABLES.write().map_err(lock_error)?;
        let rows = tables.entry(self.table_name.to_string()).or_default();
        match rows.remove(id) {
            Some(_) => Ok(1),
            None => Err(CirculationError::not_found(format!("pool {} not found", id).as_str())),
        }
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> CirculationResult<PaginatedResult<LicensePoolEntity>> {
        let tables = TABLES.read().map_err(lock_error)?;
        let mut records: Vec<LicensePoolEntity> = Vec::new();
        if let Some(rows) = tables.get(self.table_name.as_str()) {
            for row in rows.values() {
                if matches_predicate(row, predicate)? {
                    records.push(row.clone());
                }
            }
        }
        records.sort_by(|first, second| first.created_at.cmp(&second.created_at)
            .then(first.pool_id.cmp(&second.pool_id)));
        paginate(records, page, page_size)
    }
}

impl PoolRepository for MemPoolRepository {}
