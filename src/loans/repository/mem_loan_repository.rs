use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use lazy_static::lazy_static;

use crate::core::circulation::{CirculationError, CirculationResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::loans::domain::model::LoanEntity;
use crate::loans::repository::LoanRepository;
use crate::utils::mem::{matches_predicate, paginate};

lazy_static! {
    static ref TABLES: RwLock<HashMap<String, HashMap<String, LoanEntity>>> =
        RwLock::new(HashMap::new());
}

#[derive(Debug)]
pub(crate) struct MemLoanRepository {
    table_name: String,
}

impl MemLoanRepository {
    pub(crate) fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
        }
    }
}

fn lock_error<T>(err: T) -> CirculationError where T: std::fmt::Debug {
    CirculationError::storage(format!("loan table lock {:?}", err).as_str(), None, true)
}

#[async_trait]
impl Repository<LoanEntity> for MemLoanRepository {
    async fn create(&self, entity: &LoanEntity) -> CirculationResult<usize> {
        let mut tables = TABLES.write().map_err(lock_error)?;
        let rows = tables.entry(self.table_name.to_string()).or_default();
        if rows.contains_key(entity.loan_id.as_str()) {
            return Err(CirculationError::duplicate_key(
                format!("loan {} already exists", entity.loan_id).as_str()));
        }
        // a patron holds at most one loan per pool
        if rows.values().any(|row| row.patron_id == entity.patron_id
            && row.pool_id == entity.pool_id) {
            return Err(CirculationError::duplicate_key(
                format!("patron {} already has a loan for pool {}",
                        entity.patron_id, entity.pool_id).as_str()));
        }
        rows.insert(entity.loan_id.to_string(), entity.clone());
        Ok(1)
    }

    async fn update(&self, entity: &LoanEntity) -> CirculationResult<usize> {
        let mut tables = TABLES.write().map_err(lock_error)?;
        let rows = tables.entry(self.table_name.to_string()).or_default();
        let stored_version = rows.get(entity.loan_id.as_str()).map(|row| row.version);
        match stored_version {
            Some(version) if version != entity.version => {
                Err(CirculationError::storage(
                    format!("loan {} version conflict {} != {}",
                            entity.loan_id, version, entity.version).as_str(), None, true))
            }
            Some(_) => {
                let mut next = entity.clone();
                next.version += 1;
                rows.insert(entity.loan_id.to_string(), next);
                Ok(1)
            }
            None => {
                Err(CirculationError::not_found(
                    format!("loan {} not found", entity.loan_id).as_str()))
            }
        }
    }

    async fn get(&self, id: &str) -> CirculationResult<LoanEntity> {
        let tables = TABLES.read().map_err(lock_error)?;
        tables.get(self.table_name.as_str())
            .and_then(|rows| rows.get(id))
            .cloned()
            .ok_or_else(|| CirculationError::not_found(format!("loan {} not found", id).as_str()))
    }

    async fn delete(&self, id: &str) -> CirculationResult<usize> {
        let mut tables = TABLES.write().map_err(lock_error)?;
        let rows = tables.entry(self.table_name.to_string()).or_default();
        match rows.remove(id) {
            Some(_) => Ok(1),
            None => Err(CirculationError::not_found(format!("loan {} not found", id).as_str())),
        }
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> CirculationResult<PaginatedResult<LoanEntity>> {
        let tables = TABLES.read().map_err(lock_error)?;
        let mut records: Vec<LoanEntity> = Vec::new();
        if let Some(rows) = tables.get(self.table_name.as_str()) {
            for row in rows.values() {
                if matches_predicate(row, predicate)? {
                    records.push(row.clone());
                }
            }
        }
        records.sort_by(|first, second| first.created_at.cmp(&second.created_at)
            .then(first.loan_id.cmp(&second.loan_id)));
        paginate(records, page, page_size)
    }
}

#[async_trait]
impl LoanRepository for MemLoanRepository {
    async fn find_by_patron_pool(&self, patron_id: &str, pool_id: &str) -> CirculationResult<Option<LoanEntity>> {
        let tables = TABLES.read().map_err(lock_error)?;
        Ok(tables.get(self.table_name.as_str())
            .and_then(|rows| rows.values()
                .find(|row| row.patron_id == patron_id && row.pool_id == pool_id))
            .cloned())
    }

    async fn find_active_by_pool(&self, pool_id: &str, as_of: NaiveDateTime) -> CirculationResult<Vec<LoanEntity>> {
        let tables = TABLES.read().map_err(lock_error)?;
        let mut records: Vec<LoanEntity> = tables.get(self.table_name.as_str())
            .map(|rows| rows.values()
                .filter(|row| row.pool_id == pool_id && row.is_active(as_of))
                .cloned()
                .collect())
            .unwrap_or_default();
        records.sort_by(|first, second| first.start.cmp(&second.start)
            .then(first.loan_id.cmp(&second.loan_id)));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;
    use crate::core::repository::Repository;
    use crate::loans::domain::model::LoanEntity;
    use crate::loans::repository::LoanRepository;
    use crate::loans::repository::mem_loan_repository::MemLoanRepository;

    fn test_table() -> String {
        format!("loans_{}", Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_should_enforce_patron_pool_uniqueness() {
        let repo = MemLoanRepository::new(test_table().as_str());
        let loan = LoanEntity::new("pool1", "patron1", "lic1", Duration::days(21));
        repo.create(&loan).await.expect("should create");
        let duplicate = LoanEntity::new("pool1", "patron1", "lic1", Duration::days(21));
        assert!(repo.create(&duplicate).await.is_err());
        let other_pool = LoanEntity::new("pool2", "patron1", "lic1", Duration::days(21));
        repo.create(&other_pool).await.expect("should create");
    }

    #[tokio::test]
    async fn test_should_find_by_patron_pool() {
        let repo = MemLoanRepository::new(test_table().as_str());
        let loan = LoanEntity::new("pool1", "patron1", "lic1", Duration::days(21));
        repo.create(&loan).await.expect("should create");
        let found = repo.find_by_patron_pool("patron1", "pool1").await.expect("should find");
        assert_eq!(Some(loan.loan_id.to_string()), found.map(|row| row.loan_id));
        let missing = repo.find_by_patron_pool("patron2", "pool1").await.expect("should find");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_should_find_active_by_pool_in_start_order() {
        let repo = MemLoanRepository::new(test_table().as_str());
        let now = Utc::now().naive_utc();
        let mut newer = LoanEntity::new("pool1", "patron1", "lic1", Duration::days(21));
        newer.start = now - Duration::days(1);
        repo.create(&newer).await.expect("should create");
        let mut older = LoanEntity::new("pool1", "patron2", "lic1", Duration::days(21));
        older.start = now - Duration::days(3);
        repo.create(&older).await.expect("should create");
        let mut expired = LoanEntity::new("pool1", "patron3", "lic1", Duration::days(21));
        expired.start = now - Duration::days(40);
        expired.end = now - Duration::days(19);
        repo.create(&expired).await.expect("should create");

        let active = repo.find_active_by_pool("pool1", now).await.expect("should find");
        assert_eq!(2, active.len());
        assert_eq!(older.loan_id, active[0].loan_id);
        assert_eq!(newer.loan_id, active[1].loan_id);
    }

    #[tokio::test]
    async fn test_should_delete_loan() {
        let repo = MemLoanRepository::new(test_table().as_str());
        let loan = LoanEntity::new("pool1", "patron1", "lic1", Duration::days(21));
        repo.create(&loan).await.expect("should create");
        repo.delete(loan.loan_id.as_str()).await.expect("should delete");
        assert!(repo.get(loan.loan_id.as_str()).await.is_err());
    }
}
