use std::collections::HashMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::loans::domain::LoanService;
use crate::loans::dto::LoanDto;

pub(crate) struct QueryLoansCommand {
    loan_service: Box<dyn LoanService>,
}

impl QueryLoansCommand {
    pub(crate) fn new(loan_service: Box<dyn LoanService>) -> Self {
        Self {
            loan_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryLoansCommandRequest {
    #[serde(default)]
    pub predicate: HashMap<String, String>,
    pub page: Option<String>,
    pub page_size: Option<usize>,
}

impl QueryLoansCommandRequest {
    pub fn new(predicate: HashMap<String, String>) -> Self {
        Self {
            predicate,
            page: None,
            page_size: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QueryLoansCommandResponse {
    loans: Vec<LoanDto>,
    next_page: Option<String>,
}

#[async_trait]
impl Command<QueryLoansCommandRequest, QueryLoansCommandResponse> for QueryLoansCommand {
    async fn execute(&self, req: QueryLoansCommandRequest) -> Result<QueryLoansCommandResponse, CommandError> {
        let res = self.loan_service.query_loans(&req.predicate,
                                                req.page.as_deref(), req.page_size.unwrap_or(50))
            .await.map_err(CommandError::from)?;
        Ok(QueryLoansCommandResponse {
            loans: res.records,
            next_page: res.next_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use uuid::Uuid;
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::loans::command::query_loans_cmd::{QueryLoansCommand, QueryLoansCommandRequest};
    use crate::loans::factory::create_loan_service;

    #[tokio::test]
    async fn test_should_query_empty_for_unknown_patron() {
        let svc = create_loan_service(&Configuration::new("test"), RepositoryStore::InMemory)
            .await.expect("should build service");
        let cmd = QueryLoansCommand::new(svc);
        let res = cmd.execute(QueryLoansCommandRequest::new(HashMap::from([
            ("patron_id".to_string(), Uuid::new_v4().to_string())]))).await.expect("should query");
        assert_eq!(0, res.loans.len());
        assert_eq!(None, res.next_page);
    }
}
