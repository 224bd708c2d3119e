use std::collections::HashMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::holds::domain::HoldService;
use crate::holds::dto::HoldDto;

pub(crate) struct QueryHoldsCommand {
    hold_service: Box<dyn HoldService>,
}

impl QueryHoldsCommand {
    pub(crate) fn new(hold_service: Box<dyn HoldService>) -> Self {
        Self {
            hold_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryHoldsCommandRequest {
    #[serde(default)]
    pub predicate: HashMap<String, String>,
    pub page: Option<String>,
    pub page_size: Option<usize>,
}

impl QueryHoldsCommandRequest {
    pub fn new(predicate: HashMap<String, String>) -> Self {
        Self {
            predicate,
            page: None,
            page_size: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QueryHoldsCommandResponse {
    holds: Vec<HoldDto>,
    next_page: Option<String>,
}

#[async_trait]
impl Command<QueryHoldsCommandRequest, QueryHoldsCommandResponse> for QueryHoldsCommand {
    async fn execute(&self, req: QueryHoldsCommandRequest) -> Result<QueryHoldsCommandResponse, CommandError> {
        let res = self.hold_service.query_holds(&req.predicate,
                                                req.page.as_deref(), req.page_size.unwrap_or(50))
            .await.map_err(CommandError::from)?;
        Ok(QueryHoldsCommandResponse {
            holds: res.records,
            next_page: res.next_page,
        })
    }
}
