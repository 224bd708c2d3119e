use std::collections::HashMap;
use serde::Serialize;
use serde_json::Value;
use crate::core::circulation::{CirculationError, CirculationResult, PaginatedResult};

// Shared matching/pagination helpers for the in-memory arena repositories.
// Predicates are equality matches on top-level fields, like the filter
// expressions the row stores expose.

pub(crate) fn matches_predicate<T: Serialize>(entity: &T,
                                              predicate: &HashMap<String, String>) -> CirculationResult<bool> {
    if predicate.is_empty() {
        return Ok(true);
    }
    let val = serde_json::to_value(entity)?;
    for (field, expected) in predicate {
        if field_as_string(&val, field.as_str()).as_deref() != Some(expected.as_str()) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn field_as_string(val: &Value, field: &str) -> Option<String> {
    match val.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

// page tokens are row offsets rendered as strings
pub(crate) fn paginate<T>(mut records: Vec<T>, page: Option<&str>,
                          page_size: usize) -> CirculationResult<PaginatedResult<T>> {
    let offset = match page {
        Some(page) => page.parse::<usize>().map_err(|err| CirculationError::validation(
            format!("invalid page token {} {:?}", page, err).as_str(), None))?,
        None => 0,
    };
    let total = records.len();
    let records: Vec<T> = if offset >= total {
        records.clear();
        records
    } else {
        records.drain(..).skip(offset).take(page_size).collect()
    };
    let next_page = if offset + records.len() < total {
        Some((offset + records.len()).to_string())
    } else {
        None
    };
    Ok(PaginatedResult::new(page, page_size, next_page, records))
}
