use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CirculationError {
    // pool owns no license that could ever satisfy a checkout
    NoLicenses {
        message: String,
    },
    // copies exist but every one is loaned out or reserved
    NoAvailableCopies {
        message: String,
    },
    AlreadyCheckedOut {
        message: String,
    },
    AlreadyOnHold {
        message: String,
    },
    NotCheckedOut {
        message: String,
    },
    NotOnHold {
        message: String,
    },
    // hold attempted while a copy is available, caller should check out instead
    CurrentlyAvailable {
        message: String,
    },
    CannotLoan {
        message: String,
        reason_code: Option<String>,
    },
    CannotFulfill {
        message: String,
        reason_code: Option<String>,
    },
    CannotReleaseHold {
        message: String,
        reason_code: Option<String>,
    },
    // malformed or unparseable status document
    BadResponse {
        message: String,
    },
    Storage {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl CirculationError {
    pub fn no_licenses(message: &str) -> CirculationError {
        CirculationError::NoLicenses { message: message.to_string() }
    }

    pub fn no_available_copies(message: &str) -> CirculationError {
        CirculationError::NoAvailableCopies { message: message.to_string() }
    }

    pub fn already_checked_out(message: &str) -> CirculationError {
        CirculationError::AlreadyCheckedOut { message: message.to_string() }
    }

    pub fn already_on_hold(message: &str) -> CirculationError {
        CirculationError::AlreadyOnHold { message: message.to_string() }
    }

    pub fn not_checked_out(message: &str) -> CirculationError {
        CirculationError::NotCheckedOut { message: message.to_string() }
    }

    pub fn not_on_hold(message: &str) -> CirculationError {
        CirculationError::NotOnHold { message: message.to_string() }
    }

    pub fn currently_available(message: &str) -> CirculationError {
        CirculationError::CurrentlyAvailable { message: message.to_string() }
    }

    pub fn cannot_loan(message: &str, reason_code: Option<String>) -> CirculationError {
        CirculationError::CannotLoan { message: message.to_string(), reason_code }
    }

    pub fn cannot_fulfill(message: &str, reason_code: Option<String>) -> CirculationError {
        CirculationError::CannotFulfill { message: message.to_string(), reason_code }
    }

    pub fn cannot_release_hold(message: &str, reason_code: Option<String>) -> CirculationError {
        CirculationError::CannotReleaseHold { message: message.to_string(), reason_code }
    }

    pub fn bad_response(message: &str) -> CirculationError {
        CirculationError::BadResponse { message: message.to_string() }
    }

    pub fn storage(message: &str, reason_code: Option<String>, retryable: bool) -> CirculationError {
        CirculationError::Storage { message: message.to_string(), reason_code, retryable }
    }

    pub fn duplicate_key(message: &str) -> CirculationError {
        CirculationError::DuplicateKey { message: message.to_string() }
    }

    pub fn not_found(message: &str) -> CirculationError {
        CirculationError::NotFound { message: message.to_string() }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> CirculationError {
        CirculationError::Validation { message: message.to_string(), reason_code }
    }

    pub fn serialization(message: &str) -> CirculationError {
        CirculationError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> CirculationError {
        CirculationError::Runtime { message: message.to_string(), reason_code }
    }

    // remote protocol and network failures are never retried inside this core,
    // the immediate caller decides based on this flag
    pub fn retryable(&self) -> bool {
        match self {
            CirculationError::NoLicenses { .. } => { false }
            CirculationError::NoAvailableCopies { .. } => { false }
            CirculationError::AlreadyCheckedOut { .. } => { false }
            CirculationError::AlreadyOnHold { .. } => { false }
            CirculationError::NotCheckedOut { .. } => { false }
            CirculationError::NotOnHold { .. } => { false }
            CirculationError::CurrentlyAvailable { .. } => { false }
            CirculationError::CannotLoan { .. } => { false }
            CirculationError::CannotFulfill { .. } => { false }
            CirculationError::CannotReleaseHold { .. } => { false }
            CirculationError::BadResponse { .. } => { false }
            CirculationError::Storage { retryable, .. } => { *retryable }
            CirculationError::DuplicateKey { .. } => { false }
            CirculationError::NotFound { .. } => { false }
            CirculationError::Validation { .. } => { false }
            CirculationError::Serialization { .. } => { false }
            CirculationError::Runtime { .. } => { true }
        }
    }
}

impl From<serde_json::Error> for CirculationError {
    fn from(err: serde_json::Error) -> Self {
        CirculationError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<reqwest::Error> for CirculationError {
    fn from(err: reqwest::Error) -> Self {
        let reason = err.status().map(|s| s.as_u16().to_string());
        CirculationError::runtime(
            format!("remote request failed {:?}", err).as_str(), reason)
    }
}

impl Display for CirculationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CirculationError::NoLicenses { message } => {
                write!(f, "{}", message)
            }
            CirculationError::NoAvailableCopies { message } => {
                write!(f, "{}", message)
            }
            CirculationError::AlreadyCheckedOut { message } => {
                write!(f, "{}", message)
            }
            CirculationError::AlreadyOnHold { message } => {
                write!(f, "{}", message)
            }
            CirculationError::NotCheckedOut { message } => {
                write!(f, "{}", message)
            }
            CirculationError::NotOnHold { message } => {
                write!(f, "{}", message)
            }
            CirculationError::CurrentlyAvailable { message } => {
                write!(f, "{}", message)
            }
            CirculationError::CannotLoan { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            CirculationError::CannotFulfill { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            CirculationError::CannotReleaseHold { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            CirculationError::BadResponse { message } => {
                write!(f, "{}", message)
            }
            CirculationError::Storage { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            CirculationError::DuplicateKey { message } => {
                write!(f, "{}", message)
            }
            CirculationError::NotFound { message } => {
                write!(f, "{}", message)
            }
            CirculationError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            CirculationError::Serialization { message } => {
                write!(f, "{}", message)
            }
            CirculationError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

/// A specialized Result type for circulation operations.
pub type CirculationResult<T> = Result<T, CirculationError>;

// It defines abstraction for paginated result
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    // The page number or token
    pub page: Option<String>,
    // page size
    pub page_size: usize,
    // Next page if available
    pub next_page: Option<String>,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub(crate) fn new(page: Option<&str>, page_size: usize,
                      next_page: Option<String>, records: Vec<T>) -> Self {
        PaginatedResult {
            page: page.map(str::to_string),
            page_size,
            next_page,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::circulation::CirculationError;

    #[tokio::test]
    async fn test_should_create_queue_errors() {
        assert!(matches!(CirculationError::no_licenses("test"), CirculationError::NoLicenses { message: _ }));
        assert!(matches!(CirculationError::no_available_copies("test"), CirculationError::NoAvailableCopies { message: _ }));
        assert!(matches!(CirculationError::already_checked_out("test"), CirculationError::AlreadyCheckedOut { message: _ }));
        assert!(matches!(CirculationError::already_on_hold("test"), CirculationError::AlreadyOnHold { message: _ }));
        assert!(matches!(CirculationError::not_checked_out("test"), CirculationError::NotCheckedOut { message: _ }));
        assert!(matches!(CirculationError::not_on_hold("test"), CirculationError::NotOnHold { message: _ }));
        assert!(matches!(CirculationError::currently_available("test"), CirculationError::CurrentlyAvailable { message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_remote_errors() {
        assert!(matches!(CirculationError::cannot_loan("test", None), CirculationError::CannotLoan { message: _, reason_code: _ }));
        assert!(matches!(CirculationError::cannot_fulfill("test", None), CirculationError::CannotFulfill { message: _, reason_code: _ }));
        assert!(matches!(CirculationError::cannot_release_hold("test", None), CirculationError::CannotReleaseHold { message: _, reason_code: _ }));
        assert!(matches!(CirculationError::bad_response("test"), CirculationError::BadResponse { message: _ }));
    }

    #[tokio::test]
    async fn test_should_create_storage_errors() {
        assert!(matches!(CirculationError::storage("test", None, false), CirculationError::Storage { message: _, reason_code: _, retryable: _ }));
        assert!(matches!(CirculationError::duplicate_key("test"), CirculationError::DuplicateKey { message: _ }));
        assert!(matches!(CirculationError::not_found("test"), CirculationError::NotFound { message: _ }));
        assert!(matches!(CirculationError::validation("test", None), CirculationError::Validation { message: _, reason_code: _ }));
        assert!(matches!(CirculationError::serialization("test"), CirculationError::Serialization { message: _ }));
        assert!(matches!(CirculationError::runtime("test", None), CirculationError::Runtime { message: _, reason_code: _ }));
    }

    #[tokio::test]
    async fn test_should_create_retryable_error() {
        assert_eq!(false, CirculationError::no_licenses("test").retryable());
        assert_eq!(false, CirculationError::cannot_loan("test", None).retryable());
        assert_eq!(false, CirculationError::bad_response("test").retryable());
        assert_eq!(false, CirculationError::storage("test", None, false).retryable());
        assert_eq!(true, CirculationError::storage("test", None, true).retryable());
        assert_eq!(false, CirculationError::duplicate_key("test").retryable());
        assert_eq!(true, CirculationError::runtime("test", None).retryable());
    }
}
