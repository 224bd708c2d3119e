use async_trait::async_trait;
use crate::core::circulation::CirculationError;

#[derive(Debug)]
pub enum CommandError {
    // patron/pool state rejected the transition (already loaned, not on hold, ...)
    Conflict {
        message: String,
    },
    NotFound {
        message: String,
    },
    // remote license status protocol violated expectations
    Remote {
        message: String,
        reason_code: Option<String>,
    },
    Storage {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Serialization {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<CirculationError> for CommandError {
    fn from(other: CirculationError) -> Self {
        match other {
            CirculationError::NoLicenses { message } => {
                CommandError::Conflict { message }
            }
            CirculationError::NoAvailableCopies { message } => {
                CommandError::Conflict { message }
            }
            CirculationError::AlreadyCheckedOut { message } => {
                CommandError::Conflict { message }
            }
            CirculationError::AlreadyOnHold { message } => {
                CommandError::Conflict { message }
            }
            CirculationError::NotCheckedOut { message } => {
                CommandError::Conflict { message }
            }
            CirculationError::NotOnHold { message } => {
                CommandError::Conflict { message }
            }
            CirculationError::CurrentlyAvailable { message } => {
                CommandError::Conflict { message }
            }
            CirculationError::CannotLoan { message, reason_code } => {
                CommandError::Remote { message, reason_code }
            }
            CirculationError::CannotFulfill { message, reason_code } => {
                CommandError::Remote { message, reason_code }
            }
            CirculationError::CannotReleaseHold { message, reason_code } => {
                CommandError::Remote { message, reason_code }
            }
            CirculationError::BadResponse { message } => {
                CommandError::Remote { message, reason_code: None }
            }
            CirculationError::Storage { message, reason_code, retryable } => {
                CommandError::Storage { message, reason_code, retryable }
            }
            CirculationError::DuplicateKey { message } => {
                CommandError::Conflict { message }
            }
            CirculationError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            CirculationError::Validation { message, reason_code } => {
                CommandError::Validation { message, reason_code }
            }
            CirculationError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            CirculationError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code, retryable: true }
            }
        }
    }
}
