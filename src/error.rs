//! Errors returned by poll and vote operations
//!
//! One variant per failure category. Validation is checked before
//! authorization, and authorization before storage, so a failing call reports
//! exactly one of them.

use crate::storage::StorageError;
use crate::validation::ValidationError;

#[derive(Debug)]
pub enum PollError {
    /// Malformed or out-of-policy input
    Validation(ValidationError),
    /// No authenticated identity
    Unauthenticated,
    /// Authenticated, but not allowed
    AccessDenied,
    /// The referenced poll does not exist
    NotFound,
    /// The actor already voted on this poll
    AlreadyVoted,
    /// Passed through from the store
    Storage(StorageError),
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::Validation(e) => write!(f, "{}", e),
            PollError::Unauthenticated => write!(f, "You must be logged in."),
            PollError::AccessDenied => write!(f, "Access denied."),
            PollError::NotFound => write!(f, "Poll not found."),
            PollError::AlreadyVoted => write!(f, "You have already voted on this poll."),
            PollError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PollError::Validation(e) => Some(e),
            PollError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for PollError {
    fn from(e: ValidationError) -> Self {
        PollError::Validation(e)
    }
}

impl From<StorageError> for PollError {
    fn from(e: StorageError) -> Self {
        log::error!("Storage failure: {}", e);
        PollError::Storage(e)
    }
}
