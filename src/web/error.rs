//! JSON error responses.
//!
//! Every failure leaves the API as `{"error": "<message>"}` with a status
//! matching its category.

use crate::error::PollError;
use crate::identity::IdentityError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Builds an error response with the given status and message.
pub fn render_error(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody {
        error: message.into(),
    })
}

impl ResponseError for PollError {
    fn status_code(&self) -> StatusCode {
        match self {
            PollError::Validation(_) => StatusCode::BAD_REQUEST,
            PollError::Unauthenticated => StatusCode::UNAUTHORIZED,
            PollError::AccessDenied => StatusCode::FORBIDDEN,
            PollError::NotFound => StatusCode::NOT_FOUND,
            PollError::AlreadyVoted => StatusCode::CONFLICT,
            PollError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // Backend details stay in the log.
            PollError::Storage(_) => render_error(self.status_code(), "Internal server error."),
            _ => render_error(self.status_code(), self.to_string()),
        }
    }
}

impl ResponseError for IdentityError {
    fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::Rejected(_) => StatusCode::BAD_REQUEST,
            IdentityError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            IdentityError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            IdentityError::Rejected(msg) => render_error(self.status_code(), msg.as_str()),
            _ => render_error(
                self.status_code(),
                "Authentication service is unavailable.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use crate::validation::ValidationError;

    #[test]
    fn test_poll_error_status_codes() {
        assert_eq!(
            PollError::Validation(ValidationError::InvalidPollId).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(PollError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(PollError::AccessDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(PollError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(PollError::AlreadyVoted.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            PollError::Storage(StorageError::Backend("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_identity_error_status_codes() {
        assert_eq!(
            IdentityError::Rejected("Invalid login credentials".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            IdentityError::Unavailable("timeout".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
