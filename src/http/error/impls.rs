use actix_web::{body::BoxBody, http::StatusCode, HttpResponse};
use error_stack::Report;

use super::Error;
use crate::services::ServiceError;
use crate::types::Error as ErrorType;

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.error_type {
            ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::ReadonlyMode => StatusCode::SERVICE_UNAVAILABLE,
            ErrorType::InvalidFormBody(..) => StatusCode::BAD_REQUEST,
            ErrorType::InvalidCredentials | ErrorType::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        HttpResponse::build(status).json(&self.error_type)
    }
}

impl From<Report<ServiceError>> for Error {
    fn from(value: Report<ServiceError>) -> Self {
        let error_type = match value.current_context() {
            ServiceError::NotFound(..) => ErrorType::NotFound,
            ServiceError::Validation(message) => ErrorType::InvalidFormBody(message.to_string()),
            ServiceError::InvalidCredentials => ErrorType::InvalidCredentials,
            ServiceError::Readonly => ErrorType::ReadonlyMode,
            ServiceError::Storage => ErrorType::Internal,
        };
        Error::from_report(error_type, value)
    }
}

impl From<actix_web::error::JsonPayloadError> for Error {
    fn from(value: actix_web::error::JsonPayloadError) -> Self {
        #[derive(Debug, thiserror::Error)]
        #[error("Could not parse request body")]
        struct InvalidBody;

        let message = value.to_string();
        Error::from_report(
            ErrorType::InvalidFormBody(message),
            Report::new(InvalidBody).attach_printable(value.to_string()),
        )
    }
}

impl From<actix_web::error::QueryPayloadError> for Error {
    fn from(value: actix_web::error::QueryPayloadError) -> Self {
        #[derive(Debug, thiserror::Error)]
        #[error("Could not parse query string")]
        struct InvalidQuery;

        let message = value.to_string();
        Error::from_report(
            ErrorType::InvalidFormBody(message),
            Report::new(InvalidQuery).attach_printable(value.to_string()),
        )
    }
}
