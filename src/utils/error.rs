use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::utils::config::service_name;
use crate::utils::validation::ValidationError;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("{0}")]
    BadRequestError(String),

    /// Submission rejected by the shared validation rules; the message is
    /// already in the requester's language.
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    UnauthorizedError(String),

    #[error("{0}")]
    ForbiddenError(String),

    #[error("{0}")]
    NotFoundError(String),

    #[error("{0}")]
    ConflictError(String),

    /// Processor-reported failure, surfaced verbatim.
    #[error("{0}")]
    PaymentError(String),

    #[error("{0}")]
    InternalServerError(String),
}

impl CustomError {
    pub fn validation(err: ValidationError, lang: crate::utils::i18n::Language) -> Self {
        CustomError::ValidationError(err.message(lang))
    }

    pub fn error_code(&self) -> &'static str {
        match *self {
            CustomError::BadRequestError(..) => "BAD_REQUEST_ERROR",
            CustomError::ValidationError(..) => "VALIDATION_ERROR",
            CustomError::UnauthorizedError(..) => "UNAUTHORIZED_ERROR",
            CustomError::ForbiddenError(..) => "FORBIDDEN_ERROR",
            CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
            CustomError::ConflictError(..) => "CONFLICT_ERROR",
            CustomError::PaymentError(..) => "PAYMENT_ERROR",
            CustomError::InternalServerError(..) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::BadRequestError(..) => StatusCode::BAD_REQUEST,
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
            CustomError::UnauthorizedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::ForbiddenError(..) => StatusCode::FORBIDDEN,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::ConflictError(..) => StatusCode::CONFLICT,
            CustomError::PaymentError(..) => StatusCode::BAD_GATEWAY,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.to_string(),
            "errorCode": self.error_code(),
            "httpStatusCode": self.status_code().as_u16(),
            "service": service_name(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_error_envelope_carries_message_verbatim() {
        let err = CustomError::PaymentError("Your card was declined.".to_string());
        let res = err.error_response();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

        let body = to_bytes(res.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Your card was declined.");
        assert_eq!(value["errorCode"], "PAYMENT_ERROR");
        assert_eq!(value["httpStatusCode"], 502);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CustomError::ForbiddenError("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            CustomError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
