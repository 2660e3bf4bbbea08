use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Access denied")]
    Forbidden,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        let msg = e.to_string();
        match e {
            DomainError::NotFound(_) => AppError::NotFound(msg),
            DomainError::Unauthorized => AppError::Forbidden,
            DomainError::InsufficientStock(_) => AppError::Conflict(msg),
            DomainError::EmptyCart | DomainError::InvalidCoupon | DomainError::InvalidInput(_) => {
                AppError::BadRequest(msg)
            }
            DomainError::Internal(inner) => AppError::Internal(inner),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = |msg: &str| serde_json::json!({ "error": msg });
        match self {
            AppError::NotFound(_) => HttpResponse::NotFound().json(body(&self.to_string())),
            AppError::Unauthenticated => HttpResponse::Unauthorized().json(body(&self.to_string())),
            AppError::Forbidden => HttpResponse::Forbidden().json(body(&self.to_string())),
            AppError::Conflict(_) => HttpResponse::Conflict().json(body(&self.to_string())),
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(body(&self.to_string())),
            AppError::Internal(_) => {
                HttpResponse::InternalServerError().json(body("Internal server error"))
            }
        }
    }
}
