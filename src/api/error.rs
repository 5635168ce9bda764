use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::Display;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Display, Error)]
pub enum ApiError {
    #[display(fmt = "Invalid JSON")]
    InvalidPayload,
    #[display(fmt = "Invalid name")]
    InvalidName,
    #[display(fmt = "Invalid score")]
    InvalidScore,
    #[display(fmt = "Not found")]
    NotFound,
    #[display(fmt = "Internal Server Error")]
    StorageUnavailable(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload | ApiError::InvalidName | ApiError::InvalidScore => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::StorageUnavailable(err) = self {
            log::error!("{}", err);
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::StorageUnavailable(err.into())
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        ApiError::StorageUnavailable(err.into())
    }
}
