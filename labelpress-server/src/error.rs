//! HTTP error mapping for service failures

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use labelpress_core::ServiceError;
use serde::Serialize;

pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidQuantity
            | ServiceError::EmptyPrinter
            | ServiceError::UnknownPrinter(_) => Self::bad_request(err.to_string()),
            ServiceError::RecordNotFound(_) => Self::not_found(err.to_string()),
            ServiceError::Resolve(_) | ServiceError::Inspect(_) => {
                Self::not_found(err.to_string())
            }
            ServiceError::History(_) => Self::internal(err.to_string()),
        }
    }
}
