use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ErrorResponse;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("storage error: {0}")]
    Storage(#[from] libsql::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::InvalidBody(rejection) => {
                tracing::info!("rejected request body: {}", rejection.body_text());
                rejection.body_text()
            }
            ApiError::Storage(e) => {
                tracing::error!("storage error: {}", crate::unpack_error(e));
                self.to_string()
            }
            ApiError::Internal(e) => {
                tracing::error!("internal error: {:#}", e);
                self.to_string()
            }
        };

        (status, Json(ErrorResponse::new(status, message))).into_response()
    }
}
