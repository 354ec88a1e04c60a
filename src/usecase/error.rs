use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::repository::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum UsecaseError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl From<RepositoryError> for UsecaseError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => UsecaseError::NotFound("Recommendation".to_string()),
            RepositoryError::Conflict(msg) => UsecaseError::Conflict(msg),
            RepositoryError::DatabaseError(msg) => UsecaseError::Internal(msg),
        }
    }
}

impl UsecaseError {
    pub fn status(&self) -> StatusCode {
        match self {
            UsecaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UsecaseError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            UsecaseError::Conflict(_) => StatusCode::CONFLICT,
            UsecaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UsecaseError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        match &self {
            UsecaseError::Internal(_) => {
                tracing::error!(error = %self, "internal error");
                return (status, "Internal server error").into_response();
            }
            UsecaseError::NotFound(_) => {
                tracing::warn!(error = %self, "resource not found");
            }
            UsecaseError::Conflict(_) => {
                tracing::warn!(error = %self, "conflict");
            }
            UsecaseError::Validation(_) => {
                tracing::debug!(error = %self);
            }
        }

        (status, self.to_string()).into_response()
    }
}
