use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Todo item not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid modification token")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Indexing error: {0}")]
    Indexing(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TodoResult<T> = Result<T, TodoError>;

/// Convert TodoError to AppError for standardized error responses.
///
/// Infrastructure failures (store, index, notification gateway) are logged
/// with full detail here and surfaced with a generic message so internal
/// error text never reaches the client.
impl From<TodoError> for AppError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::NotFound(id) => AppError::NotFound(format!("Todo item {} not found", id)),
            TodoError::Unauthorized => {
                AppError::Unauthorized("Invalid modification token".to_string())
            }
            TodoError::Validation(msg) => AppError::BadRequest(msg),
            TodoError::Store(msg) => {
                tracing::error!("Store failure: {}", msg);
                AppError::InternalServerError("There was an issue with the item store".to_string())
            }
            TodoError::Indexing(msg) => {
                tracing::error!("Indexing failure: {}", msg);
                AppError::InternalServerError(
                    "There was an issue with the search index".to_string(),
                )
            }
            TodoError::Delivery(msg) => {
                tracing::error!("Delivery failure: {}", msg);
                AppError::InternalServerError(
                    "There was an issue with the notification gateway".to_string(),
                )
            }
            TodoError::Internal(msg) => {
                tracing::error!("Internal failure: {}", msg);
                AppError::InternalServerError("An internal error occurred".to_string())
            }
        }
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        // Convert to AppError for the standardized error response format
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for TodoError {
    fn from(err: mongodb::error::Error) -> Self {
        TodoError::Store(err.to_string())
    }
}
