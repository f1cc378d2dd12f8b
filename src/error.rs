use std::io;

use thiserror::Error;

use crate::domain::schema::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("attachment upload failed: {0}")]
    AttachmentUpload(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("not signed in: {0}")]
    Unauthenticated(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// Failures whose detail stays in the logs; the user only sees a generic message.
    pub fn is_opaque(&self) -> bool {
        matches!(
            self,
            AppError::Configuration(_) | AppError::Delivery(_) | AppError::AttachmentUpload(_)
        )
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

pub type AppResult<T> = Result<T, AppError>;
