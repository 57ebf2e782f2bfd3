//! Error types for the to-do and notes widgets.

use thiserror::Error;

/// Errors from widget operations.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// No item with the given id.
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Rejected input (blank title, ambiguous id, unknown option).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backing store could not be written.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WidgetError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            WidgetError::NotFound(id) => format!("Nothing found with id {}.", id),
            WidgetError::Validation(message) => message.clone(),
            WidgetError::Storage(_) => "Could not save your changes. Please try again.".into(),
            WidgetError::Other(_) => "An unexpected error occurred. Please try again.".into(),
        }
    }
}

pub type WidgetResult<T> = Result<T, WidgetError>;
