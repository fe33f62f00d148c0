use lectern_http::AppError;

use super::models::BookId;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("no reviewed books")]
    NoReviewedBooks,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CatalogError {
    pub(crate) fn book_not_found(id: BookId) -> Self {
        Self::NotFound { entity: "book", id }
    }

    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { .. } => AppError::not_found(err.to_string()),
            CatalogError::Validation { field, message } => AppError::validation(
                vec![serde_json::json!({ "field": field, "error": message })],
                format!("{field}: {message}"),
            ),
            CatalogError::NoReviewedBooks => {
                AppError::not_found_with_code("no_reviewed_books", "no reviewed books found")
            }
            CatalogError::Database(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}
