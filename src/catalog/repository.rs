//! CRUD and filtered queries over books and reviews.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::error::CatalogError;
use super::models::{Book, BookId, BookPatch, NewBook, NewReview, Review};

const BOOK_COLUMNS: &str = "id, title, author, summary, genre";
const REVIEW_COLUMNS: &str = "id, book_id, user, rating, review_text";

/// Repository over the `books` and `reviews` tables.
///
/// Every mutation is a single statement, so it is either fully applied or not
/// applied at all.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All books ordered by id, optionally restricted to an exact genre match.
    pub async fn list_books(&self, genre: Option<&str>) -> Result<Vec<Book>, CatalogError> {
        let books = match genre {
            Some(genre) => {
                sqlx::query_as::<_, Book>(&format!(
                    "SELECT {BOOK_COLUMNS} FROM books WHERE genre = ? ORDER BY id"
                ))
                .bind(genre)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(books)
    }

    pub async fn get_book(&self, id: BookId) -> Result<Book, CatalogError> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogError::book_not_found(id))
    }

    pub async fn create_book(&self, new_book: NewBook) -> Result<Book, CatalogError> {
        let title = match new_book.title {
            Some(title) if !title.trim().is_empty() => title,
            Some(_) => return Err(CatalogError::invalid("title", "must not be empty")),
            None => return Err(CatalogError::invalid("title", "is required")),
        };

        let book = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (title, author, summary, genre) VALUES (?, ?, ?, ?) \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(title)
        .bind(new_book.author)
        .bind(new_book.summary)
        .bind(new_book.genre)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(book_id = book.id, "book created");
        Ok(book)
    }

    /// Apply the fields present in `patch`; absent fields keep their value and
    /// an explicit `null` clears an optional field.
    pub async fn update_book(&self, id: BookId, patch: BookPatch) -> Result<Book, CatalogError> {
        match &patch.title {
            Some(None) => return Err(CatalogError::invalid("title", "must not be null")),
            Some(Some(title)) if title.trim().is_empty() => {
                return Err(CatalogError::invalid("title", "must not be empty"))
            }
            _ => {}
        }
        if patch.is_empty() {
            return self.get_book(id).await;
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE books SET ");
        {
            let mut assignments = query.separated(", ");
            let columns = [
                ("title", patch.title),
                ("author", patch.author),
                ("summary", patch.summary),
                ("genre", patch.genre),
            ];
            for (column, value) in columns {
                if let Some(value) = value {
                    assignments
                        .push(format!("{column} = "))
                        .push_bind_unseparated(value);
                }
            }
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {BOOK_COLUMNS}"));

        let book = query
            .build_query_as::<Book>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CatalogError::book_not_found(id))?;

        tracing::debug!(book_id = id, "book updated");
        Ok(book)
    }

    /// Delete a book; its reviews go with it through the cascading foreign key.
    pub async fn delete_book(&self, id: BookId) -> Result<(), CatalogError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::book_not_found(id));
        }

        tracing::debug!(book_id = id, "book deleted");
        Ok(())
    }

    pub async fn list_reviews(&self, book_id: Option<BookId>) -> Result<Vec<Review>, CatalogError> {
        let reviews = match book_id {
            Some(book_id) => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews WHERE book_id = ? ORDER BY id"
                ))
                .bind(book_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(reviews)
    }

    /// Insert a review for an existing book.
    ///
    /// The existence check and the insert are one statement, so a review is
    /// never written for a book that does not exist.
    pub async fn create_review(&self, new_review: NewReview) -> Result<Review, CatalogError> {
        let book_id = new_review
            .book_id
            .ok_or_else(|| CatalogError::invalid("book_id", "is required"))?;

        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (book_id, user, rating, review_text) \
             SELECT ?, ?, ?, ? WHERE EXISTS (SELECT 1 FROM books WHERE id = ?) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(book_id)
        .bind(new_review.user)
        .bind(new_review.rating)
        .bind(new_review.review_text)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            CatalogError::invalid("book_id", format!("book {book_id} does not exist"))
        })?;

        tracing::debug!(review_id = review.id, book_id, "review created");
        Ok(review)
    }
}
