//! Top-N books by summed review rating.

use sqlx::SqlitePool;

use super::error::CatalogError;
use super::models::RankedBook;

pub const DEFAULT_TOP_LIMIT: u32 = 5;

// Ratings are summed per book, then left-joined so books without rated
// reviews stay in the result with a NULL total and sort after every rated book.
const TOP_BOOKS_QUERY: &str = r#"
    SELECT b.id, b.title, b.author, b.summary, b.genre, totals.total_rating
    FROM books AS b
    LEFT JOIN (
        SELECT book_id, SUM(rating) AS total_rating
        FROM reviews
        WHERE rating IS NOT NULL
        GROUP BY book_id
    ) AS totals ON totals.book_id = b.id
    ORDER BY totals.total_rating IS NULL, totals.total_rating DESC, b.id ASC
    LIMIT ?
"#;

#[derive(Clone)]
pub struct RankingEngine {
    pool: SqlitePool,
}

impl RankingEngine {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Books ordered by the sum of their ratings, highest first, ties by id.
    ///
    /// Fails with [`CatalogError::NoReviewedBooks`] when no book has a rated
    /// review, rather than returning a list of unrated books.
    pub async fn top_books(&self, limit: u32) -> Result<Vec<RankedBook>, CatalogError> {
        if limit == 0 {
            return Err(CatalogError::invalid("limit", "must be at least 1"));
        }

        let ranked = sqlx::query_as::<_, RankedBook>(TOP_BOOKS_QUERY)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        // Rated books sort first, so the head tells whether any exist.
        match ranked.first() {
            Some(head) if head.total_rating.is_some() => Ok(ranked),
            _ => Err(CatalogError::NoReviewedBooks),
        }
    }
}
