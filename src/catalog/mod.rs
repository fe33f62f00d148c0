//! Book and review storage, queries, and ranking.

pub mod error;
pub mod models;
pub mod ranking;
pub mod repository;
pub mod schema;

pub use error::CatalogError;
pub use models::{Book, BookId, BookPatch, NewBook, NewReview, RankedBook, Review, ReviewId};
pub use ranking::{RankingEngine, DEFAULT_TOP_LIMIT};
pub use repository::CatalogRepository;

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    lectern_db::connect_in_memory(&schema::all_migrations())
        .await
        .expect("in-memory catalog database")
}
