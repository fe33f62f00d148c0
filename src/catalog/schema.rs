//! Table definitions for books and reviews.
//!
//! `AUTOINCREMENT` keeps ids from being reused after a delete. Reviews reference
//! their book with `ON DELETE CASCADE`, which relies on the pool enabling
//! foreign keys on every connection.

use lectern_kernel::Migration;

pub const BOOKS_MODULE: &str = "books";
pub const REVIEWS_MODULE: &str = "reviews";

pub fn books_migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_init",
        up: r#"
            CREATE TABLE IF NOT EXISTS books (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                title   TEXT NOT NULL CHECK (length(trim(title)) > 0),
                author  TEXT,
                summary TEXT,
                genre   TEXT
            );
            CREATE INDEX IF NOT EXISTS books_genre_idx ON books (genre);
            "#,
    }]
}

pub fn reviews_migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_init",
        up: r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                book_id     INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
                user        TEXT,
                rating      INTEGER,
                review_text TEXT
            );
            CREATE INDEX IF NOT EXISTS reviews_book_id_idx ON reviews (book_id);
            "#,
    }]
}

/// Every catalog migration tagged with its owning module, in apply order.
pub fn all_migrations() -> Vec<(String, Migration)> {
    books_migrations()
        .into_iter()
        .map(|m| (BOOKS_MODULE.to_string(), m))
        .chain(
            reviews_migrations()
                .into_iter()
                .map(|m| (REVIEWS_MODULE.to_string(), m)),
        )
        .collect()
}
