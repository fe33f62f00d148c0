use serde::{Deserialize, Deserializer, Serialize};

pub type BookId = i64;
pub type ReviewId = i64;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub genre: Option<String>,
}

/// Fields accepted when adding a book. `title` is optional here so a missing
/// title surfaces as a validation error instead of a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub genre: Option<String>,
}

/// Partial update of a book.
///
/// Each field is tri-state: absent (`None`) leaves the column alone, `null`
/// (`Some(None)`) clears it, and a value (`Some(Some(_))`) replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub author: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub genre: Option<Option<String>>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.summary.is_none() && self.genre.is_none()
    }
}

// Only called for keys that appear in the body, so an explicit null becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A reader's rating and comment on one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub book_id: BookId,
    pub user: Option<String>,
    pub rating: Option<i32>,
    pub review_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewReview {
    pub book_id: Option<BookId>,
    pub user: Option<String>,
    pub rating: Option<i32>,
    pub review_text: Option<String>,
}

/// A book together with the sum of its review ratings.
///
/// `total_rating` is `None` when the book has no rated reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RankedBook {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub book: Book,
    pub total_rating: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_book_serializes_flat() {
        let ranked = RankedBook {
            book: Book {
                id: 3,
                title: "Dune".to_string(),
                author: Some("Frank Herbert".to_string()),
                summary: None,
                genre: Some("Sci-Fi".to_string()),
            },
            total_rating: Some(9),
        };

        let value = serde_json::to_value(&ranked).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "title": "Dune",
                "author": "Frank Herbert",
                "summary": null,
                "genre": "Sci-Fi",
                "total_rating": 9
            })
        );
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let err = serde_json::from_str::<BookPatch>(r#"{"title": "T2", "id": 99}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field `id`"));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(BookPatch::default().is_empty());
        assert!(!BookPatch {
            genre: Some(None),
            ..BookPatch::default()
        }
        .is_empty());
    }

    #[test]
    fn patch_tells_null_apart_from_absent() {
        let patch: BookPatch =
            serde_json::from_str(r#"{"genre": null, "summary": "New"}"#).unwrap();
        assert_eq!(patch.genre, Some(None));
        assert_eq!(patch.summary, Some(Some("New".to_string())));
        assert_eq!(patch.title, None);
        assert_eq!(patch.author, None);
    }

    #[test]
    fn rating_beyond_i32_is_rejected() {
        let err = serde_json::from_str::<NewReview>(r#"{"book_id": 1, "rating": 9223372036854775807}"#)
            .unwrap_err();
        assert!(err.is_data());
    }
}
