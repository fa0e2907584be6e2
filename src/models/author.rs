//! Author model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::Book;

/// Author row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    pub birth_year: i32,
    pub nationality: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    /// Stand-in used when a book references an author that no longer exists
    pub fn unknown(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            name: "Unknown Author".to_string(),
            birth_year: 0,
            nationality: "Unknown".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Author with catalog statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorWithStats {
    #[serde(flatten)]
    pub author: Author,
    pub books_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_publication_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_impact_score: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<Book>>,
}

impl AuthorWithStats {
    /// Author listed with its book count only
    pub fn counted(author: Author, books_count: i64) -> Self {
        Self {
            author,
            books_count,
            average_publication_year: None,
            author_impact_score: None,
            books: None,
        }
    }

    /// Full statistics over the author's books.
    ///
    /// The average publication year is the rounded mean (0 without books) and the
    /// impact score is `books * 10 + (current_year - average)`.
    pub fn from_books(author: Author, books: Vec<Book>, current_year: i32) -> Self {
        let books_count = books.len() as i64;
        let average = if books.is_empty() {
            0
        } else {
            let sum: i64 = books.iter().map(|b| b.published_year as i64).sum();
            (sum as f64 / books_count as f64).round() as i32
        };
        let impact = (books_count as i32) * 10 + (current_year - average);

        Self {
            author,
            books_count,
            average_publication_year: Some(average),
            author_impact_score: Some(impact),
            books: Some(books),
        }
    }
}
