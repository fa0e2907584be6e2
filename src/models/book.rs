//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::author::{Author, AuthorWithStats};

/// Book row. Every field defaults so that sparse listings still decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub genre: String,
    pub published_year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book with its owning author embedded, as served by the listing endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookWithAuthor {
    #[serde(flatten)]
    pub book: Book,
    #[serde(default)]
    pub author: Author,
}

impl BookWithAuthor {
    pub fn id(&self) -> &str {
        &self.book.id
    }
}

/// Book details: the book plus its author's statistics and bibliography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    pub book: Book,
    pub author: AuthorWithStats,
}

/// Per-genre statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenreStats {
    pub genre: String,
    pub book_count: i64,
    pub average_publication_year: i32,
}

/// Listing query parameters (API)
#[derive(Debug, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Page number, starting at 1
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,
    /// Items per page (`limit` accepted as an alias)
    #[serde(alias = "limit")]
    #[validate(range(min = 1, message = "Page size must be at least 1"))]
    pub page_size: Option<u32>,
    /// Genre label
    pub genre: Option<String>,
    /// Case-insensitive substring of the title
    #[validate(length(max = 255, message = "Search text too long"))]
    pub search: Option<String>,
}
