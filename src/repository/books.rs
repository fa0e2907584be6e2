//! Books repository for database operations.
//!
//! Listing queries are assembled with `QueryBuilder` so that filter values are
//! always bound, never interpolated.

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{book::GenreStats, filter::BookFilter, Book},
};

const BOOK_COLUMNS: &str =
    "SELECT id, title, author_id, genre, published_year, created_at, updated_at FROM books";

/// Escape LIKE wildcards so user text matches literally
pub fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &BookFilter) {
    qb.push(" WHERE 1=1");
    if let Some(genre) = filter.genre {
        qb.push(" AND genre = ").push_bind(genre.label());
    }
    if let Some(ref search) = filter.search {
        qb.push(" AND title ILIKE ")
            .push_bind(format!("%{}%", escape_like(search)));
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// One page of books matching the filter, plus the total match count.
    /// Order is `created_at DESC, id DESC`, stable across pages.
    pub async fn search(&self, filter: &BookFilter) -> AppResult<(Vec<Book>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM books");
        push_conditions(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(BOOK_COLUMNS);
        push_conditions(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(filter.page_size as i64)
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let books = select
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("{} WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// All books of an author, newest publication first
    pub async fn list_by_author(&self, author_id: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "{} WHERE author_id = $1 ORDER BY published_year DESC, id",
            BOOK_COLUMNS
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Book counts keyed by author id
    pub async fn count_by_author(&self) -> AppResult<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT author_id, COUNT(*) FROM books GROUP BY author_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Count and rounded mean publication year per genre, largest first
    pub async fn genre_stats(&self) -> AppResult<Vec<GenreStats>> {
        let stats = sqlx::query_as::<_, GenreStats>(
            r#"
            SELECT genre,
                   COUNT(*) AS book_count,
                   ROUND(AVG(published_year))::int AS average_publication_year
            FROM books
            GROUP BY genre
            ORDER BY book_count DESC, genre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }
}
