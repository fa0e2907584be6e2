//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::Author,
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All authors in alphabetical order
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, name, birth_year, nationality, created_at, updated_at FROM authors ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            "SELECT id, name, birth_year, nationality, created_at, updated_at FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Author not found".to_string()))
    }

    /// Authors for a set of ids; missing ids are simply absent from the result
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Author>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, name, birth_year, nationality, created_at, updated_at FROM authors WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }
}
