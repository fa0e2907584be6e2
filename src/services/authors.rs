//! Author listing service

use std::collections::HashMap;

use chrono::{Datelike, Utc};

use crate::{
    error::AppResult,
    models::{Author, AuthorWithStats},
    repository::Repository,
};

/// Attach book counts and order by count, most prolific first.
/// Ties keep the incoming (alphabetical) order.
pub fn rank_by_book_count(authors: Vec<Author>, counts: Vec<(String, i64)>) -> Vec<AuthorWithStats> {
    let counts: HashMap<String, i64> = counts.into_iter().collect();
    let mut ranked: Vec<AuthorWithStats> = authors
        .into_iter()
        .map(|author| {
            let count = counts.get(&author.id).copied().unwrap_or(0);
            AuthorWithStats::counted(author, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.books_count.cmp(&a.books_count));
    ranked
}

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_authors(&self) -> AppResult<Vec<AuthorWithStats>> {
        let authors = self.repository.authors.list().await?;
        let counts = self.repository.books.count_by_author().await?;
        Ok(rank_by_book_count(authors, counts))
    }

    pub async fn get_author(&self, id: &str) -> AppResult<AuthorWithStats> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(&author.id).await?;
        Ok(AuthorWithStats::from_books(author, books, Utc::now().year()))
    }
}
