//! Catalog listing service

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use validator::Validate;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{
        filter::normalize_search, Author, AuthorWithStats, Book, BookDetails, BookFilter,
        BookQuery, BookWithAuthor, Genre, GenreStats, Page, PageMetadata,
    },
    repository::Repository,
};

/// Turn raw query parameters into a checked listing filter
pub fn filter_from_query(query: &BookQuery, config: &CatalogConfig) -> AppResult<BookFilter> {
    query.validate()?;

    let genre = match query.genre.as_deref() {
        None | Some("") => None,
        Some(label) => Some(
            label
                .parse::<Genre>()
                .map_err(|e| AppError::Validation(e.to_string()))?,
        ),
    };

    let filter = BookFilter {
        search: query.search.as_deref().and_then(normalize_search),
        genre,
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(config.default_page_size),
    };
    filter
        .check(config.max_page_size)
        .map_err(AppError::Validation)?;

    Ok(filter)
}

/// Attach authors to books, substituting a placeholder for missing ones
pub fn join_authors(books: Vec<Book>, authors: Vec<Author>) -> Vec<BookWithAuthor> {
    let by_id: HashMap<String, Author> = authors.into_iter().map(|a| (a.id.clone(), a)).collect();
    books
        .into_iter()
        .map(|book| {
            let author = by_id
                .get(&book.author_id)
                .cloned()
                .unwrap_or_else(|| Author::unknown(&book.author_id));
            BookWithAuthor { book, author }
        })
        .collect()
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// One page of books with their authors
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Page<BookWithAuthor>> {
        let filter = filter_from_query(query, &self.config)?;
        tracing::debug!(
            page = filter.page,
            page_size = filter.page_size,
            genre = ?filter.genre,
            search = ?filter.search,
            "Listing books"
        );

        let (books, total) = self.repository.books.search(&filter).await?;

        let mut author_ids: Vec<String> = books.iter().map(|b| b.author_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();
        let authors = self.repository.authors.find_by_ids(&author_ids).await?;

        Ok(Page {
            items: join_authors(books, authors),
            pagination: PageMetadata::new(filter.page, filter.page_size, total.max(0) as u64),
        })
    }

    /// Book with its author's statistics and bibliography
    pub async fn book_details(&self, id: &str) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let author = self.repository.authors.get_by_id(&book.author_id).await?;
        let author_books = self.repository.books.list_by_author(&author.id).await?;

        Ok(BookDetails {
            book,
            author: AuthorWithStats::from_books(author, author_books, Utc::now().year()),
        })
    }

    pub async fn genre_stats(&self) -> AppResult<Vec<GenreStats>> {
        self.repository.books.genre_stats().await
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
