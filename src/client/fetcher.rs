//! Paging fetcher: translation between a committed filter and one listing request

use async_trait::async_trait;

use super::error::FetchError;
use crate::models::{pagination::total_pages, BookFilter, BookWithAuthor, Page};

/// Source of listing pages. Implementations never retry on their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PagingFetcher: Send + Sync {
    async fn fetch_page(&self, filter: &BookFilter) -> Result<Page<BookWithAuthor>, FetchError>;
}

/// Query parameters for a filter. Unset values are not sent.
pub fn to_query_pairs(filter: &BookFilter) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("page", filter.page.to_string()),
        ("pageSize", filter.page_size.to_string()),
    ];
    if let Some(genre) = filter.genre {
        pairs.push(("genre", genre.label().to_string()));
    }
    if let Some(ref search) = filter.search {
        pairs.push(("search", search.clone()));
    }
    pairs
}

/// Fill in metadata the server may have left out. `has_next` is the server's
/// call and is kept as reported.
pub fn normalize(mut page: Page<BookWithAuthor>) -> Page<BookWithAuthor> {
    let meta = &mut page.pagination;
    if meta.total_pages == 0 && meta.total > 0 {
        meta.total_pages = total_pages(meta.total, meta.page_size);
    }
    meta.has_prev = meta.page > 1;
    page
}
