//! HTTP client for the catalog API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    error::FetchError,
    fetcher::{normalize, to_query_pairs, PagingFetcher},
};
use crate::{
    config::ClientConfig,
    models::{ApiResponse, AuthorWithStats, BookDetails, BookFilter, BookWithAuthor, GenreStats, Page},
};

#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    max_page_size: u32,
}

impl CatalogClient {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        Self::with_base_url(&config.base_url, config.max_page_size, config.request_timeout())
    }

    pub fn with_base_url(
        base_url: &str,
        max_page_size: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::Validation(format!("Invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Validation(format!("Invalid base URL {}", base_url)));
        }

        Ok(Self {
            http,
            base_url,
            max_page_size,
        })
    }

    /// Base URL with `segments` appended, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Validation(format!("Invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a path and unwrap the `data` of the response envelope
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = self.endpoint(segments)?;
        debug!("GET {} {:?}", url, query);

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        envelope
            .data
            .ok_or_else(|| FetchError::Decode("response carried no data".to_string()))
    }

    /// One listing page. The filter is checked before anything is sent.
    pub async fn list_books(&self, filter: &BookFilter) -> Result<Page<BookWithAuthor>, FetchError> {
        filter
            .check(self.max_page_size)
            .map_err(FetchError::Validation)?;

        let page = self.get_json(&["books"], &to_query_pairs(filter)).await?;
        Ok(normalize(page))
    }

    pub async fn book_details(&self, id: &str) -> Result<BookDetails, FetchError> {
        self.get_json(&["books", "details", id], &[]).await
    }

    pub async fn genre_stats(&self) -> Result<Vec<GenreStats>, FetchError> {
        self.get_json(&["books", "genre-stats"], &[]).await
    }

    pub async fn authors(&self) -> Result<Vec<AuthorWithStats>, FetchError> {
        self.get_json(&["authors"], &[]).await
    }

    pub async fn author(&self, id: &str) -> Result<AuthorWithStats, FetchError> {
        self.get_json(&["authors", id], &[]).await
    }
}

#[async_trait]
impl PagingFetcher for CatalogClient {
    async fn fetch_page(&self, filter: &BookFilter) -> Result<Page<BookWithAuthor>, FetchError> {
        self.list_books(filter).await
    }
}
