//! Test doubles shared by the client tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::error::FetchError;
use super::fetcher::PagingFetcher;
use crate::models::{Book, BookFilter, BookWithAuthor, Page, PageMetadata};

/// Items with ids `start..start + count`
pub fn books(start: usize, count: usize) -> Vec<BookWithAuthor> {
    (start..start + count)
        .map(|i| BookWithAuthor {
            book: Book {
                id: i.to_string(),
                title: format!("Book {}", i),
                ..Default::default()
            },
            ..Default::default()
        })
        .collect()
}

pub fn book_page(
    items: Vec<BookWithAuthor>,
    page: u32,
    page_size: u32,
    total: u64,
) -> Page<BookWithAuthor> {
    Page {
        items,
        pagination: PageMetadata::new(page, page_size, total),
    }
}

/// Fetcher that replays queued results and records every filter it saw.
///
/// With a gate set, each call waits for one `notify_one` before answering.
#[derive(Default)]
pub struct ScriptedFetcher {
    results: Mutex<VecDeque<Result<Page<BookWithAuthor>, FetchError>>>,
    seen: Mutex<Vec<BookFilter>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedFetcher {
    pub fn new(results: Vec<Result<Page<BookWithAuthor>, FetchError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            ..Default::default()
        }
    }

    pub fn gated(results: Vec<Result<Page<BookWithAuthor>, FetchError>>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(results)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<BookFilter> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl PagingFetcher for ScriptedFetcher {
    async fn fetch_page(&self, filter: &BookFilter) -> Result<Page<BookWithAuthor>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(filter.clone());
        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Decode("no scripted result".to_string())))
    }
}
