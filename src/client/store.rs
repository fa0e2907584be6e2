//! Incrementally loaded collection store
//!
//! Wraps [`CollectionState`] behind one async lock. Every operation takes the
//! lock to run a transition, releases it for the fetch, then takes it again to
//! apply the result, so the lock is never held across a network call.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::fetcher::PagingFetcher;
use super::state::{CollectionState, LoadMode, LoadOutcome, LoadTicket, StoreSnapshot};
use crate::config::ClientConfig;
use crate::models::{BookFilter, FilterPatch};

pub struct CollectionStore<F> {
    fetcher: F,
    state: Arc<Mutex<CollectionState>>,
}

/// Releases the in-flight flag if a load future is dropped between issuing
/// its ticket and applying the response.
struct InFlight {
    state: Arc<Mutex<CollectionState>>,
    ticket: Option<LoadTicket>,
}

impl InFlight {
    fn disarm(mut self) {
        self.ticket = None;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        if let Ok(mut state) = self.state.try_lock() {
            state.abandon(&ticket);
            return;
        }
        // Lock is busy; release once it frees up
        if let Ok(handle) = Handle::try_current() {
            let state = self.state.clone();
            handle.spawn(async move {
                state.lock().await.abandon(&ticket);
            });
        }
    }
}

impl<F: PagingFetcher> CollectionStore<F> {
    pub fn new(fetcher: F, page_size: u32, max_empty_pages: u32) -> Self {
        Self {
            fetcher,
            state: Arc::new(Mutex::new(CollectionState::new(page_size, max_empty_pages))),
        }
    }

    pub fn from_config(fetcher: F, config: &ClientConfig) -> Self {
        Self::new(fetcher, config.page_size, config.max_empty_pages)
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Merge a partial filter change without fetching. Returns whether the
    /// search, genre or page size changed.
    pub async fn set_filter(&self, patch: FilterPatch) -> bool {
        let mut state = self.state.lock().await;
        let changed = state.set_filter(patch);
        if changed {
            debug!(filter = ?state.filter(), "Filter committed");
        }
        changed
    }

    /// Load the current filter, replacing the snapshot when `reset` is set and
    /// appending otherwise. Dropped while another load is in flight.
    pub async fn load(&self, reset: bool) -> LoadOutcome {
        let mode = if reset { LoadMode::Reset } else { LoadMode::Append };
        let ticket = self.state.lock().await.begin_load(mode);
        self.run(ticket).await
    }

    /// Fetch the page after the current one, if there is one
    pub async fn load_more(&self) -> LoadOutcome {
        let ticket = self.state.lock().await.begin_load_more();
        self.run(ticket).await
    }

    /// Re-run the last failed load with the same parameters
    pub async fn retry(&self) -> LoadOutcome {
        let ticket = self.state.lock().await.begin_retry();
        if ticket.is_some() {
            info!("Retrying last catalog load");
        }
        self.run(ticket).await
    }

    /// Clear the snapshot and filter. Any in-flight response is discarded.
    pub async fn reset(&self) {
        self.state.lock().await.reset();
        debug!("Store reset");
    }

    /// Reset, then load the unfiltered first page
    pub async fn clear_filters(&self) -> LoadOutcome {
        let ticket = {
            let mut state = self.state.lock().await;
            state.reset();
            state.begin_load(LoadMode::Reset)
        };
        self.run(ticket).await
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn filter(&self) -> BookFilter {
        self.state.lock().await.filter().clone()
    }

    pub async fn has_next(&self) -> bool {
        self.state.lock().await.has_next()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.load_state().is_loading()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.items().is_empty()
    }

    async fn run(&self, ticket: Option<LoadTicket>) -> LoadOutcome {
        let Some(ticket) = ticket else {
            return LoadOutcome::Skipped;
        };

        debug!(
            generation = ticket.generation,
            page = ticket.filter.page,
            mode = ?ticket.mode,
            "Fetching catalog page"
        );
        let guard = InFlight {
            state: self.state.clone(),
            ticket: Some(ticket.clone()),
        };
        let result = self.fetcher.fetch_page(&ticket.filter).await;

        let mut state = self.state.lock().await;
        guard.disarm();
        let outcome = state.complete(&ticket, result);
        if outcome == LoadOutcome::Applied {
            debug!(
                items = state.items().len(),
                has_next = state.has_next(),
                "Catalog page applied"
            );
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use mockito::{Matcher, Server};
    use serde_json::json;
    use tokio::sync::Notify;

    use super::*;
    use crate::client::error::FetchError;
    use crate::client::fetcher::MockPagingFetcher;
    use crate::client::http::CatalogClient;
    use crate::client::state::LoadState;
    use crate::client::testing::{book_page, books, ScriptedFetcher};
    use crate::models::Genre;

    #[tokio::test]
    async fn test_load_more_without_next_page_does_not_fetch() {
        let mut fetcher = MockPagingFetcher::new();
        fetcher
            .expect_fetch_page()
            .times(1)
            .returning(|_| Ok(book_page(books(0, 5), 1, 20, 5)));

        let store = CollectionStore::new(fetcher, 20, 3);
        assert_eq!(store.load(true).await, LoadOutcome::Applied);
        assert!(!store.has_next().await);

        assert_eq!(store.load_more().await, LoadOutcome::Skipped);
        assert_eq!(store.snapshot().await.items.len(), 5);
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_request() {
        let gate = Arc::new(Notify::new());
        let store = CollectionStore::new(
            ScriptedFetcher::gated(vec![Ok(book_page(books(0, 20), 1, 20, 45))], gate.clone()),
            20,
            3,
        );

        let (first, second) = tokio::join!(store.load(true), async {
            let outcome = store.load(true).await;
            gate.notify_one();
            outcome
        });

        assert_eq!(first, LoadOutcome::Applied);
        assert_eq!(second, LoadOutcome::Skipped);
        assert_eq!(store.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn test_response_for_superseded_filter_is_dropped() {
        let gate = Arc::new(Notify::new());
        let store = CollectionStore::new(
            ScriptedFetcher::gated(
                vec![
                    Ok(book_page(books(0, 20), 1, 20, 45)),
                    Ok(book_page(books(100, 1), 1, 20, 1)),
                ],
                gate.clone(),
            ),
            20,
            3,
        );

        let (outcome, _) = tokio::join!(store.load(true), async {
            assert!(store.set_filter(FilterPatch::search("dune")).await);
            gate.notify_one();
        });

        assert_eq!(outcome, LoadOutcome::Discarded);
        let snapshot = store.snapshot().await;
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.load_state, LoadState::Idle);
        assert_eq!(snapshot.filter.search.as_deref(), Some("dune"));

        gate.notify_one();
        assert_eq!(store.load(true).await, LoadOutcome::Applied);
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].id(), "100");
        assert_eq!(store.fetcher().seen()[1].search.as_deref(), Some("dune"));
    }

    #[tokio::test]
    async fn test_three_pages_accumulate() {
        let store = CollectionStore::new(
            ScriptedFetcher::new(vec![
                Ok(book_page(books(0, 20), 1, 20, 45)),
                Ok(book_page(books(20, 20), 2, 20, 45)),
                Ok(book_page(books(40, 5), 3, 20, 45)),
            ]),
            20,
            3,
        );

        for _ in 0..3 {
            assert_eq!(store.load_more().await, LoadOutcome::Applied);
        }

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.items.len(), 45);
        assert!(!snapshot.has_next);
        let pages: Vec<u32> = store.fetcher().seen().iter().map(|f| f.page).collect();
        assert_eq!(pages, vec![1, 2, 3]);

        assert_eq!(store.load_more().await, LoadOutcome::Skipped);
        assert_eq!(store.fetcher().calls(), 3);
    }

    fn http_store(server: &Server) -> CollectionStore<CatalogClient> {
        let client = CatalogClient::with_base_url(&server.url(), 100, Duration::from_secs(5)).unwrap();
        CollectionStore::new(client, 20, 3)
    }

    #[tokio::test]
    async fn test_search_commit_loads_single_match() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/books")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("search".into(), "kings".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": {
                        "items": [{"id": "1", "title": "The Way of Kings"}],
                        "pagination": {"page": 1, "pageSize": 20, "total": 1,
                                       "totalPages": 1, "hasNext": false, "hasPrev": false}
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let store = http_store(&server);
        assert!(store.set_filter(FilterPatch::search("kings")).await);
        assert_eq!(store.load(true).await, LoadOutcome::Applied);

        mock.assert_async().await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].id(), "1");
        assert_eq!(snapshot.items[0].book.title, "The Way of Kings");
        assert_eq!(snapshot.error(), None);
        assert!(!snapshot.has_next);
    }

    #[tokio::test]
    async fn test_server_error_keeps_previous_snapshot() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/books")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": {
                        "items": [{"id": "1"}, {"id": "2"}],
                        "pagination": {"page": 1, "pageSize": 2, "total": 4,
                                       "totalPages": 2, "hasNext": true, "hasPrev": false}
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/books")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(500)
            .create_async()
            .await;

        let store = http_store(&server);
        store.set_filter(FilterPatch { page_size: Some(2), ..Default::default() }).await;
        assert_eq!(store.load(true).await, LoadOutcome::Applied);
        let before = store.snapshot().await;

        let outcome = store.load_more().await;
        assert!(matches!(outcome, LoadOutcome::Failed(_)));

        let after = store.snapshot().await;
        assert!(!after.error().unwrap_or_default().is_empty());
        assert_eq!(after.items, before.items);
        assert_eq!(after.pagination, before.pagination);
    }

    #[tokio::test]
    async fn test_retry_repeats_failed_request() {
        let store = CollectionStore::new(
            ScriptedFetcher::new(vec![
                Ok(book_page(books(0, 20), 1, 20, 45)),
                Err(FetchError::Server { status: 503, message: String::new() }),
                Ok(book_page(books(20, 20), 2, 20, 45)),
            ]),
            20,
            3,
        );
        store
            .set_filter(FilterPatch::genre(Some(Genre::Fantasy)))
            .await;
        store.load(true).await;

        assert!(matches!(store.load_more().await, LoadOutcome::Failed(_)));
        assert_eq!(store.retry().await, LoadOutcome::Applied);
        // Nothing failed any more
        assert_eq!(store.retry().await, LoadOutcome::Skipped);

        let seen = store.fetcher().seen();
        assert_eq!(seen[1], seen[2]);
        assert_eq!(seen[2].page, 2);
        assert_eq!(seen[2].genre, Some(Genre::Fantasy));
        assert_eq!(store.snapshot().await.items.len(), 40);
    }

    #[tokio::test]
    async fn test_clear_filters_is_idempotent() {
        let store = CollectionStore::new(
            ScriptedFetcher::new(vec![
                Ok(book_page(books(0, 3), 1, 20, 3)),
                Ok(book_page(books(0, 20), 1, 20, 45)),
                Ok(book_page(books(0, 20), 1, 20, 45)),
            ]),
            20,
            3,
        );
        store.set_filter(FilterPatch::search("kings")).await;
        store.load(true).await;

        assert_eq!(store.clear_filters().await, LoadOutcome::Applied);
        let once = store.snapshot().await;
        assert_eq!(store.clear_filters().await, LoadOutcome::Applied);
        let twice = store.snapshot().await;

        assert_eq!(once, twice);
        assert_eq!(twice.filter, BookFilter::default());
        assert_eq!(twice.items.len(), 20);
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_response() {
        let gate = Arc::new(Notify::new());
        let store = CollectionStore::new(
            ScriptedFetcher::gated(vec![Ok(book_page(books(0, 20), 1, 20, 45))], gate.clone()),
            20,
            3,
        );

        let (outcome, _) = tokio::join!(store.load(true), async {
            store.reset().await;
            gate.notify_one();
        });

        assert_eq!(outcome, LoadOutcome::Discarded);
        assert!(store.is_empty().await);
        assert!(!store.is_loading().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_load_releases_loading_flag() {
        let gate = Arc::new(Notify::new());
        let store = CollectionStore::new(
            ScriptedFetcher::gated(vec![Ok(book_page(books(0, 20), 1, 20, 45))], gate.clone()),
            20,
            3,
        );

        let timed_out = tokio::time::timeout(Duration::from_millis(20), store.load(true)).await;
        assert!(timed_out.is_err());
        assert!(!store.is_loading().await);

        gate.notify_one();
        assert_eq!(store.load(true).await, LoadOutcome::Applied);
        assert_eq!(store.snapshot().await.items.len(), 20);
        assert_eq!(store.fetcher().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_load_more_asks_for_same_page_again() {
        let gate = Arc::new(Notify::new());
        let store = CollectionStore::new(
            ScriptedFetcher::gated(
                vec![
                    Ok(book_page(books(0, 20), 1, 20, 45)),
                    Ok(book_page(books(20, 20), 2, 20, 45)),
                ],
                gate.clone(),
            ),
            20,
            3,
        );
        gate.notify_one();
        assert_eq!(store.load(true).await, LoadOutcome::Applied);

        let timed_out = tokio::time::timeout(Duration::from_millis(20), store.load_more()).await;
        assert!(timed_out.is_err());
        assert!(!store.is_loading().await);

        gate.notify_one();
        assert_eq!(store.load_more().await, LoadOutcome::Applied);
        let pages: Vec<u32> = store.fetcher().seen().iter().map(|f| f.page).collect();
        assert_eq!(pages, vec![1, 2, 2]);
        assert_eq!(store.snapshot().await.items.len(), 40);
    }

    #[tokio::test]
    async fn test_load_more_after_commit_replaces_previous_filter() {
        let store = CollectionStore::new(
            ScriptedFetcher::new(vec![
                Ok(book_page(books(0, 20), 1, 20, 45)),
                Ok(book_page(books(100, 3), 1, 20, 3)),
            ]),
            20,
            3,
        );
        assert_eq!(store.load(true).await, LoadOutcome::Applied);
        assert!(store.set_filter(FilterPatch::search("dune")).await);
        assert_eq!(store.load_more().await, LoadOutcome::Applied);

        let seen = store.fetcher().seen();
        assert_eq!(seen.iter().map(|f| f.page).collect::<Vec<_>>(), vec![1, 1]);
        assert_eq!(seen[1].search.as_deref(), Some("dune"));

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.items.len(), 3);
        assert_eq!(snapshot.items[0].id(), "100");
        assert!(!snapshot.has_next);
    }
}
