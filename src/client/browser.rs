//! Catalog browser: the search form and the collection store wired together

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use super::error::FetchError;
use super::fetcher::PagingFetcher;
use super::filters::FilterDraft;
use super::http::CatalogClient;
use super::state::LoadOutcome;
use super::store::CollectionStore;
use super::timing::Debouncer;
use crate::config::{ClientConfig, SearchMode};
use crate::models::Genre;

pub struct CatalogBrowser<F> {
    store: Arc<CollectionStore<F>>,
    draft: Arc<Mutex<FilterDraft>>,
    search_mode: SearchMode,
    debouncer: Debouncer,
}

impl CatalogBrowser<CatalogClient> {
    /// Browser talking to the configured catalog endpoint
    pub fn connect(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = CatalogClient::new(config)?;
        Ok(Self::new(client, config))
    }
}

impl<F: PagingFetcher + 'static> CatalogBrowser<F> {
    pub fn new(fetcher: F, config: &ClientConfig) -> Self {
        let store = Arc::new(CollectionStore::from_config(fetcher, config));
        Self::with_store(store, config.search_mode, config.debounce())
    }

    pub fn with_store(
        store: Arc<CollectionStore<F>>,
        search_mode: SearchMode,
        debounce: Duration,
    ) -> Self {
        Self {
            store,
            draft: Arc::new(Mutex::new(FilterDraft::new())),
            search_mode,
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn store(&self) -> &Arc<CollectionStore<F>> {
        &self.store
    }

    pub async fn draft(&self) -> FilterDraft {
        self.draft.lock().await.clone()
    }

    /// Initial load, unless something is already shown or loading
    pub async fn mount(&self) -> LoadOutcome {
        if !self.store.is_empty().await || self.store.is_loading().await {
            return LoadOutcome::Skipped;
        }
        self.store.load(true).await
    }

    /// Update the search box. In debounced mode this also schedules a commit.
    pub async fn edit_search(&mut self, text: impl Into<String>) {
        self.draft.lock().await.set_search_text(text);

        if self.search_mode == SearchMode::Debounced {
            let store = self.store.clone();
            let draft = self.draft.clone();
            self.debouncer.schedule(async move {
                let outcome = commit_and_load(&store, &draft).await;
                debug!(?outcome, "Debounced search");
            });
        }
    }

    /// Commit the typed search text and reload from page 1
    pub async fn search(&mut self) -> LoadOutcome {
        self.debouncer.cancel();
        commit_and_load(&self.store, &self.draft).await
    }

    pub async fn select_genre(&self, genre: Option<Genre>) -> LoadOutcome {
        let patch = self.draft.lock().await.select_genre(genre);
        match patch {
            Some(patch) => {
                self.store.set_filter(patch).await;
                self.store.load(true).await
            }
            None => LoadOutcome::Skipped,
        }
    }

    pub async fn clear_filters(&mut self) -> LoadOutcome {
        self.debouncer.cancel();
        self.draft.lock().await.clear();
        self.store.clear_filters().await
    }

    pub async fn retry(&self) -> LoadOutcome {
        self.store.retry().await
    }

    pub async fn load_more(&self) -> LoadOutcome {
        self.store.load_more().await
    }
}

async fn commit_and_load<F: PagingFetcher>(
    store: &CollectionStore<F>,
    draft: &Mutex<FilterDraft>,
) -> LoadOutcome {
    let patch = draft.lock().await.commit();
    match patch {
        Some(patch) => {
            store.set_filter(patch).await;
            store.load(true).await
        }
        None => LoadOutcome::Skipped,
    }
}
