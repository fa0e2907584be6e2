//! Collection state and its transitions.
//!
//! `CollectionState` is the only place the snapshot, filter and load flags
//! change. Each operation is a named transition; the async store in
//! [`super::store`] sequences them around fetcher calls and never mutates the
//! state directly.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::error::FetchError;
use crate::models::{BookFilter, BookWithAuthor, FilterPatch, Page, PageMetadata};

/// What the store is doing. The two loading variants are mutually exclusive
/// by construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    InitialLoading,
    LoadingMore,
    Error(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::InitialLoading | LoadState::LoadingMore)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Replace the snapshot
    Reset,
    /// Append to the snapshot
    Append,
}

/// A request handed out by [`CollectionState::begin_load`]. The result must be
/// fed back through [`CollectionState::complete`] with the same ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub filter: BookFilter,
    pub mode: LoadMode,
}

/// Result of a store operation. Errors are reported here and in
/// [`LoadState::Error`], never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Response applied to the snapshot
    Applied,
    /// Nothing requested: a load was in flight, or there is nothing more to load
    Skipped,
    /// Response belonged to a superseded filter and was dropped
    Discarded,
    /// Request failed; the message is also in the load state
    Failed(String),
}

/// Read-only copy of the store for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub items: Vec<BookWithAuthor>,
    pub filter: BookFilter,
    pub pagination: Option<PageMetadata>,
    pub has_next: bool,
    pub load_state: LoadState,
}

impl StoreSnapshot {
    pub fn error(&self) -> Option<&str> {
        self.load_state.error()
    }
}

#[derive(Debug, Clone)]
pub struct CollectionState {
    items: Vec<BookWithAuthor>,
    filter: BookFilter,
    default_filter: BookFilter,
    pagination: Option<PageMetadata>,
    has_next: bool,
    load_state: LoadState,
    /// Bumped by every filter commit and reset; tickets from older
    /// generations are stale.
    generation: u64,
    /// Generation the snapshot's items belong to
    loaded_generation: Option<u64>,
    last_attempt: Option<LoadTicket>,
    empty_pages: u32,
    max_empty_pages: u32,
}

impl CollectionState {
    pub fn new(page_size: u32, max_empty_pages: u32) -> Self {
        let default_filter = BookFilter::with_page_size(page_size);
        Self {
            items: Vec::new(),
            filter: default_filter.clone(),
            default_filter,
            pagination: None,
            has_next: true,
            load_state: LoadState::Idle,
            generation: 0,
            loaded_generation: None,
            last_attempt: None,
            empty_pages: 0,
            max_empty_pages: max_empty_pages.max(1),
        }
    }

    pub fn items(&self) -> &[BookWithAuthor] {
        &self.items
    }

    pub fn filter(&self) -> &BookFilter {
        &self.filter
    }

    pub fn pagination(&self) -> Option<&PageMetadata> {
        self.pagination.as_ref()
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            items: self.items.clone(),
            filter: self.filter.clone(),
            pagination: self.pagination,
            has_next: self.has_next,
            load_state: self.load_state.clone(),
        }
    }

    /// Merge a partial filter change; never fetches. Returns whether a new
    /// generation started.
    ///
    /// A search, genre or page size change starts a new generation from page
    /// 1. The next load replaces the snapshot, and the in-flight flag of the
    /// superseded request is released so the new filter can load at once.
    pub fn set_filter(&mut self, patch: FilterPatch) -> bool {
        let page_size = self.filter.page_size;
        let mut changed = self.filter.apply(patch);
        if self.filter.page_size != page_size {
            self.filter.page = 1;
            changed = true;
        }
        if changed {
            self.generation += 1;
            self.has_next = true;
            self.empty_pages = 0;
            if self.load_state.is_loading() {
                debug!(generation = self.generation, "Filter committed over an in-flight load");
                self.load_state = LoadState::Idle;
            }
        }
        changed
    }

    /// Whether the snapshot holds a page of the current generation
    fn loaded_current(&self) -> bool {
        self.loaded_generation == Some(self.generation)
    }

    /// Start a load for the current filter, or `None` if one is in flight.
    /// A reset load always starts from page 1.
    pub fn begin_load(&mut self, mode: LoadMode) -> Option<LoadTicket> {
        if self.load_state.is_loading() {
            return None;
        }
        if mode == LoadMode::Reset {
            self.filter.page = 1;
        }
        self.issue(mode, self.filter.clone())
    }

    /// Start loading the page after the current one.
    ///
    /// Before anything has loaded for this generation the current page itself
    /// is requested.
    pub fn begin_load_more(&mut self) -> Option<LoadTicket> {
        if !self.has_next || self.load_state.is_loading() {
            return None;
        }
        if self.loaded_current() {
            self.filter.page += 1;
        }
        self.begin_load(LoadMode::Append)
    }

    /// Re-issue the last failed request with identical parameters
    pub fn begin_retry(&mut self) -> Option<LoadTicket> {
        if self.load_state.error().is_none() {
            return None;
        }
        let ticket = self.last_attempt.clone()?;
        if ticket.generation != self.generation {
            return None;
        }
        self.filter.page = ticket.filter.page;
        self.issue(ticket.mode, ticket.filter)
    }

    fn issue(&mut self, mode: LoadMode, filter: BookFilter) -> Option<LoadTicket> {
        if self.load_state.is_loading() {
            return None;
        }
        self.load_state = match mode {
            LoadMode::Reset => LoadState::InitialLoading,
            LoadMode::Append => LoadState::LoadingMore,
        };
        let ticket = LoadTicket {
            generation: self.generation,
            filter,
            mode,
        };
        self.last_attempt = Some(ticket.clone());
        Some(ticket)
    }

    /// Apply the result of a ticket's request
    pub fn complete(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Page<BookWithAuthor>, FetchError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "{}",
                FetchError::StaleResponseDiscarded
            );
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                self.apply_page(ticket, page);
                LoadOutcome::Applied
            }
            Err(FetchError::StaleResponseDiscarded) => LoadOutcome::Discarded,
            Err(e) => {
                let message = e.user_message();
                debug!(error = %e, "Catalog load failed");
                self.rewind(ticket);
                self.load_state = LoadState::Error(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    /// The request behind `ticket` was dropped before it completed. Releases
    /// the in-flight flag if the ticket is still the current one.
    pub fn abandon(&mut self, ticket: &LoadTicket) -> bool {
        let current = ticket.generation == self.generation
            && self.load_state.is_loading()
            && self.last_attempt.as_ref() == Some(ticket);
        if current {
            debug!(generation = ticket.generation, page = ticket.filter.page, "Catalog load abandoned");
            self.rewind(ticket);
            self.load_state = LoadState::Idle;
        }
        current
    }

    /// After an unfinished append the next load_more asks for the same page
    fn rewind(&mut self, ticket: &LoadTicket) {
        if ticket.mode == LoadMode::Append && self.loaded_current() {
            self.filter.page = ticket.filter.page.saturating_sub(1).max(1);
        }
    }

    fn apply_page(&mut self, ticket: &LoadTicket, page: Page<BookWithAuthor>) {
        let Page { items, pagination } = page;
        let received = items.len();

        if ticket.mode == LoadMode::Reset || !self.loaded_current() {
            self.items.clear();
        }
        let mut seen: HashSet<String> = self.items.iter().map(|b| b.book.id.clone()).collect();
        for item in items {
            if seen.insert(item.book.id.clone()) {
                self.items.push(item);
            } else {
                debug!(id = %item.book.id, "Dropping duplicate item");
            }
        }

        if received == 0 && pagination.has_next {
            self.empty_pages += 1;
        } else {
            self.empty_pages = 0;
        }

        self.has_next = pagination.has_next;
        if self.has_next && self.empty_pages >= self.max_empty_pages {
            warn!(
                empty_pages = self.empty_pages,
                page = pagination.page,
                "Endpoint keeps reporting more pages without items, stopping"
            );
            self.has_next = false;
        }

        self.filter.page = ticket.filter.page;
        self.pagination = Some(pagination);
        self.loaded_generation = Some(self.generation);
        self.load_state = LoadState::Idle;
    }

    /// Back to an empty snapshot and the default filter, whatever is in flight
    pub fn reset(&mut self) {
        self.items.clear();
        self.filter = self.default_filter.clone();
        self.pagination = None;
        self.has_next = true;
        self.load_state = LoadState::Idle;
        self.generation += 1;
        self.loaded_generation = None;
        self.last_attempt = None;
        self.empty_pages = 0;
    }
}
