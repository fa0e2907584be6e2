//! Filter draft held by the search form
//!
//! Search text is edited freely and only becomes part of the committed filter
//! on [`FilterDraft::commit`]. A genre selection takes effect at once.

use crate::models::{filter::normalize_search, BookFilter, FilterPatch, Genre};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterDraft {
    search_text: String,
    genre: Option<Genre>,
    committed_search: Option<String>,
    committed_genre: Option<Genre>,
}

impl FilterDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn genre(&self) -> Option<Genre> {
        self.genre
    }

    pub fn committed_search(&self) -> Option<&str> {
        self.committed_search.as_deref()
    }

    /// Whether the typed text differs from what was last committed
    pub fn is_dirty(&self) -> bool {
        normalize_search(&self.search_text) != self.committed_search
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Select a genre. The returned patch must be sent to the store right away;
    /// `None` when the selection is unchanged.
    pub fn select_genre(&mut self, genre: Option<Genre>) -> Option<FilterPatch> {
        self.genre = genre;
        if genre == self.committed_genre {
            return None;
        }
        self.committed_genre = genre;
        Some(FilterPatch::genre(genre))
    }

    /// Commit the typed text. `None` when nothing would change.
    pub fn commit(&mut self) -> Option<FilterPatch> {
        let search = normalize_search(&self.search_text);
        if search == self.committed_search {
            return None;
        }
        self.committed_search = search.clone();
        Some(FilterPatch {
            search: Some(search),
            ..Default::default()
        })
    }

    /// Back to an empty draft with nothing committed
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Adopt a filter committed elsewhere, e.g. after the store was reset
    pub fn sync_from(&mut self, filter: &BookFilter) {
        self.committed_search = filter.search.clone();
        self.committed_genre = filter.genre;
        self.search_text = filter.search.clone().unwrap_or_default();
        self.genre = filter.genre;
    }
}
