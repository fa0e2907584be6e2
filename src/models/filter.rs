//! Committed listing filter shared by the listing endpoint and the client store

use serde::{Deserialize, Serialize};

use super::enums::Genre;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const MAX_SEARCH_LEN: usize = 255;

/// Search text as committed: trimmed, with blank input meaning "no search"
pub fn normalize_search(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Filter sent to the listing endpoint.
///
/// `page >= 1` and `page_size >= 1` always hold for filters built through
/// [`BookFilter::apply`]; [`BookFilter::check`] guards the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFilter {
    pub search: Option<String>,
    pub genre: Option<Genre>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for BookFilter {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl BookFilter {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            search: None,
            genre: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Rows to skip for the current page
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.page_size as i64
    }

    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Whether search text or genre differ
    pub fn selection_differs(&self, other: &BookFilter) -> bool {
        self.search != other.search || self.genre != other.genre
    }

    /// Merge a partial change. Returns `true` when search or genre changed,
    /// in which case the page is forced back to 1.
    pub fn apply(&mut self, patch: FilterPatch) -> bool {
        let mut next = self.clone();
        if let Some(search) = patch.search {
            next.search = search.as_deref().and_then(normalize_search);
        }
        if let Some(genre) = patch.genre {
            next.genre = genre;
        }
        if let Some(page_size) = patch.page_size {
            next.page_size = page_size.max(1);
        }

        let changed = next.selection_differs(self);
        next.page = if changed {
            1
        } else {
            patch.page.unwrap_or(self.page).max(1)
        };

        *self = next;
        changed
    }

    /// Bounds checks performed before a filter is used for a query
    pub fn check(&self, max_page_size: u32) -> Result<(), String> {
        if self.page < 1 {
            return Err("Page must be at least 1".to_string());
        }
        if self.page_size < 1 {
            return Err("Page size must be at least 1".to_string());
        }
        if self.page_size > max_page_size {
            return Err(format!("Page size must not exceed {}", max_page_size));
        }
        if let Some(ref search) = self.search {
            if search.chars().count() > MAX_SEARCH_LEN {
                return Err("Search text too long".to_string());
            }
        }
        Ok(())
    }
}

/// Partial filter change. `None` leaves the field as it is; for `search` and
/// `genre`, `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub search: Option<Option<String>>,
    pub genre: Option<Option<Genre>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl FilterPatch {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(Some(text.into())),
            ..Default::default()
        }
    }

    pub fn genre(genre: Option<Genre>) -> Self {
        Self {
            genre: Some(genre),
            ..Default::default()
        }
    }

    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }
}
