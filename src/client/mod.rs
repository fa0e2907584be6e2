//! Client core for the catalog listing
//!
//! Holds the filter draft, the incrementally loaded collection store, the
//! paging fetcher and the infinite-scroll trigger. Nothing here renders; a
//! front end drives [`CatalogBrowser`] and reads [`StoreSnapshot`]s.

pub mod browser;
pub mod error;
pub mod fetcher;
pub mod filters;
pub mod http;
pub mod scroll;
pub mod state;
pub mod store;
pub mod timing;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::CatalogBrowser;
pub use error::FetchError;
pub use fetcher::PagingFetcher;
pub use filters::FilterDraft;
pub use http::CatalogClient;
pub use scroll::{InfiniteScroll, ScrollOptions, ScrollPosition, ScrollTrigger, TriggerState};
pub use state::{LoadOutcome, LoadState, StoreSnapshot};
pub use store::CollectionStore;
pub use timing::Debouncer;
