//! Data models for the catalog

pub mod author;
pub mod book;
pub mod enums;
pub mod filter;
pub mod pagination;

// Re-export commonly used types
pub use author::{Author, AuthorWithStats};
pub use book::{Book, BookDetails, BookQuery, BookWithAuthor, GenreStats};
pub use enums::{Genre, UnknownGenre};
pub use filter::{BookFilter, FilterPatch};
pub use pagination::{ApiResponse, Page, PageMetadata};
