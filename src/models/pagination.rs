//! Pagination metadata and the JSON response envelope

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Server-reported counts and navigation flags for one page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub page: u32,
    #[serde(alias = "limit")]
    pub page_size: u32,
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

impl PageMetadata {
    pub fn new(page: u32, page_size: u32, total: u64) -> Self {
        let total_pages = total_pages(total, page_size);
        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// `ceil(total / page_size)`
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64) as u32
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Items of this page, in server order
    #[serde(alias = "data")]
    pub items: Vec<T>,
    /// Pagination metadata
    pub pagination: PageMetadata,
}

/// Envelope wrapping every JSON response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }
}
