//! Book (catalog) endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{ApiResponse, BookDetails, BookQuery, BookWithAuthor, GenreStats, Page},
};

/// List books with filtering and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Page of books, wrapped in the response envelope", body = Page<BookWithAuthor>),
        (status = 400, description = "Invalid query parameters", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<ApiResponse<Page<BookWithAuthor>>>> {
    let page = state.services.catalog.list_books(&query).await?;
    Ok(Json(ApiResponse::success(page, "Books retrieved successfully")))
}

/// Book details with author statistics
#[utoipa::path(
    get,
    path = "/books/details/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book and author details", body = BookDetails),
        (status = 404, description = "Book or author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn book_details(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<BookDetails>>> {
    let details = state.services.catalog.book_details(&id).await?;
    Ok(Json(ApiResponse::success(details, "Book details retrieved successfully")))
}

/// Book counts and average publication year per genre
#[utoipa::path(
    get,
    path = "/books/genre-stats",
    tag = "books",
    responses(
        (status = 200, description = "Genre statistics, largest genre first", body = [GenreStats])
    )
)]
pub async fn genre_stats(
    State(state): State<crate::AppState>,
) -> AppResult<Json<ApiResponse<Vec<GenreStats>>>> {
    let stats = state.services.catalog.genre_stats().await?;
    Ok(Json(ApiResponse::success(stats, "Genre statistics retrieved successfully")))
}
