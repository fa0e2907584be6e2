//! Author endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{ApiResponse, AuthorWithStats},
};

/// List authors, most prolific first
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "Authors with book counts", body = [AuthorWithStats])
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
) -> AppResult<Json<ApiResponse<Vec<AuthorWithStats>>>> {
    let authors = state.services.authors.list_authors().await?;
    Ok(Json(ApiResponse::success(authors, "Authors retrieved successfully")))
}

/// Author details with statistics and books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = String, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorWithStats),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<AuthorWithStats>>> {
    let author = state.services.authors.get_author(&id).await?;
    Ok(Json(ApiResponse::success(author, "Author retrieved successfully")))
}
