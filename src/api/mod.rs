//! API handlers for the catalog REST endpoints

pub mod authors;
pub mod books;
pub mod health;
pub mod openapi;

use axum::{http::Uri, routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// Catch-all for routes that do not exist
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}

/// Full application router: the catalog under `/api`, Swagger UI, and the
/// JSON 404 fallback
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/books", get(books::list_books))
        .route("/books/genre-stats", get(books::genre_stats))
        .route("/books/details/:id", get(books::book_details))
        .route("/authors", get(authors::list_authors))
        .route("/authors/:id", get(authors::get_author))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(openapi::create_openapi_router())
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
