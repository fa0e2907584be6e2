//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfscroll API",
        version = "0.1.0",
        description = "Library catalog REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "Catalog API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::book_details,
        books::genre_stats,
        // Authors
        authors::list_authors,
        authors::get_author,
    ),
    components(
        schemas(
            crate::models::Book,
            crate::models::BookWithAuthor,
            crate::models::BookDetails,
            crate::models::BookQuery,
            crate::models::GenreStats,
            crate::models::Genre,
            crate::models::Author,
            crate::models::AuthorWithStats,
            crate::models::PageMetadata,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog listing and book details"),
        (name = "authors", description = "Authors and their statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
