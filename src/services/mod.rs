//! Business logic services

pub mod authors;
pub mod catalog;

use crate::{config::CatalogConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub authors: authors::AuthorsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, catalog_config: CatalogConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), catalog_config),
            authors: authors::AuthorsService::new(repository),
        }
    }
}
