pub mod author;
pub mod books;
pub mod reviews;

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};
use lectern_http::AppError;
use lectern_kernel::ModuleRegistry;
use serde::Serialize;

use crate::catalog::{CatalogRepository, RankingEngine};
use author::AuthorSummaryClient;

/// Collaborators the modules are constructed with
#[derive(Clone)]
pub struct Services {
    pub catalog: CatalogRepository,
    pub ranking: RankingEngine,
    pub summaries: Arc<dyn AuthorSummaryClient>,
}

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, services: &Services) {
    registry.register(books::create_module(
        services.catalog.clone(),
        services.ranking.clone(),
    ));
    registry.register(reviews::create_module(services.catalog.clone()));
    registry.register(author::create_module(services.summaries.clone()));
}

/// Body of mutations that only report success
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Turn a JSON extraction failure into the standard error envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<Json<T>, AppError> {
    payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

/// Turn a query-string extraction failure into the standard error envelope.
pub(crate) fn query_params<T>(
    query: Result<Query<T>, QueryRejection>,
) -> Result<Query<T>, AppError> {
    query.map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

/// Turn a path-parameter extraction failure into the standard error envelope.
pub(crate) fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<Path<T>, AppError> {
    path.map_err(|rejection| AppError::bad_request(rejection.body_text()))
}
