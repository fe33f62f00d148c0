pub mod client;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use lectern_http::AppError;
use lectern_kernel::Module;
use lectern_telemetry::observe;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub use client::{AuthorSummaryClient, AuthorSummaryError, RestSummaryClient};

use crate::modules::query_params;

impl From<AuthorSummaryError> for AppError {
    fn from(err: AuthorSummaryError) -> Self {
        AppError::external_service(format!("failed to retrieve author summary: {err}"))
    }
}

/// Author module: short biographies from the external summary service
pub struct AuthorModule {
    summaries: Arc<dyn AuthorSummaryClient>,
}

impl AuthorModule {
    pub fn new(summaries: Arc<dyn AuthorSummaryClient>) -> Self {
        Self { summaries }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthorQuery {
    pub author_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorSummaryResponse {
    pub author_summary: String,
}

#[async_trait]
impl Module for AuthorModule {
    fn name(&self) -> &'static str {
        "author"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(author_summary))
            .with_state(self.summaries.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
            })
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Short biography of an author",
                        "tags": ["Authors"],
                        "parameters": [
                            { "name": "author_name", "in": "query", "required": true, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "Author summary",
                                "content": { "application/json": { "schema": {
                                    "type": "object",
                                    "properties": { "author_summary": { "type": "string" } },
                                    "required": ["author_summary"]
                                } } }
                            },
                            "400": error("Missing author_name"),
                            "502": error("Summary service failed")
                        }
                    }
                }
            }
        }))
    }
}

/// GET /author?author_name=
async fn author_summary(
    State(summaries): State<Arc<dyn AuthorSummaryClient>>,
    query: Result<Query<AuthorQuery>, QueryRejection>,
) -> Result<Json<AuthorSummaryResponse>, AppError> {
    let Query(query) = query_params(query)?;
    let author_name = query
        .author_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            AppError::validation(
                vec![json!({ "field": "author_name", "error": "required" })],
                "missing author_name parameter",
            )
        })?;

    let author_summary = observe("author.summary", summaries.fetch_summary(&author_name)).await?;
    Ok(Json(AuthorSummaryResponse { author_summary }))
}

/// Create a new instance of the author module
pub fn create_module(summaries: Arc<dyn AuthorSummaryClient>) -> Arc<dyn Module> {
    Arc::new(AuthorModule::new(summaries))
}
