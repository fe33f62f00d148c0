pub mod routes;

use async_trait::async_trait;
use axum::{routing::get, Router};
use lectern_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::catalog::{schema, CatalogRepository, RankingEngine};

/// State shared by the `/books` handlers
#[derive(Clone)]
pub struct BooksState {
    pub catalog: CatalogRepository,
    pub ranking: RankingEngine,
}

/// Books module: CRUD over the catalog plus the rating leaderboard
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(catalog: CatalogRepository, ranking: RankingEngine) -> Self {
        Self {
            state: BooksState { catalog, ranking },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        schema::BOOKS_MODULE
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list_books).post(routes::add_book))
            .route("/top", get(routes::top_books))
            .route(
                "/{id}",
                get(routes::get_book)
                    .put(routes::update_book)
                    .delete(routes::delete_book),
            )
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
            })
        };
        let message = json!({
            "description": "Operation succeeded",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Message" } } }
        });
        let id_param = json!({
            "name": "id", "in": "path", "required": true, "schema": { "type": "integer", "format": "int64" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books, optionally filtered by genre",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "genre", "in": "query", "required": false, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "Books in id order",
                                "content": { "application/json": { "schema": {
                                    "type": "object",
                                    "properties": { "books": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } } }
                                } } }
                            }
                        }
                    },
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewBook" } } }
                        },
                        "responses": {
                            "200": {
                                "description": "Book added",
                                "content": { "application/json": { "schema": {
                                    "type": "object",
                                    "properties": {
                                        "message": { "type": "string" },
                                        "book_id": { "type": "integer", "format": "int64" }
                                    }
                                } } }
                            },
                            "400": error("Missing or empty title")
                        }
                    }
                },
                "/top": {
                    "get": {
                        "summary": "Books ranked by summed review rating",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "limit", "in": "query", "required": false, "schema": { "type": "integer", "minimum": 1, "default": 5 } }
                        ],
                        "responses": {
                            "200": {
                                "description": "Ranked books, unrated books last",
                                "content": { "application/json": { "schema": {
                                    "type": "object",
                                    "properties": { "top_books": { "type": "array", "items": { "$ref": "#/components/schemas/RankedBook" } } }
                                } } }
                            },
                            "404": error("No book has a rated review")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": { "application/json": { "schema": {
                                    "type": "object",
                                    "properties": { "book": { "$ref": "#/components/schemas/Book" } }
                                } } }
                            },
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update the supplied fields of a book",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookPatch" } } }
                        },
                        "responses": {
                            "200": message.clone(),
                            "400": error("Empty title"),
                            "404": error("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book and its reviews",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "200": message,
                            "404": error("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "author": { "type": ["string", "null"] },
                            "summary": { "type": ["string", "null"] },
                            "genre": { "type": ["string", "null"] }
                        },
                        "required": ["id", "title"]
                    },
                    "NewBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "summary": { "type": "string" },
                            "genre": { "type": "string" }
                        },
                        "required": ["title"]
                    },
                    "BookPatch": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "summary": { "type": "string" },
                            "genre": { "type": "string" }
                        }
                    },
                    "RankedBook": {
                        "allOf": [
                            { "$ref": "#/components/schemas/Book" },
                            {
                                "type": "object",
                                "properties": { "total_rating": { "type": ["integer", "null"], "format": "int64" } }
                            }
                        ]
                    },
                    "Message": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } },
                        "required": ["message"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        schema::books_migrations()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(
    catalog: CatalogRepository,
    ranking: RankingEngine,
) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(catalog, ranking))
}
