use async_trait::async_trait;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::get,
    Json, Router,
};
use lectern_http::AppError;
use lectern_kernel::{Migration, Module};
use lectern_telemetry::observe;
use serde::Serialize;
use serde_json::json;

use crate::catalog::{schema, BookId, CatalogRepository, NewReview, Review, ReviewId};
use crate::modules::{json_body, path_param};

/// Reviews module: reader reviews attached to books
pub struct ReviewsModule {
    catalog: CatalogRepository,
}

impl ReviewsModule {
    pub fn new(catalog: CatalogRepository) -> Self {
        Self { catalog }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct ReviewCreatedResponse {
    pub message: &'static str,
    pub review_id: ReviewId,
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        schema::REVIEWS_MODULE
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_reviews).post(add_review))
            .route("/{book_id}", get(reviews_for_book))
            .with_state(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let reviews = json!({
            "description": "Reviews in id order",
            "content": { "application/json": { "schema": {
                "type": "object",
                "properties": { "reviews": { "type": "array", "items": { "$ref": "#/components/schemas/Review" } } }
            } } }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List all reviews",
                        "tags": ["Reviews"],
                        "responses": { "200": reviews.clone() }
                    },
                    "post": {
                        "summary": "Add a review to an existing book",
                        "tags": ["Reviews"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewReview" } } }
                        },
                        "responses": {
                            "200": {
                                "description": "Review added",
                                "content": { "application/json": { "schema": {
                                    "type": "object",
                                    "properties": {
                                        "message": { "type": "string" },
                                        "review_id": { "type": "integer", "format": "int64" }
                                    }
                                } } }
                            },
                            "400": {
                                "description": "Missing or unknown book_id",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
                            }
                        }
                    }
                },
                "/{book_id}": {
                    "get": {
                        "summary": "List the reviews of one book",
                        "tags": ["Reviews"],
                        "parameters": [
                            { "name": "book_id", "in": "path", "required": true, "schema": { "type": "integer", "format": "int64" } }
                        ],
                        "responses": { "200": reviews }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Review": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "book_id": { "type": "integer", "format": "int64" },
                            "user": { "type": ["string", "null"] },
                            "rating": { "type": ["integer", "null"], "format": "int32" },
                            "review_text": { "type": ["string", "null"] }
                        },
                        "required": ["id", "book_id"]
                    },
                    "NewReview": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "integer", "format": "int64" },
                            "user": { "type": "string" },
                            "rating": { "type": "integer", "format": "int32" },
                            "review_text": { "type": "string" }
                        },
                        "required": ["book_id"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        schema::reviews_migrations()
    }
}

/// GET /reviews
async fn list_reviews(
    State(catalog): State<CatalogRepository>,
) -> Result<Json<ReviewsResponse>, AppError> {
    let reviews = observe("reviews.list", catalog.list_reviews(None)).await?;
    Ok(Json(ReviewsResponse { reviews }))
}

/// GET /reviews/{book_id}
async fn reviews_for_book(
    State(catalog): State<CatalogRepository>,
    book_id: Result<Path<BookId>, PathRejection>,
) -> Result<Json<ReviewsResponse>, AppError> {
    let Path(book_id) = path_param(book_id)?;
    let reviews = observe("reviews.for_book", catalog.list_reviews(Some(book_id))).await?;
    Ok(Json(ReviewsResponse { reviews }))
}

/// POST /reviews
async fn add_review(
    State(catalog): State<CatalogRepository>,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> Result<Json<ReviewCreatedResponse>, AppError> {
    let Json(new_review) = json_body(payload)?;

    let review = observe("reviews.create", catalog.create_review(new_review)).await?;
    Ok(Json(ReviewCreatedResponse {
        message: "Review added successfully",
        review_id: review.id,
    }))
}

/// Create a new instance of the reviews module
pub fn create_module(catalog: CatalogRepository) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(ReviewsModule::new(catalog))
}
