use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    models::{MovieDetails, SeriesDetails},
};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/genres", get(handlers::list_genres))
        // Movies
        .route(
            "/movies",
            get(handlers::list_items::<MovieDetails>).post(handlers::create_item::<MovieDetails>),
        )
        .route(
            "/movies/:id",
            get(handlers::get_item::<MovieDetails>)
                .put(handlers::update_item::<MovieDetails>)
                .delete(handlers::delete_item::<MovieDetails>),
        )
        // Series
        .route(
            "/series",
            get(handlers::list_items::<SeriesDetails>)
                .post(handlers::create_item::<SeriesDetails>),
        )
        .route(
            "/series/:id",
            get(handlers::get_item::<SeriesDetails>)
                .put(handlers::update_item::<SeriesDetails>)
                .delete(handlers::delete_item::<SeriesDetails>),
        )
}
