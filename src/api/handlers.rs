use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::{AppState, Caller};
use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, Genre, ItemDetails, ItemId, ItemInput},
    services::{CatalogService, GenreCatalog, ListParams},
};

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// List the genre taxonomy
pub async fn list_genres(State(genres): State<GenreCatalog>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(genres.list_all().await?))
}

/// List the caller's items, filtered by `title` / `genre` and ordered by `sort`
pub async fn list_items<D>(
    State(service): State<CatalogService<D>>,
    caller: Caller,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<CatalogItem<D>>>>
where
    D: ItemDetails,
    CatalogService<D>: FromRef<AppState>,
{
    let items = service.list(caller.username(), &params).await?;
    Ok(Json(items))
}

/// Fetch a single item by id
pub async fn get_item<D>(
    State(service): State<CatalogService<D>>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<CatalogItem<D>>>
where
    D: ItemDetails,
    CatalogService<D>: FromRef<AppState>,
{
    service
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound { kind: D::KIND, id })
}

/// Create an item owned by the caller
pub async fn create_item<D>(
    State(service): State<CatalogService<D>>,
    caller: Caller,
    Json(input): Json<ItemInput<D>>,
) -> AppResult<(StatusCode, Json<CatalogItem<D>>)>
where
    D: ItemDetails,
    CatalogService<D>: FromRef<AppState>,
{
    let item = service.create(caller.username(), input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Replace an item's fields
pub async fn update_item<D>(
    State(service): State<CatalogService<D>>,
    caller: Caller,
    Path(id): Path<ItemId>,
    Json(input): Json<ItemInput<D>>,
) -> AppResult<Json<CatalogItem<D>>>
where
    D: ItemDetails,
    CatalogService<D>: FromRef<AppState>,
{
    let item = service.update(caller.username(), id, input).await?;
    Ok(Json(item))
}

/// Delete an item
pub async fn delete_item<D>(
    State(service): State<CatalogService<D>>,
    caller: Caller,
    Path(id): Path<ItemId>,
) -> AppResult<StatusCode>
where
    D: ItemDetails,
    CatalogService<D>: FromRef<AppState>,
{
    service.delete(caller.username(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
