use serde::Deserialize;
use std::sync::Arc;

use super::genre_catalog::GenreCatalog;
use super::ownership::{Action, OwnershipPolicy};
use super::sort::SortSpec;
use crate::{
    db::{CatalogStore, ItemQuery},
    error::{AppError, AppResult},
    models::{CatalogItem, ItemDetails, ItemId, ItemInput, MovieDetails, NewItem, SeriesDetails},
};

/// Listing parameters as supplied by the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Exact genre name
    pub genre: Option<String>,
    /// `desc` for descending title order, anything else ascending
    pub sort: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_owned)
}

/// List/get/create/update/delete for one kind of catalog item.
///
/// Combines the item store, the genre taxonomy and the ownership policy.
/// Every call goes straight to the store; nothing is cached between calls.
pub struct CatalogService<D: ItemDetails> {
    store: Arc<dyn CatalogStore<D>>,
    genres: GenreCatalog,
    policy: OwnershipPolicy,
}

pub type MovieCatalogService = CatalogService<MovieDetails>;
pub type SeriesCatalogService = CatalogService<SeriesDetails>;

impl<D: ItemDetails> Clone for CatalogService<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            genres: self.genres.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl<D: ItemDetails> CatalogService<D> {
    pub fn new(
        store: Arc<dyn CatalogStore<D>>,
        genres: GenreCatalog,
        policy: OwnershipPolicy,
    ) -> Self {
        Self {
            store,
            genres,
            policy,
        }
    }

    /// Lists items visible to the caller, filtered and ordered by title.
    ///
    /// In owner-scoped mode only the caller's own items are returned.
    pub async fn list(
        &self,
        caller: Option<&str>,
        params: &ListParams,
    ) -> AppResult<Vec<CatalogItem<D>>> {
        let owner = self.policy.resolve_caller(caller).await?;
        let order = SortSpec::build(params.sort.as_deref());

        let query = ItemQuery {
            owner: owner.as_ref().map(|user| user.id),
            title_contains: non_empty(&params.title),
            genre_name: non_empty(&params.genre),
        };

        let items = self.store.find_matching(&query, order).await?;

        tracing::debug!(
            kind = %D::KIND,
            owner = ?owner.as_ref().map(|user| user.username.as_str()),
            genre = ?query.genre_name,
            title = ?query.title_contains,
            count = items.len(),
            "Listed catalog items"
        );

        Ok(items)
    }

    /// Fetches any item by id, regardless of who owns it
    pub async fn get_by_id(&self, id: ItemId) -> AppResult<Option<CatalogItem<D>>> {
        self.store.find_by_id(id).await
    }

    /// Creates an item, binding the caller as owner in owner-scoped mode
    pub async fn create(
        &self,
        caller: Option<&str>,
        input: ItemInput<D>,
    ) -> AppResult<CatalogItem<D>> {
        validate(&input)?;

        let owner = self.policy.resolve_caller(caller).await?;
        let genres = self.genres.resolve(&input.genre_ids()).await?;

        let item = self
            .store
            .insert(NewItem::from_input(input, genres, owner))
            .await?;

        tracing::info!(
            kind = %D::KIND,
            item_id = item.id,
            owner = ?item.owner_username(),
            genre_count = item.genres.len(),
            "Created catalog item"
        );

        Ok(item)
    }

    /// Rewrites an existing item.
    ///
    /// The genre set is resolved before anything is written and replaces the
    /// old one wholesale. A missing status keeps the stored one.
    pub async fn update(
        &self,
        caller: Option<&str>,
        id: ItemId,
        input: ItemInput<D>,
    ) -> AppResult<CatalogItem<D>> {
        let mut item = self.load(id).await?;
        self.policy.authorize(&item, caller, Action::Update)?;
        validate(&input)?;

        let genres = self.genres.resolve(&input.genre_ids()).await?;
        item.apply(input, genres);

        let item = self.store.save(&item).await?;

        tracing::info!(
            kind = %D::KIND,
            item_id = item.id,
            status = ?item.status,
            genre_count = item.genres.len(),
            "Updated catalog item"
        );

        Ok(item)
    }

    /// Removes an item permanently
    pub async fn delete(&self, caller: Option<&str>, id: ItemId) -> AppResult<()> {
        let item = self.load(id).await?;
        self.policy.authorize(&item, caller, Action::Delete)?;

        self.store.delete(item.id).await?;

        tracing::info!(kind = %D::KIND, item_id = id, "Deleted catalog item");

        Ok(())
    }

    async fn load(&self, id: ItemId) -> AppResult<CatalogItem<D>> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound { kind: D::KIND, id })
    }
}

fn validate<D>(input: &ItemInput<D>) -> AppResult<()> {
    if input.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()));
    }
    Ok(())
}
