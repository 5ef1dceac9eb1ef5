use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CatalogStore, GenreStore, ItemQuery, UserDirectory};
use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, Genre, GenreId, ItemDetails, ItemId, NewItem, User, DEFAULT_GENRES},
    services::sort::OrderRule,
};

/// In-memory genre taxonomy and user directory
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    genres: Vec<Genre>,
    users: HashMap<String, User>,
}

impl MemoryStore {
    /// Creates an empty store with no genres and no users
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the default genre taxonomy, ids starting at 1
    pub async fn with_default_genres() -> Self {
        let store = Self::new();
        for name in DEFAULT_GENRES {
            store.add_genre(name).await;
        }
        store
    }

    /// Adds a genre unless one with the same name already exists
    pub async fn add_genre(&self, name: &str) -> Genre {
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner.genres.iter().find(|g| g.name == name) {
            return existing.clone();
        }

        let genre = Genre::new(inner.genres.len() as GenreId + 1, name);
        inner.genres.push(genre.clone());
        genre
    }

    /// Registers a user, returning the existing record if the username is taken
    pub async fn register_user(&self, username: &str) -> User {
        let mut inner = self.inner.write().await;
        let next_id = inner.users.len() as i64 + 1;

        inner
            .users
            .entry(username.to_string())
            .or_insert_with(|| User::new(next_id, username))
            .clone()
    }

    pub async fn genre_named(&self, name: &str) -> Option<Genre> {
        let inner = self.inner.read().await;
        inner.genres.iter().find(|g| g.name == name).cloned()
    }
}

#[async_trait]
impl GenreStore for MemoryStore {
    async fn find_by_ids(&self, ids: &[GenreId]) -> AppResult<Vec<Genre>> {
        let inner = self.inner.read().await;
        Ok(inner
            .genres
            .iter()
            .filter(|genre| ids.contains(&genre.id))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> AppResult<Vec<Genre>> {
        let inner = self.inner.read().await;
        Ok(inner.genres.clone())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(username).cloned())
    }
}

/// In-memory store for one kind of catalog item.
///
/// Items are kept in id order, so equal titles list in insertion order.
pub struct MemoryCatalogStore<D> {
    inner: Arc<RwLock<MemoryCatalogInner<D>>>,
    _kind: PhantomData<D>,
}

struct MemoryCatalogInner<D> {
    items: BTreeMap<ItemId, CatalogItem<D>>,
    next_id: ItemId,
}

impl<D> Clone for MemoryCatalogStore<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _kind: PhantomData,
        }
    }
}

impl<D> Default for MemoryCatalogStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> MemoryCatalogStore<D> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryCatalogInner {
                items: BTreeMap::new(),
                next_id: 1,
            })),
            _kind: PhantomData,
        }
    }
}

fn query_matches<D: ItemDetails>(item: &CatalogItem<D>, query: &ItemQuery) -> bool {
    if let Some(owner) = query.owner {
        if item.owner.as_ref().map(|o| o.id) != Some(owner) {
            return false;
        }
    }

    if let Some(name) = &query.genre_name {
        if !item.has_genre_named(name) {
            return false;
        }
    }

    if let Some(fragment) = &query.title_contains {
        if !item
            .title
            .to_lowercase()
            .contains(&fragment.to_lowercase())
        {
            return false;
        }
    }

    true
}

#[async_trait]
impl<D: ItemDetails> CatalogStore<D> for MemoryCatalogStore<D> {
    async fn find_by_id(&self, id: ItemId) -> AppResult<Option<CatalogItem<D>>> {
        let inner = self.inner.read().await;
        Ok(inner.items.get(&id).cloned())
    }

    async fn find_matching(
        &self,
        query: &ItemQuery,
        order: OrderRule,
    ) -> AppResult<Vec<CatalogItem<D>>> {
        let inner = self.inner.read().await;
        let mut items: Vec<CatalogItem<D>> = inner
            .items
            .values()
            .filter(|item| query_matches(item, query))
            .cloned()
            .collect();

        order.sort(&mut items);
        Ok(items)
    }

    async fn insert(&self, item: NewItem<D>) -> AppResult<CatalogItem<D>> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let item = item.with_id(id);
        inner.items.insert(id, item.clone());
        Ok(item)
    }

    async fn save(&self, item: &CatalogItem<D>) -> AppResult<CatalogItem<D>> {
        let mut inner = self.inner.write().await;
        match inner.items.get_mut(&item.id) {
            Some(stored) => {
                *stored = item.clone();
                Ok(item.clone())
            }
            None => Err(AppError::NotFound {
                kind: D::KIND,
                id: item.id,
            }),
        }
    }

    async fn delete(&self, id: ItemId) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound { kind: D::KIND, id })
    }
}
