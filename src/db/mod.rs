use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{CatalogItem, Genre, GenreId, ItemDetails, ItemId, NewItem, User, UserId},
    services::sort::OrderRule,
};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCatalogStore, MemoryStore};
pub use postgres::{create_pool, run_migrations, PgCatalogStore, PgStore};

/// Filters for a catalog listing. Every `None` matches all items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    /// Only items owned by this user
    pub owner: Option<UserId>,
    /// Only items whose title contains this text, ignoring case
    pub title_contains: Option<String>,
    /// Only items tagged with a genre of exactly this name
    pub genre_name: Option<String>,
}

/// Persistence port for one kind of catalog item
#[async_trait]
pub trait CatalogStore<D: ItemDetails>: Send + Sync {
    async fn find_by_id(&self, id: ItemId) -> AppResult<Option<CatalogItem<D>>>;

    /// Items matching `query`, ordered by `order`
    async fn find_matching(
        &self,
        query: &ItemQuery,
        order: OrderRule,
    ) -> AppResult<Vec<CatalogItem<D>>>;

    /// Stores a new item together with its genre links and returns it with
    /// its assigned id
    async fn insert(&self, item: NewItem<D>) -> AppResult<CatalogItem<D>>;

    /// Rewrites an existing item and replaces its genre links
    async fn save(&self, item: &CatalogItem<D>) -> AppResult<CatalogItem<D>>;

    async fn delete(&self, id: ItemId) -> AppResult<()>;
}

/// Read access to the genre taxonomy
#[async_trait]
pub trait GenreStore: Send + Sync {
    /// Genres whose id is in `ids`; unknown ids are simply absent
    async fn find_by_ids(&self, ids: &[GenreId]) -> AppResult<Vec<Genre>>;

    /// All genres in insertion order
    async fn list_all(&self) -> AppResult<Vec<Genre>>;
}

/// Resolves usernames established by the authentication layer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
}
