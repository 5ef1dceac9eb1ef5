use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::{
    db::GenreStore,
    error::{AppError, AppResult},
    models::{Genre, GenreId},
};

/// Resolves client genre references against the canonical taxonomy.
///
/// The taxonomy is read-only here; genres are never created on the fly.
#[derive(Clone)]
pub struct GenreCatalog {
    store: Arc<dyn GenreStore>,
}

impl GenreCatalog {
    pub fn new(store: Arc<dyn GenreStore>) -> Self {
        Self { store }
    }

    /// Looks up every id, all or nothing.
    ///
    /// Fails with [`AppError::GenreNotFound`] naming the lowest unknown id.
    pub async fn resolve(&self, ids: &BTreeSet<GenreId>) -> AppResult<BTreeSet<Genre>> {
        if ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let wanted: Vec<GenreId> = ids.iter().copied().collect();
        let mut found: BTreeMap<GenreId, Genre> = self
            .store
            .find_by_ids(&wanted)
            .await?
            .into_iter()
            .map(|genre| (genre.id, genre))
            .collect();

        let mut resolved = BTreeSet::new();
        for id in ids {
            match found.remove(id) {
                Some(genre) => {
                    resolved.insert(genre);
                }
                None => {
                    tracing::warn!(genre_id = id, "Rejected unknown genre reference");
                    return Err(AppError::GenreNotFound(*id));
                }
            }
        }

        Ok(resolved)
    }

    /// Every genre in insertion order
    pub async fn list_all(&self) -> AppResult<Vec<Genre>> {
        self.store.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    async fn catalog() -> GenreCatalog {
        GenreCatalog::new(Arc::new(MemoryStore::with_default_genres().await))
    }

    #[tokio::test]
    async fn test_resolve_known_ids() {
        let catalog = catalog().await;
        let ids: BTreeSet<GenreId> = [6, 11].into_iter().collect();

        let genres = catalog.resolve(&ids).await.unwrap();
        let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Drama", "Sci-Fi"]);
    }

    #[tokio::test]
    async fn test_resolve_is_all_or_nothing() {
        let catalog = catalog().await;
        let ids: BTreeSet<GenreId> = [1, 404, 2, 999].into_iter().collect();

        let result = catalog.resolve(&ids).await;
        assert!(matches!(result, Err(AppError::GenreNotFound(404))));
    }

    #[tokio::test]
    async fn test_resolve_empty_set() {
        let catalog = GenreCatalog::new(Arc::new(MemoryStore::new()));
        let genres = tokio_test::assert_ok!(catalog.resolve(&BTreeSet::new()).await);
        assert!(genres.is_empty());
    }

    #[tokio::test]
    async fn test_list_all_in_insertion_order() {
        let store = MemoryStore::new();
        store.add_genre("Western").await;
        store.add_genre("Noir").await;

        let catalog = GenreCatalog::new(Arc::new(store));
        let names: Vec<String> = catalog
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["Western", "Noir"]);
    }
}
