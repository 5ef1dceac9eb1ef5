use axum::{extract::FromRef, http::HeaderName};
use sqlx::PgPool;
use std::sync::Arc;

use super::identity::DEFAULT_IDENTITY_HEADER;
use crate::{
    config::Tenancy,
    db::{
        CatalogStore, GenreStore, MemoryCatalogStore, MemoryStore, PgCatalogStore, PgStore,
        UserDirectory,
    },
    models::{MovieDetails, SeriesDetails},
    services::{GenreCatalog, MovieCatalogService, OwnershipPolicy, SeriesCatalogService},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub genres: GenreCatalog,
    pub movies: MovieCatalogService,
    pub series: SeriesCatalogService,
    /// Header carrying the authenticated username
    pub identity_header: HeaderName,
}

impl AppState {
    /// Wires the services over the given stores
    pub fn from_stores(
        genre_store: Arc<dyn GenreStore>,
        users: Arc<dyn UserDirectory>,
        movies: Arc<dyn CatalogStore<MovieDetails>>,
        series: Arc<dyn CatalogStore<SeriesDetails>>,
        tenancy: Tenancy,
    ) -> Self {
        let genres = GenreCatalog::new(genre_store);
        let policy = match tenancy {
            Tenancy::OwnerScoped => OwnershipPolicy::OwnerScoped(users),
            Tenancy::Unscoped => OwnershipPolicy::Unscoped,
        };

        Self {
            movies: MovieCatalogService::new(movies, genres.clone(), policy.clone()),
            series: SeriesCatalogService::new(series, genres.clone(), policy),
            genres,
            identity_header: HeaderName::from_static(DEFAULT_IDENTITY_HEADER),
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, tenancy: Tenancy) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        Self::from_stores(
            store.clone(),
            store,
            Arc::new(PgCatalogStore::<MovieDetails>::new(pool.clone())),
            Arc::new(PgCatalogStore::<SeriesDetails>::new(pool)),
            tenancy,
        )
    }

    /// State backed by in-memory stores sharing `store`'s genres and users
    pub fn in_memory(store: MemoryStore, tenancy: Tenancy) -> Self {
        let store = Arc::new(store);
        Self::from_stores(
            store.clone(),
            store,
            Arc::new(MemoryCatalogStore::<MovieDetails>::new()),
            Arc::new(MemoryCatalogStore::<SeriesDetails>::new()),
            tenancy,
        )
    }

    pub fn with_identity_header(mut self, header: HeaderName) -> Self {
        self.identity_header = header;
        self
    }
}

impl FromRef<AppState> for GenreCatalog {
    fn from_ref(state: &AppState) -> Self {
        state.genres.clone()
    }
}

impl FromRef<AppState> for MovieCatalogService {
    fn from_ref(state: &AppState) -> Self {
        state.movies.clone()
    }
}

impl FromRef<AppState> for SeriesCatalogService {
    fn from_ref(state: &AppState) -> Self {
        state.series.clone()
    }
}
