pub mod catalog;
pub mod genre_catalog;
pub mod ownership;
pub mod sort;

pub use catalog::{CatalogService, ListParams, MovieCatalogService, SeriesCatalogService};
pub use genre_catalog::GenreCatalog;
pub use ownership::{Action, OwnershipGuard, OwnershipPolicy};
pub use sort::{OrderRule, SortDirection, SortKey, SortSpec};
