use serde::{Deserialize, Serialize};

use super::{CatalogItem, ItemDetails, ItemInput, ItemKind};

/// Movies carry nothing beyond the shared item fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetails {}

impl ItemDetails for MovieDetails {
    const KIND: ItemKind = ItemKind::Movie;
}

pub type Movie = CatalogItem<MovieDetails>;
pub type MovieInput = ItemInput<MovieDetails>;
