use serde::{Deserialize, Serialize};

use super::{CatalogItem, ItemDetails, ItemInput, ItemKind};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDetails {
    /// Number of episodes in the series
    pub episodes: i32,
}

impl ItemDetails for SeriesDetails {
    const KIND: ItemKind = ItemKind::Series;
}

pub type Series = CatalogItem<SeriesDetails>;
pub type SeriesInput = ItemInput<SeriesDetails>;
