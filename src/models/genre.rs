use serde::{Deserialize, Serialize};

use super::GenreId;

/// The genre taxonomy the catalog ships with
pub const DEFAULT_GENRES: [&str; 12] = [
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Documentary",
    "Drama",
    "Fantasy",
    "Horror",
    "Musical",
    "Mystery",
    "Sci-Fi",
    "Suspense",
];

/// Canonical genre record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

impl Genre {
    pub fn new(id: GenreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Client-supplied reference to a genre.
///
/// Only the id is trusted; a name sent alongside it is ignored and the
/// canonical record is looked up instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreRef {
    pub id: GenreId,
}

impl From<GenreId> for GenreRef {
    fn from(id: GenreId) -> Self {
        Self { id }
    }
}
