use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod catalog_item;
pub mod genre;
pub mod movie;
pub mod series;
pub mod user;

pub use catalog_item::{CatalogItem, ItemDetails, ItemInput, ItemKind, NewItem};
pub use genre::{Genre, GenreRef, DEFAULT_GENRES};
pub use movie::{Movie, MovieDetails, MovieInput};
pub use series::{Series, SeriesDetails, SeriesInput};
pub use user::User;

/// Surrogate key assigned by the persistence layer
pub type DbId = i64;

pub type ItemId = DbId;
pub type GenreId = DbId;
pub type UserId = DbId;

/// Where the user is with a catalog item.
///
/// Transitions are client-controlled; any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    ToWatch,
    InProgress,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToWatch => "TO_WATCH",
            Status::InProgress => "IN_PROGRESS",
            Status::Completed => "COMPLETED",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TO_WATCH" => Ok(Status::ToWatch),
            "IN_PROGRESS" => Ok(Status::InProgress),
            "COMPLETED" => Ok(Status::Completed),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}
