use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Debug, Display};

use super::{Genre, GenreId, GenreRef, ItemId, Status, User};

/// The two kinds of catalog entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Movie,
    Series,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Movie => "movie",
            ItemKind::Series => "series",
        }
    }

    /// Table holding the items of this kind
    pub fn table(&self) -> &'static str {
        match self {
            ItemKind::Movie => "movies",
            ItemKind::Series => "series",
        }
    }

    /// Join table linking items of this kind to genres
    pub fn genre_table(&self) -> &'static str {
        match self {
            ItemKind::Movie => "movie_genres",
            ItemKind::Series => "series_genres",
        }
    }

    /// Foreign key column in the join table pointing back at the item
    pub fn genre_foreign_key(&self) -> &'static str {
        match self {
            ItemKind::Movie => "movie_id",
            ItemKind::Series => "series_id",
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields that distinguish one kind of catalog item from another.
///
/// Everything else about an item (title, genres, owner...) is shared and lives
/// on [`CatalogItem`]. The details are flattened into the item on the wire.
pub trait ItemDetails:
    Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: ItemKind;
}

/// A movie or series tracked by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem<D> {
    pub id: ItemId,
    pub title: String,
    pub summary: String,
    /// Runtime in minutes. Carried on series too, without any meaning attached.
    pub duration: i32,
    pub image_url: Option<String>,
    pub status: Option<Status>,
    pub genres: BTreeSet<Genre>,
    #[serde(skip)]
    pub owner: Option<User>,
    #[serde(flatten)]
    pub details: D,
}

impl<D: ItemDetails> CatalogItem<D> {
    pub fn owner_username(&self) -> Option<&str> {
        self.owner.as_ref().map(|owner| owner.username.as_str())
    }

    pub fn has_genre_named(&self, name: &str) -> bool {
        self.genres.iter().any(|genre| genre.name == name)
    }

    pub fn genre_ids(&self) -> Vec<GenreId> {
        self.genres.iter().map(|genre| genre.id).collect()
    }

    /// Overwrites every mutable field from `input`.
    ///
    /// `id` and `owner` never change. `status` is only replaced when the input
    /// carries one.
    pub fn apply(&mut self, input: ItemInput<D>, genres: BTreeSet<Genre>) {
        self.title = input.title;
        self.summary = input.summary;
        self.duration = input.duration;
        self.image_url = input.image_url;
        self.genres = genres;
        self.details = input.details;

        if let Some(status) = input.status {
            self.status = Some(status);
        }
    }
}

/// Client payload for creating or updating an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput<D> {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub duration: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub genres: Vec<GenreRef>,
    #[serde(flatten)]
    pub details: D,
}

impl<D> ItemInput<D> {
    /// Distinct genre ids referenced by the payload
    pub fn genre_ids(&self) -> BTreeSet<GenreId> {
        self.genres.iter().map(|genre| genre.id).collect()
    }
}

/// An item that has passed validation but has no id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem<D> {
    pub title: String,
    pub summary: String,
    pub duration: i32,
    pub image_url: Option<String>,
    pub status: Option<Status>,
    pub genres: BTreeSet<Genre>,
    pub owner: Option<User>,
    pub details: D,
}

impl<D> NewItem<D> {
    pub fn from_input(input: ItemInput<D>, genres: BTreeSet<Genre>, owner: Option<User>) -> Self {
        Self {
            title: input.title,
            summary: input.summary,
            duration: input.duration,
            image_url: input.image_url,
            status: input.status,
            genres,
            owner,
            details: input.details,
        }
    }

    /// Attaches the id handed out by the store
    pub fn with_id(self, id: ItemId) -> CatalogItem<D> {
        CatalogItem {
            id,
            title: self.title,
            summary: self.summary,
            duration: self.duration,
            image_url: self.image_url,
            status: self.status,
            genres: self.genres,
            owner: self.owner,
            details: self.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MovieDetails, MovieInput, SeriesDetails, SeriesInput};

    fn movie_input(status: Option<Status>) -> MovieInput {
        ItemInput {
            title: "Heat".to_string(),
            summary: "Cops and robbers".to_string(),
            duration: 170,
            image_url: None,
            status,
            genres: vec![GenreRef { id: 1 }, GenreRef { id: 1 }, GenreRef { id: 6 }],
            details: MovieDetails {},
        }
    }

    #[test]
    fn test_input_genre_ids_are_deduplicated() {
        let ids: Vec<GenreId> = movie_input(None).genre_ids().into_iter().collect();
        assert_eq!(ids, vec![1, 6]);
    }

    #[test]
    fn test_apply_keeps_status_when_absent() {
        let mut item = NewItem::from_input(movie_input(Some(Status::Completed)), BTreeSet::new(), None)
            .with_id(7);

        let mut patch = movie_input(None);
        patch.title = "Heat (1995)".to_string();
        item.apply(patch, BTreeSet::new());

        assert_eq!(item.id, 7);
        assert_eq!(item.title, "Heat (1995)");
        assert_eq!(item.status, Some(Status::Completed));
    }

    #[test]
    fn test_apply_replaces_genres_entirely() {
        let genres: BTreeSet<Genre> = [Genre::new(1, "Action")].into_iter().collect();
        let mut item = NewItem::from_input(movie_input(None), genres, None).with_id(1);

        let replacement: BTreeSet<Genre> = [Genre::new(6, "Drama")].into_iter().collect();
        item.apply(movie_input(Some(Status::ToWatch)), replacement.clone());

        assert_eq!(item.genres, replacement);
        assert_eq!(item.status, Some(Status::ToWatch));
    }

    #[test]
    fn test_apply_keeps_owner() {
        let owner = User::new(3, "ana");
        let mut item =
            NewItem::from_input(movie_input(None), BTreeSet::new(), Some(owner.clone())).with_id(1);
        item.apply(movie_input(None), BTreeSet::new());
        assert_eq!(item.owner, Some(owner));
    }

    #[test]
    fn test_series_input_deserialization() {
        let json = r#"{
            "title": "Dark",
            "summary": "Time travel in Winden",
            "duration": 60,
            "episodes": 26,
            "imageUrl": "https://img.example/dark.jpg",
            "status": "IN_PROGRESS",
            "genres": [{ "id": 10 }, { "id": 11, "name": "Sci-Fi" }]
        }"#;

        let input: SeriesInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.details, SeriesDetails { episodes: 26 });
        assert_eq!(input.image_url.as_deref(), Some("https://img.example/dark.jpg"));
        assert_eq!(input.status, Some(Status::InProgress));
        assert_eq!(input.genres.len(), 2);
    }

    #[test]
    fn test_item_serialization_hides_owner() {
        let item = NewItem::from_input(movie_input(None), BTreeSet::new(), Some(User::new(1, "ana")))
            .with_id(5);
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["id"], 5);
        assert_eq!(value["imageUrl"], serde_json::Value::Null);
        assert!(value.get("owner").is_none());
    }
}
