use std::cmp::Ordering;

use crate::models::CatalogItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Columns a listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Title,
}

impl SortKey {
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
        }
    }
}

/// Ordering applied to a listing.
///
/// There is no tie-break key: items with equal titles come back in whatever
/// order the store yields them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderRule {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl OrderRule {
    pub fn compare<D>(&self, a: &CatalogItem<D>, b: &CatalogItem<D>) -> Ordering {
        let ordering = match self.key {
            SortKey::Title => a.title.cmp(&b.title),
        };

        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    /// Stable in-place sort
    pub fn sort<D>(&self, items: &mut [CatalogItem<D>]) {
        items.sort_by(|a, b| self.compare(a, b));
    }

    /// SQL `ORDER BY` body, e.g. `title DESC`
    pub fn to_sql(&self) -> String {
        let direction = match self.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        format!("{} {}", self.key.column(), direction)
    }
}

/// Builds the ordering for a listing from the client's `sort` token
pub struct SortSpec;

impl SortSpec {
    /// Always orders by title. Only `desc` (any case) sorts descending;
    /// anything else, including nothing at all, sorts ascending.
    pub fn build(direction: Option<&str>) -> OrderRule {
        let direction = match direction {
            Some(token) if token.eq_ignore_ascii_case("desc") => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };

        OrderRule {
            key: SortKey::Title,
            direction,
        }
    }
}
