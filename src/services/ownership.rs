use std::fmt::Display;
use std::sync::Arc;

use crate::{
    db::UserDirectory,
    error::{AppError, AppResult},
    models::{CatalogItem, ItemDetails, User},
};

/// Mutations gated by ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Update => f.write_str("edit"),
            Action::Delete => f.write_str("delete"),
        }
    }
}

/// Decides whether a caller may mutate an item
pub struct OwnershipGuard;

impl OwnershipGuard {
    /// Allows the action only when the caller is the item's recorded owner.
    /// An item without an owner belongs to nobody and cannot be mutated.
    pub fn authorize<D: ItemDetails>(
        item: &CatalogItem<D>,
        caller: &str,
        action: Action,
    ) -> AppResult<()> {
        if item.owner_username() == Some(caller) {
            return Ok(());
        }

        tracing::warn!(
            kind = %D::KIND,
            item_id = item.id,
            caller = %caller,
            action = %action,
            "Ownership check failed"
        );

        Err(AppError::Forbidden(format!(
            "You are not allowed to {} this {}",
            action,
            D::KIND
        )))
    }
}

/// How a catalog service treats caller identity, chosen once at construction
#[derive(Clone)]
pub enum OwnershipPolicy {
    /// Items belong to the user who created them; callers must identify
    /// themselves and may only mutate their own items
    OwnerScoped(Arc<dyn UserDirectory>),
    /// One shared catalog; identity is ignored
    Unscoped,
}

impl OwnershipPolicy {
    pub fn is_scoped(&self) -> bool {
        matches!(self, OwnershipPolicy::OwnerScoped(_))
    }

    /// Resolves the caller to a user when items are owner-scoped.
    ///
    /// Returns `None` in unscoped mode without consulting anything.
    pub async fn resolve_caller(&self, caller: Option<&str>) -> AppResult<Option<User>> {
        match self {
            OwnershipPolicy::Unscoped => Ok(None),
            OwnershipPolicy::OwnerScoped(directory) => {
                let username = require_caller(caller)?;
                directory
                    .find_by_username(username)
                    .await?
                    .map(Some)
                    .ok_or_else(|| AppError::UserNotFound(username.to_string()))
            }
        }
    }

    /// Applies [`OwnershipGuard`] when items are owner-scoped
    pub fn authorize<D: ItemDetails>(
        &self,
        item: &CatalogItem<D>,
        caller: Option<&str>,
        action: Action,
    ) -> AppResult<()> {
        match self {
            OwnershipPolicy::Unscoped => Ok(()),
            OwnershipPolicy::OwnerScoped(_) => {
                OwnershipGuard::authorize(item, require_caller(caller)?, action)
            }
        }
    }
}

fn require_caller(caller: Option<&str>) -> AppResult<&str> {
    caller
        .filter(|username| !username.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Caller identity is required".to_string()))
}
