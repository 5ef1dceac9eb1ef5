use serde::{Deserialize, Serialize};

use super::UserId;

/// A catalog owner. Authentication lives outside this service; only the
/// id and the unique username are known here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}
