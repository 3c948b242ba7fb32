//! User records and the favorites lookup used by the content recommender.

use crate::parser;
use crate::types::{ItemId, User};
use std::collections::HashSet;
use std::path::Path;

/// Read access to users' favorite sets
pub trait FavoritesStore: Send + Sync {
    /// The user's current favorites, or `None` if the user is unknown
    fn favorites(&self, user_id: &str) -> Option<HashSet<ItemId>>;
}

/// In-memory user directory loaded from the JSON record store
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// Load users from a JSON array; a missing file is an empty directory
    pub fn load(path: &Path) -> Self {
        Self::new(parser::load_json_records(path))
    }

    pub fn get_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn get_user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FavoritesStore for UserDirectory {
    fn favorites(&self, user_id: &str) -> Option<HashSet<ItemId>> {
        self.get_user(user_id)
            .map(|u| u.favorites.iter().cloned().collect())
    }
}
