//! Database row types and the store-level user record.
//!
//! Row types map directly to SQLite rows. `StoredUser` is what the store
//! hands to the auth core: the public user plus its password digest.

use chrono::NaiveDate;
use uuid::Uuid;

use cinedex_types::models::User;

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub email: String,
    pub birthday: Option<String>,
}

pub struct MovieRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub genre_name: String,
    pub genre_description: String,
    pub director_name: String,
    pub director_bio: String,
    pub director_birth: Option<String>,
    pub director_death: Option<String>,
    pub image_path: String,
    pub featured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
    pub favorite_movies: Vec<String>,
}

impl StoredUser {
    /// Drop the digest and keep what may be shown to clients.
    pub fn into_public(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            birthday: self.birthday,
            favorite_movies: self.favorite_movies,
        }
    }
}

/// A user about to be created. `password_hash` is already digested.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
}

/// Fields to overwrite on a user. `None` leaves the column as it is.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(StoredUser),
    NotFound,
    UsernameTaken,
}
