use anyhow::Result;
use uuid::Uuid;

use cinedex_types::models::{Director, Genre, Movie};

use crate::Database;
use crate::models::{NewUser, StoredUser, UpdateOutcome, UserChanges};

/// The record store the auth and favorites core is written against.
///
/// Every method is a keyed lookup or a single-record atomic update; callers
/// never read-modify-write through this interface. Implementations are
/// blocking, so async callers run them on the blocking pool.
pub trait CatalogStore: Send + Sync {
    fn find_user_by_username(&self, username: &str) -> Result<Option<StoredUser>>;
    fn find_user_by_id(&self, id: Uuid) -> Result<Option<StoredUser>>;
    /// `None` when the username is taken.
    fn create_user(&self, user: &NewUser) -> Result<Option<StoredUser>>;
    fn update_user(&self, username: &str, changes: &UserChanges) -> Result<UpdateOutcome>;
    fn delete_user(&self, username: &str) -> Result<Option<StoredUser>>;

    /// Atomic set-add. `None` when the user does not exist.
    fn add_favorite(&self, username: &str, movie_id: &str) -> Result<Option<Vec<String>>>;
    /// Atomic set-remove. `None` when the user does not exist.
    fn remove_favorite(&self, username: &str, movie_id: &str) -> Result<Option<Vec<String>>>;
    /// Favorite movie ids of the user with `user_id`; empty for an unknown id.
    fn favorites_of(&self, user_id: Uuid) -> Result<Vec<String>>;

    fn find_movie_by_id(&self, id: &str) -> Result<Option<Movie>>;
    fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>>;
    fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>>;
    fn find_director_by_name(&self, name: &str) -> Result<Option<Director>>;
    fn list_movies(&self) -> Result<Vec<Movie>>;
    fn insert_movie(&self, movie: &Movie) -> Result<()>;
    fn movie_count(&self) -> Result<u64>;
}

impl CatalogStore for Database {
    fn find_user_by_username(&self, username: &str) -> Result<Option<StoredUser>> {
        self.get_user_by_username(username)
    }

    fn find_user_by_id(&self, id: Uuid) -> Result<Option<StoredUser>> {
        self.get_user_by_id(id)
    }

    fn create_user(&self, user: &NewUser) -> Result<Option<StoredUser>> {
        Database::create_user(self, user)
    }

    fn update_user(&self, username: &str, changes: &UserChanges) -> Result<UpdateOutcome> {
        Database::update_user(self, username, changes)
    }

    fn delete_user(&self, username: &str) -> Result<Option<StoredUser>> {
        Database::delete_user(self, username)
    }

    fn add_favorite(&self, username: &str, movie_id: &str) -> Result<Option<Vec<String>>> {
        Database::add_favorite(self, username, movie_id)
    }

    fn remove_favorite(&self, username: &str, movie_id: &str) -> Result<Option<Vec<String>>> {
        Database::remove_favorite(self, username, movie_id)
    }

    fn favorites_of(&self, user_id: Uuid) -> Result<Vec<String>> {
        self.get_favorites(user_id)
    }

    fn find_movie_by_id(&self, id: &str) -> Result<Option<Movie>> {
        self.get_movie_by_id(id)
    }

    fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>> {
        self.get_movie_by_title(title)
    }

    fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>> {
        self.get_genre_by_name(name)
    }

    fn find_director_by_name(&self, name: &str) -> Result<Option<Director>> {
        self.get_director_by_name(name)
    }

    fn list_movies(&self) -> Result<Vec<Movie>> {
        Database::list_movies(self)
    }

    fn insert_movie(&self, movie: &Movie) -> Result<()> {
        Database::insert_movie(self, movie)
    }

    fn movie_count(&self) -> Result<u64> {
        Database::movie_count(self)
    }
}
