use crate::Database;
use crate::models::{MovieRow, NewUser, StoredUser, UpdateOutcome, UserChanges, UserRow};
use anyhow::Result;
use chrono::NaiveDate;
use cinedex_types::models::{Director, Genre, Movie, NewMovie};
use rusqlite::Connection;
use tracing::warn;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, password, email, birthday";

const MOVIE_COLUMNS: &str = "id, title, description, genre_name, genre_description, \
     director_name, director_bio, director_birth, director_death, image_path, featured";

impl Database {
    // -- Users --

    /// Insert a new user. Returns `None` when the username is already taken.
    pub fn create_user(&self, new: &NewUser) -> Result<Option<StoredUser>> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, password, email, birthday) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    id.to_string(),
                    new.username,
                    new.password_hash,
                    new.email,
                    new.birthday.map(format_date),
                ],
            );

            match inserted {
                Ok(_) => query_user(conn, "id", &id.to_string()),
                Err(e) if is_unique_violation(&e) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<StoredUser>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: Uuid) -> Result<Option<StoredUser>> {
        self.with_conn(|conn| query_user(conn, "id", &id.to_string()))
    }

    /// Overwrite the provided fields in a single statement.
    pub fn update_user(&self, username: &str, changes: &UserChanges) -> Result<UpdateOutcome> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users SET
                    username = COALESCE(?2, username),
                    password = COALESCE(?3, password),
                    email    = COALESCE(?4, email),
                    birthday = COALESCE(?5, birthday)
                 WHERE username = ?1",
                rusqlite::params![
                    username,
                    changes.username,
                    changes.password_hash,
                    changes.email,
                    changes.birthday.map(format_date),
                ],
            );

            match updated {
                Ok(0) => Ok(UpdateOutcome::NotFound),
                Ok(_) => {
                    let current = changes.username.as_deref().unwrap_or(username);
                    Ok(query_user(conn, "username", current)?
                        .map(UpdateOutcome::Updated)
                        .unwrap_or(UpdateOutcome::NotFound))
                }
                Err(e) if is_unique_violation(&e) => Ok(UpdateOutcome::UsernameTaken),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Delete a user and, through the cascade, its favorites. Returns the
    /// user as it was just before deletion.
    pub fn delete_user(&self, username: &str) -> Result<Option<StoredUser>> {
        self.with_conn(|conn| {
            let Some(user) = query_user(conn, "username", username)? else {
                return Ok(None);
            };
            conn.execute("DELETE FROM users WHERE id = ?1", [user.id.to_string()])?;
            Ok(Some(user))
        })
    }

    // -- Favorites --

    /// Set-union add. A movie that is already a favorite is left alone.
    /// Returns `None` if the user does not exist.
    pub fn add_favorite(&self, username: &str, movie_id: &str) -> Result<Option<Vec<String>>> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO favorites (user_id, movie_id)
                 SELECT id, ?2 FROM users WHERE username = ?1",
                (username, movie_id),
            )?;
            query_favorites_by_username(conn, username)
        })
    }

    /// Set-difference remove. Removing a movie that is not a favorite is a
    /// no-op. Returns `None` if the user does not exist.
    pub fn remove_favorite(&self, username: &str, movie_id: &str) -> Result<Option<Vec<String>>> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM favorites
                 WHERE movie_id = ?2
                   AND user_id = (SELECT id FROM users WHERE username = ?1)",
                (username, movie_id),
            )?;
            query_favorites_by_username(conn, username)
        })
    }

    pub fn get_favorites(&self, user_id: Uuid) -> Result<Vec<String>> {
        self.with_conn(|conn| query_favorites(conn, &user_id.to_string()))
    }

    // -- Movies --

    pub fn insert_movie(&self, movie: &Movie) -> Result<()> {
        self.with_conn(|conn| insert_movie(conn, movie))
    }

    /// Import seed entries in one transaction, assigning fresh ids.
    pub fn import_movies(&self, movies: Vec<NewMovie>) -> Result<usize> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let count = movies.len();
            for movie in movies {
                insert_movie(&tx, &movie.into_movie(Uuid::new_v4().to_string()))?;
            }
            tx.commit()?;
            Ok(count)
        })
    }

    pub fn movie_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
            Ok(count as u64)
        })
    }

    pub fn list_movies(&self) -> Result<Vec<Movie>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY rowid"))?;
            let rows = stmt
                .query_map([], map_movie_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter()
                .map(|row| -> Result<Movie> {
                    let actors = query_actors(conn, &row.id)?;
                    Ok(row.into_movie(actors))
                })
                .collect()
        })
    }

    pub fn get_movie_by_id(&self, id: &str) -> Result<Option<Movie>> {
        self.with_conn(|conn| query_movie(conn, "id = ?1", id))
    }

    /// Exact, case-sensitive title match. First inserted wins on duplicates.
    pub fn get_movie_by_title(&self, title: &str) -> Result<Option<Movie>> {
        self.with_conn(|conn| query_movie(conn, "title = ?1", title))
    }

    /// Genre of the first movie whose genre name matches, ignoring case.
    pub fn get_genre_by_name(&self, name: &str) -> Result<Option<Genre>> {
        self.with_conn(|conn| {
            Ok(query_movie(conn, "genre_name = ?1 COLLATE NOCASE", name)?.map(|m| m.genre))
        })
    }

    /// Director of the first movie whose director name matches, ignoring case.
    pub fn get_director_by_name(&self, name: &str) -> Result<Option<Director>> {
        self.with_conn(|conn| {
            Ok(query_movie(conn, "director_name = ?1 COLLATE NOCASE", name)?.map(|m| m.director))
        })
    }
}

impl MovieRow {
    fn into_movie(self, actors: Vec<String>) -> Movie {
        Movie {
            genre: Genre {
                name: self.genre_name,
                description: self.genre_description,
            },
            director: Director {
                name: self.director_name,
                bio: self.director_bio,
                birth: self.director_birth.as_deref().and_then(|d| parse_date(d, &self.id)),
                death: self.director_death.as_deref().and_then(|d| parse_date(d, &self.id)),
            },
            actors,
            id: self.id,
            title: self.title,
            description: self.description,
            image_path: self.image_path,
            featured: self.featured,
        }
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<StoredUser>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"))?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                email: row.get(3)?,
                birthday: row.get(4)?,
            })
        })
        .optional()?;

    let Some(row) = row else {
        return Ok(None);
    };

    let favorite_movies = query_favorites(conn, &row.id)?;
    let birthday = row.birthday.as_deref().and_then(|d| parse_date(d, &row.id));

    Ok(Some(StoredUser {
        id: row.id.parse()?,
        username: row.username,
        password_hash: row.password,
        email: row.email,
        birthday,
        favorite_movies,
    }))
}

fn query_favorites(conn: &Connection, user_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT movie_id FROM favorites WHERE user_id = ?1 ORDER BY rowid")?;
    let ids = stmt
        .query_map([user_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(ids)
}

fn query_favorites_by_username(conn: &Connection, username: &str) -> Result<Option<Vec<String>>> {
    let user_id: Option<String> = conn
        .query_row("SELECT id FROM users WHERE username = ?1", [username], |row| {
            row.get(0)
        })
        .optional()?;

    match user_id {
        Some(id) => Ok(Some(query_favorites(conn, &id)?)),
        None => Ok(None),
    }
}

fn query_movie(conn: &Connection, predicate: &str, value: &str) -> Result<Option<Movie>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies WHERE {predicate} ORDER BY rowid LIMIT 1"
    ))?;
    let Some(row) = stmt.query_row([value], map_movie_row).optional()? else {
        return Ok(None);
    };
    let actors = query_actors(conn, &row.id)?;
    Ok(Some(row.into_movie(actors)))
}

fn query_actors(conn: &Connection, movie_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM movie_actors WHERE movie_id = ?1 ORDER BY position")?;
    let names = stmt
        .query_map([movie_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(names)
}

fn insert_movie(conn: &Connection, movie: &Movie) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO movies ({MOVIE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        rusqlite::params![
            movie.id,
            movie.title,
            movie.description,
            movie.genre.name,
            movie.genre.description,
            movie.director.name,
            movie.director.bio,
            movie.director.birth.map(format_date),
            movie.director.death.map(format_date),
            movie.image_path,
            movie.featured,
        ],
    )?;

    let mut stmt =
        conn.prepare("INSERT INTO movie_actors (movie_id, position, name) VALUES (?1, ?2, ?3)")?;
    for (position, name) in movie.actors.iter().enumerate() {
        stmt.execute(rusqlite::params![movie.id, position as i64, name])?;
    }
    Ok(())
}

fn map_movie_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MovieRow> {
    Ok(MovieRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        genre_name: row.get(3)?,
        genre_description: row.get(4)?,
        director_name: row.get(5)?,
        director_bio: row.get(6)?,
        director_birth: row.get(7)?,
        director_death: row.get(8)?,
        image_path: row.get(9)?,
        featured: row.get(10)?,
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(raw: &str, owner: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .inspect_err(|e| warn!("Corrupt date '{}' on row '{}': {}", raw, owner, e))
        .ok()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn movie(id: &str, title: &str, genre: &str, director: &str) -> Movie {
        Movie {
            id: id.into(),
            title: title.into(),
            description: format!("About {title}"),
            genre: Genre {
                name: genre.into(),
                description: format!("{genre} films"),
            },
            director: Director {
                name: director.into(),
                bio: String::new(),
                birth: NaiveDate::from_ymd_opt(1970, 7, 30),
                death: None,
            },
            actors: Vec::new(),
            image_path: String::new(),
            featured: false,
        }
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password_hash: "digest".into(),
            email: format!("{username}@example.com"),
            birthday: None,
        }
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_movie(&movie("m1", "Inception", "Action", "Christopher Nolan"))
            .unwrap();
        db.insert_movie(&movie("m2", "Heat", "Crime", "Michael Mann")).unwrap();
        db.insert_movie(&movie("m3", "Tenet", "Action", "Christopher Nolan"))
            .unwrap();
        db
    }

    #[test]
    fn create_user_rejects_duplicate_username() {
        let db = seeded();
        let alice = db.create_user(&new_user("alice1")).unwrap().unwrap();
        assert_eq!(alice.username, "alice1");
        assert!(alice.favorite_movies.is_empty());

        assert!(db.create_user(&new_user("alice1")).unwrap().is_none());
        // Case-sensitive: a differently cased name is a different user.
        assert!(db.create_user(&new_user("Alice1")).unwrap().is_some());
    }

    #[test]
    fn lookups_by_username_and_id_agree() {
        let db = seeded();
        let created = db.create_user(&new_user("alice1")).unwrap().unwrap();

        let by_name = db.get_user_by_username("alice1").unwrap().unwrap();
        let by_id = db.get_user_by_id(created.id).unwrap().unwrap();
        assert_eq!(by_name, by_id);
        assert!(db.get_user_by_id(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn add_favorite_is_set_union() {
        let db = seeded();
        db.create_user(&new_user("alice1")).unwrap();

        db.add_favorite("alice1", "m1").unwrap();
        db.add_favorite("alice1", "m2").unwrap();
        let favorites = db.add_favorite("alice1", "m1").unwrap().unwrap();

        assert_eq!(favorites, vec!["m1", "m2"]);
    }

    #[test]
    fn remove_absent_favorite_is_noop() {
        let db = seeded();
        db.create_user(&new_user("alice1")).unwrap();
        db.add_favorite("alice1", "m1").unwrap();

        let favorites = db.remove_favorite("alice1", "m3").unwrap().unwrap();
        assert_eq!(favorites, vec!["m1"]);

        let favorites = db.remove_favorite("alice1", "m1").unwrap().unwrap();
        assert!(favorites.is_empty());
    }

    #[test]
    fn favorites_for_missing_user_is_none() {
        let db = seeded();
        assert!(db.add_favorite("ghost", "m1").unwrap().is_none());
        assert!(db.remove_favorite("ghost", "m1").unwrap().is_none());
    }

    #[test]
    fn concurrent_adds_are_not_lost() {
        let db = Arc::new(seeded());
        db.create_user(&new_user("alice1")).unwrap();

        let handles: Vec<_> = ["m1", "m2", "m3"]
            .into_iter()
            .map(|id| {
                let db = db.clone();
                std::thread::spawn(move || db.add_favorite("alice1", id).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut favorites = db.get_user_by_username("alice1").unwrap().unwrap().favorite_movies;
        favorites.sort();
        assert_eq!(favorites, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn update_user_overwrites_only_given_fields() {
        let db = seeded();
        db.create_user(&new_user("alice1")).unwrap();

        let changes = UserChanges {
            email: Some("new@example.com".into()),
            birthday: NaiveDate::from_ymd_opt(1990, 1, 2),
            ..Default::default()
        };
        let UpdateOutcome::Updated(user) = db.update_user("alice1", &changes).unwrap() else {
            panic!("expected update");
        };
        assert_eq!(user.username, "alice1");
        assert_eq!(user.password_hash, "digest");
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.birthday, NaiveDate::from_ymd_opt(1990, 1, 2));
    }

    #[test]
    fn update_user_reports_missing_and_taken() {
        let db = seeded();
        db.create_user(&new_user("alice1")).unwrap();
        db.create_user(&new_user("bobby1")).unwrap();

        let rename = UserChanges {
            username: Some("bobby1".into()),
            ..Default::default()
        };
        assert_eq!(
            db.update_user("alice1", &rename).unwrap(),
            UpdateOutcome::UsernameTaken
        );
        assert_eq!(
            db.update_user("ghost", &UserChanges::default()).unwrap(),
            UpdateOutcome::NotFound
        );
    }

    #[test]
    fn rename_keeps_favorites() {
        let db = seeded();
        db.create_user(&new_user("alice1")).unwrap();
        db.add_favorite("alice1", "m2").unwrap();

        let rename = UserChanges {
            username: Some("alice2".into()),
            ..Default::default()
        };
        let UpdateOutcome::Updated(user) = db.update_user("alice1", &rename).unwrap() else {
            panic!("expected update");
        };
        assert_eq!(user.username, "alice2");
        assert_eq!(user.favorite_movies, vec!["m2"]);
    }

    #[test]
    fn delete_user_cascades_favorites() {
        let db = seeded();
        let alice = db.create_user(&new_user("alice1")).unwrap().unwrap();
        db.add_favorite("alice1", "m1").unwrap();

        let deleted = db.delete_user("alice1").unwrap().unwrap();
        assert_eq!(deleted.favorite_movies, vec!["m1"]);
        assert!(db.get_user_by_username("alice1").unwrap().is_none());
        assert!(db.get_favorites(alice.id).unwrap().is_empty());
        assert!(db.delete_user("alice1").unwrap().is_none());
    }

    #[test]
    fn catalog_lookups() {
        let db = seeded();

        assert_eq!(db.list_movies().unwrap().len(), 3);
        assert_eq!(db.movie_count().unwrap(), 3);

        let heat = db.get_movie_by_title("Heat").unwrap().unwrap();
        assert_eq!(heat.id, "m2");
        assert_eq!(heat.director.birth, NaiveDate::from_ymd_opt(1970, 7, 30));
        assert!(db.get_movie_by_title("heat").unwrap().is_none());

        let genre = db.get_genre_by_name("action").unwrap().unwrap();
        assert_eq!(genre.name, "Action");

        let director = db.get_director_by_name("CHRISTOPHER NOLAN").unwrap().unwrap();
        assert_eq!(director.name, "Christopher Nolan");
        assert!(db.get_director_by_name("Nolan").unwrap().is_none());

        assert!(db.get_movie_by_id("m9").unwrap().is_none());
        assert!(db.get_genre_by_name("Western").unwrap().is_none());
    }

    #[test]
    fn import_assigns_ids() {
        let db = Database::open_in_memory().unwrap();
        let entries: Vec<NewMovie> = seed_entries();

        assert_eq!(db.import_movies(entries).unwrap(), 2);
        let movies = db.list_movies().unwrap();
        assert_eq!(movies.len(), 2);
        assert_ne!(movies[0].id, movies[1].id);
        assert!(movies[0].id.parse::<Uuid>().is_ok());
        assert_eq!(movies[1].actors, vec!["Sigourney Weaver"]);
    }

    #[test]
    fn actors_keep_billing_order() {
        let db = seeded();
        let mut thief = movie("m4", "Thief", "Crime", "Michael Mann");
        thief.actors = vec!["James Caan".into(), "Tuesday Weld".into(), "Willie Nelson".into()];
        db.insert_movie(&thief).unwrap();

        let stored = db.get_movie_by_id("m4").unwrap().unwrap();
        assert_eq!(stored.actors, thief.actors);
        assert!(db.get_movie_by_id("m1").unwrap().unwrap().actors.is_empty());

        let listed = db.list_movies().unwrap();
        assert_eq!(listed.last().unwrap().actors, thief.actors);
    }

    fn seed_entries() -> Vec<NewMovie> {
        ["Alien", "Aliens"]
            .into_iter()
            .map(|title| NewMovie {
                title: title.into(),
                description: String::new(),
                genre: Genre {
                    name: "Horror".into(),
                    description: String::new(),
                },
                director: Director {
                    name: "Ridley Scott".into(),
                    bio: String::new(),
                    birth: None,
                    death: None,
                },
                actors: vec!["Sigourney Weaver".into()],
                image_path: String::new(),
                featured: false,
            })
            .collect()
    }
}
