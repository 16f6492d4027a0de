use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users, movies, favorites)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                email       TEXT NOT NULL,
                birthday    TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE movies (
                id                  TEXT PRIMARY KEY,
                title               TEXT NOT NULL,
                description         TEXT NOT NULL DEFAULT '',
                genre_name          TEXT NOT NULL,
                genre_description   TEXT NOT NULL DEFAULT '',
                director_name       TEXT NOT NULL,
                director_bio        TEXT NOT NULL DEFAULT '',
                director_birth      TEXT,
                director_death      TEXT,
                image_path          TEXT NOT NULL DEFAULT '',
                featured            INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_movies_title ON movies(title);
            CREATE INDEX idx_movies_genre ON movies(genre_name COLLATE NOCASE);
            CREATE INDEX idx_movies_director ON movies(director_name COLLATE NOCASE);

            -- One row per (user, movie): the primary key is what gives the
            -- favorite list its set semantics.
            CREATE TABLE favorites (
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                movie_id    TEXT NOT NULL REFERENCES movies(id),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (user_id, movie_id)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (movie cast)");
        conn.execute_batch(
            "
            CREATE TABLE movie_actors (
                movie_id    TEXT NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
                position    INTEGER NOT NULL,
                name        TEXT NOT NULL,
                PRIMARY KEY (movie_id, position)
            );

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
