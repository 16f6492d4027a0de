use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use cinedex_db::Database;
use cinedex_types::models::NewMovie;

/// Load `path` (a JSON array of movies) into an empty catalog. A catalog
/// that already has movies is left alone, so restarts do not duplicate.
pub fn seed_if_empty(db: &Database, path: &Path) -> Result<usize> {
    let existing = db.movie_count()?;
    if existing > 0 {
        info!("Catalog already holds {} movies, skipping seed", existing);
        return Ok(0);
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let movies: Vec<NewMovie> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing seed file {}", path.display()))?;

    let imported = db.import_movies(movies)?;
    info!("Seeded {} movies from {}", imported, path.display());
    Ok(imported)
}
