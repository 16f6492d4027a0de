use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use cinedex_api::password::HashParams;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

/// Process-wide settings, read once at startup.
#[derive(Debug)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub seed_file: Option<PathBuf>,
    pub hash: HashParams,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("CINEDEX_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("CINEDEX_JWT_SECRET is unset or still a placeholder");
        }

        let defaults = HashParams::default();
        let hash = HashParams {
            memory_kib: parse_or(&get, "CINEDEX_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&get, "CINEDEX_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&get, "CINEDEX_HASH_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            jwt_secret,
            db_path: get("CINEDEX_DB_PATH")
                .unwrap_or_else(|| "cinedex.db".into())
                .into(),
            host: get("CINEDEX_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "CINEDEX_PORT", 8080)?,
            seed_file: get("CINEDEX_SEED_FILE")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            hash,
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw.parse().with_context(|| format!("invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}
