use anyhow::Context;
use std::str::FromStr;

pub const DEFAULT_OMDB_BASE_URL: &str = "http://www.omdbapi.com/";

#[derive(Debug)]
pub struct Config {
    database_url: String,
    server_port: u16,
    omdb_base_url: String,
    omdb_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = load_env("DATABASE_URL")?;
        let server_port = load_env("SERVER_PORT")?;
        let omdb_base_url = load_optional_env("OMDB_BASE_URL")?
            .unwrap_or_else(|| DEFAULT_OMDB_BASE_URL.to_string());
        let omdb_api_key = load_optional_env("OMDB_API_KEY")?;
        Ok(Self {
            database_url,
            server_port,
            omdb_base_url,
            omdb_api_key,
        })
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }

    #[must_use]
    pub fn omdb_base_url(&self) -> &str {
        &self.omdb_base_url
    }

    #[must_use]
    pub fn omdb_api_key(&self) -> Option<&str> {
        self.omdb_api_key.as_deref()
    }
}

fn load_env<T>(key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let val =
        std::env::var(key).with_context(|| format!("Failed to load environment variable {key}"))?;
    val.parse::<T>()
        .with_context(|| format!("Failed to parse environment variable {key}"))
}

/// Unset and empty variables are both treated as absent.
fn load_optional_env(key: &str) -> anyhow::Result<Option<String>> {
    match std::env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to load environment variable {key}"))
        }
    }
}
