use std::str::FromStr;

use axum::http::HeaderValue;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Which persistence realization serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Local,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "local" => Ok(StorageBackend::Local),
            other => Err(format!("expected `sqlite` or `local`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected `pretty` or `json`, got `{other}`")),
        }
    }
}

/// Storage settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// SQLite URL for the durable realization.
    pub database_url: String,
    pub db_max_connections: u32,
    /// Directory holding one JSON file per collection for the local mirror.
    pub local_dir: String,
    /// Seed sample records into an empty local store on first access.
    pub local_seed: bool,
}

impl StorageConfig {
    /// | Env Var              | Default                 |
    /// |----------------------|-------------------------|
    /// | `STORAGE_BACKEND`    | `sqlite`                |
    /// | `DATABASE_URL`       | `sqlite://data/pms.db`  |
    /// | `DB_MAX_CONNECTIONS` | `5`                     |
    /// | `LOCAL_STORE_DIR`    | `data/local`            |
    /// | `LOCAL_STORE_SEED`   | `true`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            backend: parse_var("STORAGE_BACKEND", "sqlite")?,
            database_url: var_or("DATABASE_URL", "sqlite://data/pms.db"),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", "5")?,
            local_dir: var_or("LOCAL_STORE_DIR", "data/local"),
            local_seed: parse_var("LOCAL_STORE_SEED", "true")?,
        })
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for the store to close (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub log_format: LogFormat,
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3001`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `LOG_FORMAT`           | `pretty`                   |
    ///
    /// Storage variables are listed on [`StorageConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = var_or("HOST", "0.0.0.0");
        let port = parse_var("PORT", "3001")?;

        let raw_origins = var_or("CORS_ORIGINS", "http://localhost:5173");
        let cors_origins = parse_origins(&raw_origins)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", "30")?,
            shutdown_timeout_secs: parse_var("SHUTDOWN_TIMEOUT_SECS", "30")?,
            log_format: parse_var("LOG_FORMAT", "pretty")?,
            storage: StorageConfig::from_env()?,
        })
    }
}

fn var_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(var: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    let value = var_or(var, default);
    value.parse().map_err(|err: T::Err| ConfigError::Invalid {
        var,
        reason: err.to_string(),
        value,
    })
}

/// Split a comma-separated origin list, rejecting values that are not valid
/// header values.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map(|_| origin.to_string())
                .map_err(|err| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: err.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn storage_backend_parses_case_insensitively() {
        assert_eq!("SQLite".parse::<StorageBackend>(), Ok(StorageBackend::Sqlite));
        assert_eq!(" local ".parse::<StorageBackend>(), Ok(StorageBackend::Local));
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        let origins = parse_origins("http://a.test, ,http://b.test ").unwrap();
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn origin_with_control_characters_is_rejected() {
        assert_matches!(
            parse_origins("http://ok.test,bad\norigin"),
            Err(ConfigError::Invalid { var: "CORS_ORIGINS", .. })
        );
    }
}
