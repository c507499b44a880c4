use std::time::Duration;

use crate::error::LoaderError;

/// Loader configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Postgres connection string (required).
    pub database_url: String,
    /// Pool size (default: `10`).
    pub max_connections: u32,
    /// How long a snapshot is served before a refresh (default: 300s).
    pub cache_ttl: Duration,
}

impl LoaderConfig {
    /// Load configuration from environment variables, after reading a
    /// `.env` file if one exists.
    ///
    /// | Env Var                       | Default    |
    /// |-------------------------------|------------|
    /// | `DATABASE_URL`                | (required) |
    /// | `DB_MAX_CONNECTIONS`          | `10`       |
    /// | `CONFIGURATOR_CACHE_TTL_SECS` | `300`      |
    pub fn from_env() -> Result<Self, LoaderError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LoaderConfig::from_env`] over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoaderError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| LoaderError::Config("DATABASE_URL must be set".into()))?;

        let max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        if max_connections == 0 {
            return Err(LoaderError::Config(
                "DB_MAX_CONNECTIONS must be at least 1".into(),
            ));
        }

        let ttl_secs: u64 = parse_or(&lookup, "CONFIGURATOR_CACHE_TTL_SECS", 300)?;

        Ok(Self {
            database_url,
            max_connections,
            cache_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, LoaderError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| LoaderError::Config(format!("{key} must be a valid number, got '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = LoaderConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/cfg")]))
            .unwrap();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn overrides_apply() {
        let config = LoaderConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/cfg"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("CONFIGURATOR_CACHE_TTL_SECS", " 60 "),
        ]))
        .unwrap();
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn missing_url_is_an_error() {
        let err = LoaderConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_matches!(err, LoaderError::Config(msg) if msg.contains("DATABASE_URL"));
    }

    #[test]
    fn invalid_numbers_are_errors() {
        for (key, value) in [
            ("DB_MAX_CONNECTIONS", "lots"),
            ("DB_MAX_CONNECTIONS", "0"),
            ("CONFIGURATOR_CACHE_TTL_SECS", "-5"),
        ] {
            let result = LoaderConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://localhost/cfg"),
                (key, value),
            ]));
            assert_matches!(result, Err(LoaderError::Config(_)), "{key}={value}");
        }
    }
}
