use configurator_core::error::CoreError;

/// Errors raised while loading snapshots.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// A domain-level error from `configurator_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A non-database snapshot source failed.
    #[error("Snapshot source error: {0}")]
    Source(String),
}

pub type LoaderResult<T> = Result<T, LoaderError>;
