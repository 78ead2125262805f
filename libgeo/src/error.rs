//! Objects related to reporting errors from this library

/// A list of error types that can occur within this library
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("No columns to parse from file")]
    EmptyUpload,

    #[error("Column mismatch: expected {expected:?}, uploaded {actual:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Expected {expected} fields in line {line}, saw {found}")]
    RaggedRecord {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    DatabaseMigrationError(#[from] sqlx::migrate::MigrateError),
}

impl Error {
    /// Whether this error was caused by the uploaded content itself rather than by
    /// the backing store
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::Csv(_) | Error::EmptyUpload | Error::RaggedRecord { .. }
        )
    }
}

/// A convenience type alias for a [Result] with [Error] as its error type
pub type Result<T, E = Error> = std::result::Result<T, E>;
