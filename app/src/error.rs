use thiserror::Error;
use weather_core::error::ReadingError;

#[derive(Debug, Error)]
pub enum DBError {
    #[error(transparent)]
    SQLError(#[from] sqlx::Error),
    #[error("No reading found with id {0}")]
    ReadingNotFound(i64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),
    #[error("Invalid server address: {0}")]
    InvalidAddr(std::string::String),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    DB(#[from] DBError),
    #[error("Failed binding server: {0}")]
    Bind(#[from] warp::Error),
    #[error("Failed registering signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Outcome taxonomy of every observer operation.
///
/// `Validation` and `NotFound` are caller errors and carry the offending
/// id, source or window. `Persistence` wraps the store failure unchanged.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(std::string::String),
    #[error("{0}")]
    NotFound(std::string::String),
    #[error("Persistence failure: {0}")]
    Persistence(#[source] DBError),
}

impl From<DBError> for ServiceError {
    fn from(err: DBError) -> Self {
        match err {
            DBError::ReadingNotFound(_) => ServiceError::NotFound(err.to_string()),
            DBError::SQLError(_) => ServiceError::Persistence(err),
        }
    }
}

impl From<ReadingError> for ServiceError {
    fn from(err: ReadingError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}
