use crate::config::ConfigPathError;
use crate::location::LocationError;
use crate::state::StateError;
use crate::storage::StorageError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error("cannot resolve data directory: {0}")]
    ConfigPath(#[from] ConfigPathError),
    #[error("console io error: {0}")]
    Io(#[from] std::io::Error),
}
