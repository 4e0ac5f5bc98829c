//! Painting persistence.

mod file;

pub use file::FileStorage;

use crate::painting::Painting;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("painting not found: {0}")]
    NotFound(String),
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid painting data in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not determine a data directory")]
    NoDataDir,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A place paintings are saved to and loaded from, keyed by painting id.
pub trait Storage: Send + Sync {
    /// Save a painting, replacing any previous version.
    fn save(&self, id: &str, painting: &Painting) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Painting>>;

    /// Ids of all stored paintings, sorted.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
}
