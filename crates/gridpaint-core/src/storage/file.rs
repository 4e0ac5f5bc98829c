//! Paintings stored as JSON files in one directory.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::painting::Painting;
use std::fs;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";
const PARTIAL_EXTENSION: &str = "json.partial";

/// Stores each painting as `<id>.json` under a base directory.
///
/// Characters outside `[A-Za-z0-9_-]` in ids are replaced by `_` in file
/// names. Writes go to a sibling file first and are renamed into place, so
/// an interrupted save leaves the previous version readable.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open a storage directory, creating it if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|source| StorageError::Io {
            action: "create",
            path: base_path.clone(),
            source,
        })?;
        Ok(Self { base_path })
    }

    /// Open `gridpaint/paintings` under the platform's local data directory.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or(StorageError::NoDataDir)?;
        Self::new(base.join("gridpaint").join("paintings"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn painting_path(&self, id: &str, extension: &str) -> PathBuf {
        let file_stem: String = id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{file_stem}.{extension}"))
    }
}

fn write_atomically(path: &Path, partial: &Path, contents: &str) -> StorageResult<()> {
    fs::write(partial, contents).map_err(|source| StorageError::Io {
        action: "write",
        path: partial.to_path_buf(),
        source,
    })?;
    fs::rename(partial, path).map_err(|source| StorageError::Io {
        action: "replace",
        path: path.to_path_buf(),
        source,
    })
}

impl Storage for FileStorage {
    fn save(&self, id: &str, painting: &Painting) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.painting_path(id, EXTENSION);
        let partial = self.painting_path(id, PARTIAL_EXTENSION);
        let json = painting.to_json();

        Box::pin(async move {
            let json = json.map_err(|source| StorageError::Json {
                path: path.clone(),
                source,
            })?;
            write_atomically(&path, &partial, &json)?;
            log::debug!("Saved painting to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Painting>> {
        let path = self.painting_path(id, EXTENSION);
        let id = id.to_string();

        Box::pin(async move {
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(StorageError::NotFound(id));
                }
                Err(source) => {
                    return Err(StorageError::Io {
                        action: "read",
                        path,
                        source,
                    });
                }
            };

            Painting::from_json(&json).map_err(|source| {
                log::warn!("Unreadable painting file {}: {}", path.display(), source);
                StorageError::Json { path, source }
            })
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            let entries = fs::read_dir(&base).map_err(|source| StorageError::Io {
                action: "read",
                path: base.clone(),
                source,
            })?;

            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == EXTENSION))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }
}
