use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use relative_path::{RelativePath, RelativePathBuf};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{Image, Page, Partner, Post, Testimonial};
use crate::store::{ItemId, Record, Remote, RemoteError, Store};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid content directory: {0}")]
    InvalidContentDir(String),
    #[error("Malformed collection {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// An entity persisted as one JSON file in the content directory
pub trait Stored: Record + Serialize + DeserializeOwned {
    const FILE_NAME: &'static str;
}

impl Stored for Image {
    const FILE_NAME: &'static str = "images.json";
}

impl Stored for Page {
    const FILE_NAME: &'static str = "pages.json";
}

impl Stored for Partner {
    const FILE_NAME: &'static str = "partners.json";
}

impl Stored for Post {
    const FILE_NAME: &'static str = "posts.json";
}

impl Stored for Testimonial {
    const FILE_NAME: &'static str = "testimonials.json";
}

/// A persisted row: the entity fields plus its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saved<T> {
    pub id: ItemId,
    #[serde(flatten)]
    pub item: T,
}

/// Read a file relative to the content directory
pub fn read_file(relative_path: &RelativePath, content_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(content_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write a file relative to the content directory
pub fn write_file(
    relative_path: &RelativePath,
    content_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(content_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

pub fn validate_content_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidContentDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}

/// JSON file backend for one collection.
///
/// Every successful call rewrites the whole file; a failed write leaves
/// both the file and the in-memory rows as they were.
#[derive(Debug)]
pub struct JsonCollection<T> {
    content_root: PathBuf,
    relative_path: RelativePathBuf,
    rows: Vec<Saved<T>>,
}

impl<T: Stored> JsonCollection<T> {
    /// Load `T::FILE_NAME` from the content directory; a missing file is an empty collection
    pub fn load(content_root: &Path) -> Result<Self, IoError> {
        validate_content_dir(content_root)?;

        let relative_path = RelativePathBuf::from(T::FILE_NAME);
        let rows = match read_file(&relative_path, content_root) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| IoError::Json {
                    path: relative_path.to_path(content_root),
                    source,
                })?
            }
            Err(IoError::NotFound(path)) => {
                debug!("{} does not exist yet, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            content_root: content_root.to_path_buf(),
            relative_path,
            rows,
        })
    }

    pub fn rows(&self) -> &[Saved<T>] {
        &self.rows
    }

    /// Optimistic store seeded with the persisted rows
    pub fn to_store(&self) -> Store<T> {
        Store::from_saved(self.rows.iter().map(|row| (row.id, row.item.clone())))
    }

    fn save(&self) -> Result<(), IoError> {
        let content = serde_json::to_string_pretty(&self.rows).map_err(|source| IoError::Json {
            path: self.relative_path.to_path(&self.content_root),
            source,
        })?;
        write_file(&self.relative_path, &self.content_root, &content)
    }

    /// Apply `change` to the rows and persist, restoring the rows if either step fails
    fn transact<R>(
        &mut self,
        change: impl FnOnce(&mut Vec<Saved<T>>) -> Result<R, RemoteError>,
    ) -> Result<R, RemoteError> {
        let backup = self.rows.clone();
        let result = change(&mut self.rows).and_then(|value| {
            self.save().map_err(|e| {
                warn!("failed to write {}: {e}", self.relative_path);
                RemoteError::Unavailable(e.to_string())
            })?;
            Ok(value)
        });
        if result.is_err() {
            self.rows = backup;
        }
        result
    }
}

fn index_of<T>(rows: &[Saved<T>], id: ItemId) -> Result<usize, RemoteError> {
    rows.iter()
        .position(|row| row.id == id)
        .ok_or(RemoteError::NotFound(id))
}

impl<T: Stored> Remote<T> for JsonCollection<T> {
    fn create(&mut self, item: &T) -> Result<ItemId, RemoteError> {
        item.validate()
            .map_err(|e| RemoteError::Rejected(e.to_string()))?;
        self.transact(|rows| {
            let id = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
            rows.push(Saved {
                id,
                item: item.clone(),
            });
            Ok(id)
        })
    }

    fn update(&mut self, id: ItemId, item: &T) -> Result<(), RemoteError> {
        item.validate()
            .map_err(|e| RemoteError::Rejected(e.to_string()))?;
        self.transact(|rows| {
            let index = index_of(rows, id)?;
            rows[index].item = item.clone();
            Ok(())
        })
    }

    fn delete(&mut self, id: ItemId) -> Result<(), RemoteError> {
        self.transact(|rows| {
            let index = index_of(rows, id)?;
            rows.remove(index);
            Ok(())
        })
    }

    fn reorder(&mut self, order: &[ItemId]) -> Result<(), RemoteError> {
        self.transact(|rows| {
            if let Some(unknown) = order.iter().find(|id| index_of(rows, **id).is_err()) {
                return Err(RemoteError::NotFound(*unknown));
            }
            let rank = |id: ItemId| {
                order
                    .iter()
                    .position(|candidate| *candidate == id)
                    .unwrap_or(usize::MAX)
            };
            rows.sort_by_key(|row| rank(row.id));
            Ok(())
        })
    }
}
