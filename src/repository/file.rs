//! File Repository
//!
//! Stores one file per item. The file name carries the expiration and the
//! key as `<YYYYmmddHHMMSS>.<key>.<extension>`; the body is the item as JSON.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::Item;
use crate::error::{CacheError, Result};
use crate::repository::SimpleRepository;

// == Public Constants ==
/// Extension used when none is configured
pub const DEFAULT_EXTENSION: &str = "cache";

/// chrono format of the expiration stamp in file names
const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Minimum number of digits in an expiration stamp, after an optional sign
const STAMP_LEN: usize = 14;

// == File Repository ==
/// Single-key backend persisting items in a directory.
#[derive(Debug, Clone)]
pub struct FileRepository {
    /// Canonical storage directory
    directory: PathBuf,
    /// File extension including the leading dot
    extension: String,
}

impl FileRepository {
    // == Constructor ==
    /// Creates a repository using the default `cache` extension.
    pub fn new(directory: impl AsRef<Path>) -> Result<Self> {
        Self::with_extension(directory, DEFAULT_EXTENSION)
    }

    /// Creates a repository with a custom file extension.
    ///
    /// `*` is stripped from the extension so that a key can never widen a
    /// lookup to unrelated files.
    ///
    /// # Errors
    /// `InvalidArgument` if `directory` is not an existing, writable directory.
    pub fn with_extension(directory: impl AsRef<Path>, extension: &str) -> Result<Self> {
        let directory = directory.as_ref();

        let metadata = fs::metadata(directory).map_err(|_| {
            CacheError::InvalidArgument(format!(
                "{} must be an existing directory",
                directory.display()
            ))
        })?;

        if !metadata.is_dir() {
            return Err(CacheError::InvalidArgument(format!(
                "{} must be an existing directory",
                directory.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(CacheError::InvalidArgument(format!(
                "directory {} must be writable",
                directory.display()
            )));
        }

        let directory = directory.canonicalize().map_err(|e| {
            CacheError::InvalidArgument(format!("{}: {}", directory.display(), e))
        })?;

        Ok(Self {
            directory,
            extension: format!(".{}", extension.replace('*', "")),
        })
    }

    /// Returns the storage directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the file name an item is stored under.
    pub fn file_name<V>(&self, item: &Item<V>) -> String {
        format!(
            "{}.{}{}",
            item.expiration().format(STAMP_FORMAT),
            item.key(),
            self.extension
        )
    }

    // == Lookup ==
    /// Extracts the key from a file name that follows the naming scheme.
    fn key_of<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let stem = file_name.strip_suffix(self.extension.as_str())?;
        let (stamp, key) = stem.split_once('.')?;

        // chrono signs years outside 0000-9999
        let digits = stamp.strip_prefix(['+', '-']).unwrap_or(stamp);
        let valid_stamp =
            digits.len() >= STAMP_LEN && digits.bytes().all(|b| b.is_ascii_digit());
        (valid_stamp && !key.is_empty()).then_some(key)
    }

    /// Lists the files stored for `key`, or every cache file when None.
    fn find_files(&self, key: Option<&str>) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("File cache: cannot read {}: {}", self.directory.display(), e);
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let name = entry.file_name();
                match (name.to_str().and_then(|n| self.key_of(n)), key) {
                    (Some(found), Some(wanted)) => found == wanted,
                    (Some(_), None) => true,
                    (None, _) => false,
                }
            })
            .map(|entry| entry.path())
            .collect();

        files.sort();
        files
    }

    fn find_file(&self, key: &str) -> Option<PathBuf> {
        self.find_files(Some(key)).into_iter().next()
    }

    /// Removes files, treating already-missing files as removed.
    fn remove_files(&self, files: Vec<PathBuf>) -> bool {
        let mut result = true;
        for path in files {
            match fs::remove_file(&path) {
                Ok(()) => debug!("File cache: removed {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!("File cache: cannot remove {}: {}", path.display(), e);
                    result = false;
                }
            }
        }
        result
    }
}

impl<V> SimpleRepository<V> for FileRepository
where
    V: Serialize + DeserializeOwned,
{
    fn contains(&self, key: &str) -> bool {
        self.find_file(key).is_some()
    }

    fn fetch(&self, key: &str) -> Option<Item<V>> {
        let path = self.find_file(key)?;

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("File cache: cannot read {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<Item<V>>(&bytes) {
            Ok(mut item) => {
                item.mark_cached();
                Some(item)
            }
            Err(e) => {
                warn!("File cache: cannot decode {}: {}", path.display(), e);
                None
            }
        }
    }

    fn store(&mut self, item: &Item<V>) -> bool {
        if !SimpleRepository::<V>::delete(self, item.key()) {
            return false;
        }

        let body = match serde_json::to_vec(item) {
            Ok(body) => body,
            Err(e) => {
                warn!("File cache: cannot encode {}: {}", item.key(), e);
                return false;
            }
        };

        let path = self.directory.join(self.file_name(item));
        match fs::write(&path, body) {
            Ok(()) => {
                debug!("File cache: stored {}", path.display());
                true
            }
            Err(e) => {
                warn!("File cache: cannot write {}: {}", path.display(), e);
                false
            }
        }
    }

    fn delete(&mut self, key: &str) -> bool {
        self.remove_files(self.find_files(Some(key)))
    }

    fn clear(&mut self) -> bool {
        self.remove_files(self.find_files(None))
    }
}
