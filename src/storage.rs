use crate::error::{Error, Result};
use linked_hash_map::LinkedHashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key under which the command line front end keeps its saved run.
pub const SNAPSHOT_KEY: &str = "pageReplacementSimState";

/// The `Storage` struct is a small key/value store persisted as a single JSON object on disk. It
/// holds opaque snapshot blobs under string keys and knows nothing about their content; parsing
/// and validating a blob is the caller's business.
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Create a new instance of the `Storage` struct backed by `filename`. The file is only
    /// created on the first `put`.
    pub fn build<P: AsRef<Path>>(filename: P) -> Self {
        Self {
            path: filename.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch the blob stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Fails with `Error::Io` if the store exists but cannot be read, and with
    /// `Error::MalformedSnapshot` if its content is not a JSON object of strings.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.read_entries()?;
        Ok(entries.remove(key))
    }

    /// Store `blob` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Fails with `Error::Io` if the store cannot be written.
    pub fn put(&self, key: &str, blob: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(String::from(key), String::from(blob));
        self.write_entries(&entries)?;
        debug!("stored {} bytes under '{}' in {:?}", blob.len(), key, self.path);
        Ok(())
    }

    /// Drop the blob stored under `key`. Returns whether anything was removed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.read_entries()?;
        let removed = entries.remove(key).is_some();
        if removed {
            self.write_entries(&entries)?;
        }
        Ok(removed)
    }

    fn read_entries(&self) -> Result<LinkedHashMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(LinkedHashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(LinkedHashMap::new()),
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn write_entries(&self, entries: &LinkedHashMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
