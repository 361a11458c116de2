use super::Store;
use crate::error::{Error, Result};
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// JSON document on disk holding a flat string map.
///
/// Every call re-reads the file, and writes land in a temp file that is then
/// renamed over the original. A missing or corrupt document reads as empty.
/// There is no locking between processes.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(err) => {
                warn!("Failed to read {}: {err}", self.path.display());
                return BTreeMap::new();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!("Ignoring corrupt store {}: {err}", self.path.display());
            BTreeMap::new()
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let storage_error =
            |err: std::io::Error| Error::Storage(format!("{}: {err}", self.path.display()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(storage_error)?;
        }

        let payload = serde_json::to_string_pretty(entries)
            .map_err(|err| Error::Serialization(format!("Failed to encode store: {err}")))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        write_private(&tmp, payload.as_bytes()).map_err(storage_error)?;
        fs::rename(&tmp, &self.path).map_err(storage_error)?;

        debug!("store written: {}", self.path.display());
        Ok(())
    }
}

/// Writes `contents` readable by the owner only (0600 on unix); the store holds
/// bearer and refresh tokens.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()?;

    // `mode` only applies on creation; a leftover temp file keeps its old bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load();
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.load();
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.save(&BTreeMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn persists_across_instances() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("storage.json");

        FileStore::new(&path).set("auth_token", "T1")?;

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("auth_token").as_deref(), Some("T1"));
        assert_eq!(reopened.get("user"), None);
        Ok(())
    }

    #[test]
    fn missing_file_reads_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path().join("absent.json"));

        assert_eq!(store.get("auth_token"), None);
        store.remove("auth_token")?;
        assert!(!store.path().exists());
        Ok(())
    }

    #[test]
    fn corrupt_file_reads_empty_and_is_replaced() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json")?;

        let store = FileStore::new(&path);
        assert_eq!(store.get("user"), None);

        store.set("theme", "dark")?;
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn store_file_is_private_to_owner() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("storage.json");

        // A stale temp file with open permissions must not leak its mode.
        fs::write(dir.path().join("storage.json.tmp"), "{}")?;
        fs::set_permissions(
            dir.path().join("storage.json.tmp"),
            fs::Permissions::from_mode(0o644),
        )?;

        FileStore::new(&path).set("auth_token", "T1")?;

        let mode = fs::metadata(&path)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }

    #[test]
    fn remove_and_clear() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path().join("storage.json"));

        store.set("auth_token", "T1")?;
        store.set("language", "en_US")?;
        store.remove("auth_token")?;

        assert_eq!(store.get("auth_token"), None);
        assert_eq!(store.get("language").as_deref(), Some("en_US"));

        store.clear()?;
        assert_eq!(store.get("language"), None);
        Ok(())
    }
}
