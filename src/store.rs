//! Persistent calibration cache
//!
//! Pure storage keyed by device identity: the blob is opaque here and
//! meaningful only to the parser. Corrupt or unreadable entries are
//! treated as cache misses, never as fatal errors.

use crate::config::CalibConfig;
use crate::error::Result;
use crate::types::DeviceIdentity;
use std::fs;
use std::path::{Path, PathBuf};

/// Calibration blob cache keyed by device identity
pub trait CalibrationStore {
    /// Previously cached blob for this identity, or `None` if never
    /// cached or unreadable
    fn load(&self, identity: &DeviceIdentity) -> Option<Vec<u8>>;

    /// Persist a blob, overwriting any prior entry for this identity
    fn save(&self, identity: &DeviceIdentity, blob: &[u8]) -> Result<()>;
}

/// Filesystem-backed store: one `<identity>.calib` file per device
/// under a cache directory.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Store rooted at the given directory. The directory is created
    /// lazily on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsStore { root: root.into() }
    }

    /// Store rooted at the configured cache directory
    pub fn from_config(config: &CalibConfig) -> Self {
        Self::new(&config.cache_dir)
    }

    /// Cache directory this store reads and writes
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, identity: &DeviceIdentity) -> PathBuf {
        self.root.join(format!("{}.calib", identity.file_stem()))
    }
}

impl CalibrationStore for FsStore {
    fn load(&self, identity: &DeviceIdentity) -> Option<Vec<u8>> {
        let path = self.entry_path(identity);
        match fs::read(&path) {
            Ok(blob) => {
                log::debug!("Loaded cached calibration for {} from {:?}", identity, path);
                Some(blob)
            }
            Err(e) => {
                log::debug!("No cached calibration for {}: {}", identity, e);
                None
            }
        }
    }

    fn save(&self, identity: &DeviceIdentity, blob: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.entry_path(identity);

        // Write-then-rename keeps concurrent readers off half-written
        // entries; same-key writers serialize at the rename with
        // last-writer-wins.
        let tmp = self
            .root
            .join(format!("{}.calib.tmp{}", identity.file_stem(), std::process::id()));
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &path)?;

        log::debug!("Cached calibration for {} at {:?}", identity, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        let id = DeviceIdentity::new("00:06:f7:aa:bb:cc");

        store.save(&id, &[0xde, 0xad, 0xbe, 0xef]).unwrap();
        assert_eq!(store.load(&id).unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_load_missing_entry_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        assert!(store.load(&DeviceIdentity::new("unknown")).is_none());
    }

    #[test]
    fn test_save_overwrites_prior_entry() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        let id = DeviceIdentity::new("dev");

        store.save(&id, &[1, 1, 1]).unwrap();
        store.save(&id, &[2, 2]).unwrap();
        assert_eq!(store.load(&id).unwrap(), vec![2, 2]);
    }

    #[test]
    fn test_distinct_identities_get_distinct_entries() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        store.save(&DeviceIdentity::new("a"), &[1]).unwrap();
        store.save(&DeviceIdentity::new("b"), &[2]).unwrap();

        assert_eq!(store.load(&DeviceIdentity::new("a")).unwrap(), vec![1]);
        assert_eq!(store.load(&DeviceIdentity::new("b")).unwrap(), vec![2]);
    }

    #[test]
    fn test_identity_sanitization_shares_one_entry() {
        // Colons sanitize to underscores, so the same address always
        // maps to the same file.
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        let id = DeviceIdentity::new("aa:bb");

        store.save(&id, &[7]).unwrap();
        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_save_into_missing_root_creates_it() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path().join("nested").join("cache"));
        let id = DeviceIdentity::new("dev");

        store.save(&id, &[9]).unwrap();
        assert_eq!(store.load(&id).unwrap(), vec![9]);
    }

    #[test]
    fn test_save_failure_is_reported_not_panicked() {
        // Root path occupied by a plain file: create_dir_all fails.
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let store = FsStore::new(&blocker);
        let result = store.save(&DeviceIdentity::new("dev"), &[1]);
        assert!(result.is_err());
    }
}
