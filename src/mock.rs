//! In-memory fakes for hardware-free testing
//!
//! Mirrors the real store/source/device boundaries so the engine's
//! resolution logic can be exercised without a controller or a
//! filesystem.

use crate::device::{ConnectionType, DeviceHandle};
use crate::error::{Error, Result};
use crate::source::CalibrationSource;
use crate::store::CalibrationStore;
use crate::types::DeviceIdentity;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fake device handle with a fixed identity and connection mode
#[derive(Debug, Clone)]
pub struct MockDevice {
    identity: DeviceIdentity,
    connection: ConnectionType,
}

impl MockDevice {
    /// Create a fake device
    pub fn new(identity: impl Into<DeviceIdentity>, connection: ConnectionType) -> Self {
        MockDevice {
            identity: identity.into(),
            connection,
        }
    }

    /// Fake device on a wired link
    pub fn wired(identity: &str) -> Self {
        Self::new(identity, ConnectionType::Wired)
    }

    /// Fake device on a wireless link
    pub fn wireless(identity: &str) -> Self {
        Self::new(identity, ConnectionType::Wireless)
    }
}

impl DeviceHandle for MockDevice {
    fn identity(&self) -> DeviceIdentity {
        self.identity.clone()
    }

    fn connection(&self) -> ConnectionType {
        self.connection
    }
}

/// In-memory calibration store
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    entries: HashMap<DeviceIdentity, Vec<u8>>,
    read_only: bool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an entry
    pub fn insert(&self, identity: impl Into<DeviceIdentity>, blob: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.insert(identity.into(), blob.to_vec());
    }

    /// Make subsequent saves fail, simulating read-only storage
    pub fn set_read_only(&self, read_only: bool) {
        self.inner.lock().unwrap().read_only = read_only;
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// True when no entries are cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CalibrationStore for MemoryStore {
    fn load(&self, identity: &DeviceIdentity) -> Option<Vec<u8>> {
        self.inner.lock().unwrap().entries.get(identity).cloned()
    }

    fn save(&self, identity: &DeviceIdentity, blob: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.read_only {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "store is read-only",
            )));
        }
        inner.entries.insert(identity.clone(), blob.to_vec());
        Ok(())
    }
}

/// Fake calibration source serving a canned blob.
///
/// Tracks how many fetches were attempted so tests can assert the
/// engine's wired-only gating.
#[derive(Clone, Default)]
pub struct MockSource {
    inner: Arc<Mutex<MockSourceInner>>,
}

#[derive(Default)]
struct MockSourceInner {
    blob: Option<Vec<u8>>,
    fetch_count: usize,
}

impl MockSource {
    /// Source with no blob available (every fetch fails)
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Source serving the given blob
    pub fn with_blob(blob: &[u8]) -> Self {
        let source = Self::default();
        source.inner.lock().unwrap().blob = Some(blob.to_vec());
        source
    }

    /// Number of fetch attempts observed
    pub fn fetch_count(&self) -> usize {
        self.inner.lock().unwrap().fetch_count
    }
}

impl CalibrationSource for MockSource {
    fn fetch(&self, device: &dyn DeviceHandle) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock().unwrap();
        inner.fetch_count += 1;
        if !device.connection().is_wired() {
            return Err(Error::Unavailable(
                "calibration report requires a wired link".to_string(),
            ));
        }
        inner
            .blob
            .clone()
            .ok_or_else(|| Error::Unavailable("device returned no calibration report".to_string()))
    }
}

/// Synthetic calibration blob fixtures
pub mod blob_fixture {
    use crate::profile::{BLOB_LEN, BLOB_VERSION};

    /// Builder for synthetic calibration blobs.
    ///
    /// Starts from well-formed constants on every axis; individual axes
    /// can be overridden to exercise degenerate cases.
    pub struct BlobBuilder {
        data: [u8; BLOB_LEN],
    }

    /// Builder pre-filled with typical constants:
    /// accel ±4096 raw at ±1 g, gyro rest 0 / 6000 raw at 90 deg/s,
    /// mag ±2048 raw endpoints.
    pub fn builder() -> BlobBuilder {
        let mut b = BlobBuilder {
            data: [0u8; BLOB_LEN],
        };
        b.data[0] = BLOB_VERSION;
        for axis in 0..3 {
            b = b
                .accel_axis(axis, -4096, 4096)
                .gyro_axis(axis, 0, 6000)
                .mag_axis(axis, -2048, 2048);
        }
        b
    }

    /// A fully well-formed blob with the builder defaults
    pub fn typical() -> Vec<u8> {
        builder().build()
    }

    impl BlobBuilder {
        fn put_i16(&mut self, offset: usize, value: i16) {
            self.data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        }

        /// Set accelerometer min/max for one axis (0..3)
        pub fn accel_axis(mut self, axis: usize, min: i16, max: i16) -> Self {
            self.put_i16(2 + axis * 4, min);
            self.put_i16(2 + axis * 4 + 2, max);
            self
        }

        /// Set gyro rest reading and reading at 90 deg/s for one axis
        pub fn gyro_axis(mut self, axis: usize, rest: i16, at_rate: i16) -> Self {
            self.put_i16(14 + axis * 2, rest);
            self.put_i16(20 + axis * 2, at_rate);
            self
        }

        /// Set magnetometer min/max for one axis
        pub fn mag_axis(mut self, axis: usize, min: i16, max: i16) -> Self {
            self.put_i16(26 + axis * 4, min);
            self.put_i16(26 + axis * 4 + 2, max);
            self
        }

        /// Override the version byte
        pub fn version(mut self, version: u8) -> Self {
            self.data[0] = version;
            self
        }

        /// Finish the blob
        pub fn build(self) -> Vec<u8> {
            self.data.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let id = DeviceIdentity::new("aa");
        assert!(store.load(&id).is_none());

        store.save(&id, &[1, 2, 3]).unwrap();
        assert_eq!(store.load(&id).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_read_only_store_rejects_save() {
        let store = MemoryStore::new();
        store.set_read_only(true);
        let err = store.save(&DeviceIdentity::new("aa"), &[1]).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_source_refuses_wireless_fetch() {
        let source = MockSource::with_blob(&blob_fixture::typical());
        let device = MockDevice::wireless("bb");
        let err = source.fetch(&device).unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
    }

    #[test]
    fn test_fixture_blob_has_expected_layout() {
        let blob = blob_fixture::typical();
        assert_eq!(blob.len(), crate::profile::BLOB_LEN);
        assert_eq!(blob[0], crate::profile::BLOB_VERSION);
    }
}
