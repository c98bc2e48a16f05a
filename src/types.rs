//! Common data types

use std::fmt;

/// Sample arities accepted by the mapping stage.
///
/// The first three slots of a raw sample are always the accelerometer,
/// the next three (if present) the gyroscope, the last three (if
/// present) the magnetometer.
pub const VALID_ARITIES: [usize; 3] = [3, 6, 9];

/// Stable identifier for one physical controller.
///
/// Typically the Bluetooth address or serial string reported by the
/// device. Used as the calibration cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceIdentity(String);

impl DeviceIdentity {
    /// Create an identity from a serial/address string
    pub fn new(id: impl Into<String>) -> Self {
        DeviceIdentity(id.into())
    }

    /// The raw identity string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filename-safe form of the identity.
    ///
    /// Serial strings commonly contain `:` (Bluetooth addresses), which
    /// is not portable in filenames. Anything outside `[A-Za-z0-9_-]`
    /// maps to `_`.
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceIdentity {
    fn from(s: &str) -> Self {
        DeviceIdentity::new(s)
    }
}
