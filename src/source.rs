//! Calibration source boundary trait
//!
//! The source retrieves the raw calibration blob from a connected
//! controller. Only a direct (wired) link can serve the request; the
//! engine checks the connection mode before calling `fetch`, and a
//! fetch over a wireless link is defined to fail with
//! [`Error::Unavailable`](crate::error::Error::Unavailable).
//!
//! The concrete implementation (HID feature report exchange) lives in
//! the transport layer, outside this crate.

use crate::device::DeviceHandle;
use crate::error::Result;

/// Retrieves raw calibration blobs from a connected device.
///
/// A single bounded request/response exchange; any timeout is owned by
/// the underlying transport. The engine performs no retries: a failed
/// fetch leaves calibration unsupported for that session.
pub trait CalibrationSource {
    /// Fetch the calibration blob from the device
    fn fetch(&self, device: &dyn DeviceHandle) -> Result<Vec<u8>>;
}
