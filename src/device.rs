//! Device handle boundary trait
//!
//! The actual transport (enumeration, HID reports, connection-mode
//! detection) lives outside this crate. The calibration engine only
//! needs two facts about a device: who it is, and whether the link is
//! direct (wired) or indirect (wireless).

use crate::types::DeviceIdentity;

/// How the controller is connected to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    /// Direct wired link (USB). Calibration constants can be fetched.
    Wired,
    /// Indirect wireless link (Bluetooth). Fetch is not possible.
    Wireless,
}

impl ConnectionType {
    /// True for a direct link over which calibration can be fetched
    pub fn is_wired(&self) -> bool {
        matches!(self, ConnectionType::Wired)
    }
}

/// Borrowed view of an open controller.
///
/// The engine borrows a handle for the duration of construction only;
/// it never owns or outlives the handle.
pub trait DeviceHandle {
    /// Stable identity of this controller (cache key)
    fn identity(&self) -> DeviceIdentity;

    /// Current connection mode
    fn connection(&self) -> ConnectionType;
}
