//! gati-calib - Sensor calibration engine for handheld motion controllers
//!
//! Converts raw integer readings from a controller's inertial/magnetic
//! sensors into calibrated values (accelerometer in g, gyroscope in
//! deg/s, magnetometer normalized), using per-device constants the
//! firmware stores internally. Constants are cached on disk per device
//! and fetched over a wired link when not cached.
//!
//! Device transport and orientation fusion live outside this crate;
//! they meet it at the [`DeviceHandle`](device::DeviceHandle) and
//! [`CalibrationSource`](source::CalibrationSource) traits.
//!
//! ```no_run
//! use gati_calib::{CalibrationEngine, FsStore};
//! # use gati_calib::mock::{MockDevice, MockSource};
//!
//! # let device = MockDevice::wired("00:06:f7:aa:bb:cc");
//! # let source = MockSource::unavailable();
//! let store = FsStore::new("/var/lib/gati-calib");
//! let engine = CalibrationEngine::new(&device, &store, &source);
//! if engine.supported() {
//!     let calibrated = engine.map_vec(&[120, -80, 4100]).unwrap();
//!     println!("accel: {:?} g", calibrated);
//! }
//! ```

pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod mock;
pub mod profile;
pub mod source;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::CalibConfig;
pub use device::{ConnectionType, DeviceHandle};
pub use engine::CalibrationEngine;
pub use error::{Error, Result};
pub use profile::CalibrationProfile;
pub use source::CalibrationSource;
pub use store::{CalibrationStore, FsStore};
pub use types::DeviceIdentity;
