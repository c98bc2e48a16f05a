//! Calibration blob parsing and derived per-axis constants
//!
//! The controller firmware stores its factory calibration as a small
//! fixed-layout blob. This module parses the blob and derives the
//! bias/scale pair applied to each axis during mapping.
//!
//! # Blob layout (version 1, 38 bytes, little-endian)
//!
//! | offset | field                                                  |
//! |--------|--------------------------------------------------------|
//! | 0      | version byte (`0x01`)                                  |
//! | 1      | reserved                                               |
//! | 2..14  | accel: i16 min,max per axis at the ±1 g endpoints      |
//! | 14..26 | gyro: i16 rest reading per axis, i16 reading at 90°/s  |
//! | 26..38 | mag: i16 min,max per axis over a full sweep            |
//!
//! A future firmware revision with a different layout bumps the version
//! byte; length and version are checked before any field is read.

use crate::error::{Error, Result};

/// Blob layout version understood by this parser
pub const BLOB_VERSION: u8 = 0x01;

/// Exact blob length for version 1
pub const BLOB_LEN: usize = 38;

/// Nominal gyroscope sensitivity (deg/s per LSB, ±2000 deg/s full
/// scale) used when per-device gyro constants are degenerate.
pub const GYRO_NOMINAL_SCALE: f32 = 2000.0 / 32768.0;

/// Nominal magnetometer sensitivity (normalized units per LSB) used
/// when per-device mag constants are degenerate.
pub const MAG_NOMINAL_SCALE: f32 = 1.0 / 2048.0;

/// Reference rate applied to the gyro during factory calibration (deg/s)
const GYRO_REFERENCE_RATE: f32 = 90.0;

/// Bias/scale pair for one axis: `out = (raw - bias) * scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisCal {
    /// Offset subtracted before scaling (raw units)
    pub bias: f32,
    /// Multiplier converting corrected raw units to physical units
    pub scale: f32,
}

/// Calibration for one three-axis sensor group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupCal {
    /// Per-axis constants (x, y, z)
    pub axes: [AxisCal; 3],
    /// False when the stored constants were degenerate and the group
    /// fell back to bias-free nominal scaling
    pub usable: bool,
}

impl GroupCal {
    /// Fallback group: no bias correction, nominal scale on every axis
    fn nominal(scale: f32) -> Self {
        GroupCal {
            axes: [AxisCal { bias: 0.0, scale }; 3],
            usable: false,
        }
    }
}

/// Parsed, validated calibration constants for one controller.
///
/// Immutable after construction. A profile with `valid == false` must
/// never be used for mapping; the engine reports unsupported instead.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationProfile {
    /// Accelerometer constants (output in g)
    pub accel: GroupCal,
    /// Gyroscope constants (output in deg/s)
    pub gyro: GroupCal,
    /// Magnetometer constants (output normalized to [-1, 1])
    pub mag: GroupCal,
    /// True only if the mandatory accelerometer group is usable
    pub valid: bool,
}

impl CalibrationProfile {
    /// Parse a raw calibration blob.
    ///
    /// Fails with [`Error::Malformed`] on a length or version mismatch.
    /// Degenerate gyro/mag constants do not fail the parse; the group
    /// degrades to bias-free nominal scaling and is flagged unusable.
    /// Degenerate accelerometer constants make the whole profile
    /// invalid, since accel calibration is mandatory for any mapping.
    pub fn parse(blob: &[u8]) -> Result<CalibrationProfile> {
        if blob.len() != BLOB_LEN {
            return Err(Error::Malformed(format!(
                "blob length {} (expected {})",
                blob.len(),
                BLOB_LEN
            )));
        }
        if blob[0] != BLOB_VERSION {
            return Err(Error::Malformed(format!(
                "unknown blob version {:#04x}",
                blob[0]
            )));
        }

        let accel = parse_minmax_group(blob, 2);
        let gyro = parse_gyro_group(blob, 14);
        let mag = parse_minmax_group(blob, 26);

        let accel = match accel {
            Some(group) => group,
            None => {
                log::warn!("Accelerometer constants degenerate; profile unusable");
                GroupCal::nominal(1.0)
            }
        };
        let valid = accel.usable;

        let gyro = gyro.unwrap_or_else(|| {
            log::warn!("Gyro constants degenerate; degrading to nominal scale");
            GroupCal::nominal(GYRO_NOMINAL_SCALE)
        });
        let mag = mag.unwrap_or_else(|| {
            log::warn!("Magnetometer constants degenerate; degrading to nominal scale");
            GroupCal::nominal(MAG_NOMINAL_SCALE)
        });

        Ok(CalibrationProfile {
            accel,
            gyro,
            mag,
            valid,
        })
    }
}

fn read_i16(blob: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([blob[offset], blob[offset + 1]])
}

/// Derive one axis from min/max endpoints: the endpoints correspond to
/// ±1 physical unit (±1 g, ±1 normalized), so `bias = midpoint` and
/// `scale = 2 / (max - min)`.
fn minmax_axis(min: i16, max: i16) -> Option<AxisCal> {
    let span = max as f32 - min as f32;
    if span == 0.0 {
        return None;
    }
    let bias = (min as f32 + max as f32) / 2.0;
    let scale = 2.0 / span;
    if !bias.is_finite() || !scale.is_finite() || scale == 0.0 {
        return None;
    }
    Some(AxisCal { bias, scale })
}

/// Parse a min/max encoded group (accel, mag). Returns None if any axis
/// is degenerate.
fn parse_minmax_group(blob: &[u8], offset: usize) -> Option<GroupCal> {
    let mut axes = [AxisCal {
        bias: 0.0,
        scale: 0.0,
    }; 3];
    for axis in 0..3 {
        let min = read_i16(blob, offset + axis * 4);
        let max = read_i16(blob, offset + axis * 4 + 2);
        axes[axis] = minmax_axis(min, max)?;
    }
    Some(GroupCal { axes, usable: true })
}

/// Parse the gyro group: per-axis rest reading plus per-axis reading at
/// the factory reference rate. Returns None if any axis is degenerate.
fn parse_gyro_group(blob: &[u8], offset: usize) -> Option<GroupCal> {
    let mut axes = [AxisCal {
        bias: 0.0,
        scale: 0.0,
    }; 3];
    for axis in 0..3 {
        let rest = read_i16(blob, offset + axis * 2);
        let at_rate = read_i16(blob, offset + 6 + axis * 2);
        let span = at_rate as f32 - rest as f32;
        if span == 0.0 {
            return None;
        }
        let scale = GYRO_REFERENCE_RATE / span;
        if !scale.is_finite() || scale == 0.0 {
            return None;
        }
        axes[axis] = AxisCal {
            bias: rest as f32,
            scale,
        };
    }
    Some(GroupCal { axes, usable: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::blob_fixture;

    #[test]
    fn test_parse_valid_blob() {
        let blob = blob_fixture::typical();
        let profile = CalibrationProfile::parse(&blob).unwrap();

        assert!(profile.valid);
        assert!(profile.accel.usable);
        assert!(profile.gyro.usable);
        assert!(profile.mag.usable);
    }

    #[test]
    fn test_accel_bias_and_scale_from_minmax() {
        // min=-4200, max=3800 -> bias=-200, scale=2/8000
        let blob = blob_fixture::builder()
            .accel_axis(0, -4200, 3800)
            .build();
        let profile = CalibrationProfile::parse(&blob).unwrap();

        let axis = profile.accel.axes[0];
        assert!((axis.bias - (-200.0)).abs() < 1e-6);
        assert!((axis.scale - 2.0 / 8000.0).abs() < 1e-9);
    }

    #[test]
    fn test_gyro_bias_and_scale_from_reference_rate() {
        // rest=12, reading at 90 deg/s = 6012 -> bias=12, scale=90/6000
        let blob = blob_fixture::builder().gyro_axis(1, 12, 6012).build();
        let profile = CalibrationProfile::parse(&blob).unwrap();

        let axis = profile.gyro.axes[1];
        assert!((axis.bias - 12.0).abs() < 1e-6);
        assert!((axis.scale - 90.0 / 6000.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_length_is_malformed() {
        let err = CalibrationProfile::parse(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));

        let err = CalibrationProfile::parse(&[]).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[test]
    fn test_wrong_version_is_malformed() {
        let mut blob = blob_fixture::typical();
        blob[0] = 0x7f;
        let err = CalibrationProfile::parse(&blob).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[test]
    fn test_degenerate_accel_invalidates_profile() {
        // min == max on accel z collapses the span
        let blob = blob_fixture::builder().accel_axis(2, 100, 100).build();
        let profile = CalibrationProfile::parse(&blob).unwrap();

        assert!(!profile.valid);
        assert!(!profile.accel.usable);
        // Other groups unaffected
        assert!(profile.gyro.usable);
        assert!(profile.mag.usable);
    }

    #[test]
    fn test_degenerate_gyro_degrades_but_profile_stays_valid() {
        let blob = blob_fixture::builder().gyro_axis(0, 50, 50).build();
        let profile = CalibrationProfile::parse(&blob).unwrap();

        assert!(profile.valid);
        assert!(!profile.gyro.usable);
        for axis in profile.gyro.axes {
            assert_eq!(axis.bias, 0.0);
            assert_eq!(axis.scale, GYRO_NOMINAL_SCALE);
        }
    }

    #[test]
    fn test_degenerate_mag_degrades_but_profile_stays_valid() {
        let blob = blob_fixture::builder().mag_axis(1, -7, -7).build();
        let profile = CalibrationProfile::parse(&blob).unwrap();

        assert!(profile.valid);
        assert!(!profile.mag.usable);
        for axis in profile.mag.axes {
            assert_eq!(axis.bias, 0.0);
            assert_eq!(axis.scale, MAG_NOMINAL_SCALE);
        }
    }

    #[test]
    fn test_reparse_yields_identical_constants() {
        let blob = blob_fixture::typical();
        let first = CalibrationProfile::parse(&blob).unwrap();
        let second = CalibrationProfile::parse(&blob).unwrap();
        assert_eq!(first, second);
    }
}
