//! Calibration engine
//!
//! Owns at most one parsed [`CalibrationProfile`] and exposes the
//! raw-to-calibrated mapping. Resolution happens once, at construction:
//! cached blob first, then a wired-only fetch from the device, then
//! nothing. Both terminal outcomes (calibrated, unsupported) are valid
//! steady states; uncalibrated operation is expected, not an error.

use crate::device::DeviceHandle;
use crate::error::{Error, Result};
use crate::profile::CalibrationProfile;
use crate::source::CalibrationSource;
use crate::store::CalibrationStore;
use crate::types::{DeviceIdentity, VALID_ARITIES};
use std::io::{self, Write};

/// Per-device calibration engine.
///
/// Construct once per device session with [`CalibrationEngine::new`].
/// The device handle is borrowed only during construction; afterwards
/// the engine is self-contained and [`map`](Self::map) is pure
/// computation. Disposal is `Drop`.
pub struct CalibrationEngine {
    identity: DeviceIdentity,
    profile: Option<CalibrationProfile>,
}

impl CalibrationEngine {
    /// Resolve calibration for a device.
    ///
    /// Resolution order:
    /// 1. Cached blob from the store, if it parses.
    /// 2. On miss or parse failure, and only over a wired link, a
    ///    single fetch from the source, parsed and saved back
    ///    (best-effort; a failed save only logs a warning).
    /// 3. Otherwise the engine holds no profile and
    ///    [`supported`](Self::supported) reports false.
    ///
    /// Never fails: every acquisition failure degrades to an engine
    /// without calibration.
    pub fn new(
        device: &dyn DeviceHandle,
        store: &dyn CalibrationStore,
        source: &dyn CalibrationSource,
    ) -> Self {
        let identity = device.identity();

        if let Some(blob) = store.load(&identity) {
            match CalibrationProfile::parse(&blob) {
                Ok(profile) => {
                    log::info!("Loaded cached calibration for {}", identity);
                    return CalibrationEngine {
                        identity,
                        profile: Some(profile),
                    };
                }
                Err(e) => {
                    log::warn!("Cached calibration for {} unreadable: {}", identity, e);
                }
            }
        }

        let profile = if device.connection().is_wired() {
            Self::fetch_and_adopt(device, store, source, &identity)
        } else {
            log::info!(
                "No cached calibration for {} and link is wireless; pair over USB to fetch",
                identity
            );
            None
        };

        CalibrationEngine { identity, profile }
    }

    /// Single bounded fetch from the device, with best-effort save-back
    fn fetch_and_adopt(
        device: &dyn DeviceHandle,
        store: &dyn CalibrationStore,
        source: &dyn CalibrationSource,
        identity: &DeviceIdentity,
    ) -> Option<CalibrationProfile> {
        let blob = match source.fetch(device) {
            Ok(blob) => blob,
            Err(e) => {
                log::warn!("Calibration fetch from {} failed: {}", identity, e);
                return None;
            }
        };
        let profile = match CalibrationProfile::parse(&blob) {
            Ok(profile) => profile,
            Err(e) => {
                log::warn!("Calibration from {} is malformed: {}", identity, e);
                return None;
            }
        };
        if let Err(e) = store.save(identity, &blob) {
            // Degrades to fetch-every-session behavior
            log::warn!("Could not cache calibration for {}: {}", identity, e);
        }
        log::info!("Fetched calibration from {}", identity);
        Some(profile)
    }

    /// Identity of the device this engine was built for
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// True iff a valid profile is held
    pub fn supported(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.valid)
    }

    /// The held profile, if any. Exposed for diagnostics; mapping goes
    /// through [`map`](Self::map).
    pub fn profile(&self) -> Option<&CalibrationProfile> {
        self.profile.as_ref()
    }

    /// Map raw sensor values to calibrated values.
    ///
    /// `input` holds raw readings in fixed order: accel x,y,z, then
    /// gyro x,y,z (if present), then mag x,y,z (if present). Arity must
    /// be 3, 6 or 9 and `output` must be pre-sized to match. Each axis
    /// maps as `(raw - bias) * scale`; a degraded gyro/mag group maps
    /// as `raw * scale` with no bias correction (reduced accuracy).
    ///
    /// Fails with [`Error::Unsupported`] when no valid profile is held
    /// or the arity is not permitted; `output` is untouched on failure.
    /// Pure function: no side effects, stable across calls.
    pub fn map(&self, input: &[i32], output: &mut [f32]) -> Result<()> {
        let profile = match &self.profile {
            Some(p) if p.valid => p,
            _ => return Err(Error::Unsupported),
        };
        let n = input.len();
        if !VALID_ARITIES.contains(&n) || output.len() != n {
            return Err(Error::Unsupported);
        }

        let groups = [&profile.accel, &profile.gyro, &profile.mag];
        for (g, group) in groups.iter().enumerate().take(n / 3) {
            for axis in 0..3 {
                let i = g * 3 + axis;
                let raw = input[i] as f32;
                let cal = group.axes[axis];
                output[i] = if group.usable {
                    (raw - cal.bias) * cal.scale
                } else {
                    raw * cal.scale
                };
            }
        }
        Ok(())
    }

    /// Allocating form of [`map`](Self::map)
    pub fn map_vec(&self, input: &[i32]) -> Result<Vec<f32>> {
        let mut output = vec![0.0; input.len()];
        self.map(input, &mut output)?;
        Ok(output)
    }

    /// Write the held constants as a human-readable table.
    ///
    /// Debug aid; the format is not contractual.
    pub fn write_dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "Calibration for {}:", self.identity)?;
        let profile = match &self.profile {
            Some(p) => p,
            None => {
                writeln!(w, "  no calibration data (pair over USB to fetch)")?;
                return Ok(());
            }
        };
        writeln!(w, "  valid: {}", profile.valid)?;
        for (name, group) in [
            ("accel", &profile.accel),
            ("gyro", &profile.gyro),
            ("mag", &profile.mag),
        ] {
            let state = if group.usable { "ok" } else { "degraded" };
            writeln!(w, "  {} [{}]", name, state)?;
            for (axis, cal) in ["x", "y", "z"].iter().zip(group.axes.iter()) {
                writeln!(
                    w,
                    "    {}: bias {:>10.3} scale {:>12.6}",
                    axis, cal.bias, cal.scale
                )?;
            }
        }
        Ok(())
    }

    /// Dump the held constants to stdout, suppressing write errors
    pub fn dump(&self) {
        let _ = self.write_dump(&mut io::stdout());
    }
}
