//! Firmware kinematic limits.
//!
//! The estimation planners need the same motion limits the printer firmware
//! enforces: per-axis feedrate and acceleration caps, jerk limits, and the
//! default acceleration. The struct is loaded (or defaulted) once before
//! planning and is read-only thereafter.

use crate::axis::AXIS_COUNT;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Kinematic limits of the target machine, in mm, mm/s, and mm/s².
///
/// Axis arrays are indexed by [`X_AXIS`](crate::X_AXIS) ..
/// [`E_AXIS`](crate::E_AXIS).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmwareLimits {
    /// Maximum feedrate per axis (mm/s).
    pub max_feedrate: [f64; AXIS_COUNT],
    /// Maximum acceleration per axis (mm/s²).
    pub max_acceleration: [f64; AXIS_COUNT],
    /// Maximum instantaneous XY velocity change at a junction (mm/s).
    pub max_xy_jerk: f64,
    /// Maximum instantaneous Z velocity change at a junction (mm/s).
    pub max_z_jerk: f64,
    /// Maximum instantaneous E velocity change at a junction (mm/s).
    pub max_e_jerk: f64,
    /// Floor applied to every requested feedrate (mm/s).
    pub minimum_feedrate: f64,
    /// Default acceleration for moves not limited per axis (mm/s²).
    pub acceleration: f64,
}

impl Default for FirmwareLimits {
    fn default() -> Self {
        Self {
            max_feedrate: [600.0, 600.0, 40.0, 25.0],
            max_acceleration: [9000.0, 9000.0, 100.0, 10000.0],
            max_xy_jerk: 20.0,
            max_z_jerk: 0.4,
            max_e_jerk: 5.0,
            minimum_feedrate: 0.01,
            acceleration: 3000.0,
        }
    }
}

impl FirmwareLimits {
    /// Check that every limit is usable by the planners.
    ///
    /// All values must be strictly positive; a zero feedrate or acceleration
    /// cap would make every move degenerate.
    pub fn validate(&self) -> Result<()> {
        const FEEDRATE_NAMES: [&str; AXIS_COUNT] = [
            "max_feedrate.x",
            "max_feedrate.y",
            "max_feedrate.z",
            "max_feedrate.e",
        ];
        const ACCEL_NAMES: [&str; AXIS_COUNT] = [
            "max_acceleration.x",
            "max_acceleration.y",
            "max_acceleration.z",
            "max_acceleration.e",
        ];

        for n in 0..AXIS_COUNT {
            check_positive(FEEDRATE_NAMES[n], self.max_feedrate[n])?;
            check_positive(ACCEL_NAMES[n], self.max_acceleration[n])?;
        }
        check_positive("max_xy_jerk", self.max_xy_jerk)?;
        check_positive("max_z_jerk", self.max_z_jerk)?;
        check_positive("max_e_jerk", self.max_e_jerk)?;
        check_positive("minimum_feedrate", self.minimum_feedrate)?;
        check_positive("acceleration", self.acceleration)?;
        Ok(())
    }

    /// Parse limits from a JSON document and validate them.
    pub fn from_json(json: &str) -> Result<Self> {
        let limits: FirmwareLimits = serde_json::from_str(json)?;
        limits.validate()?;
        Ok(limits)
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidLimit { name, value })
    }
}
