//! # PrintKit Core
//!
//! Core types for PrintKit's print-time estimation.
//! Provides the axis-vector data model, print-feature tags, per-feature
//! time totals, and the firmware kinematic limits consumed by the planners.

pub mod axis;
pub mod error;
pub mod feature;
pub mod limits;
pub mod totals;

pub use axis::{AxisVector, AXIS_COUNT, E_AXIS, X_AXIS, Y_AXIS, Z_AXIS};
pub use error::{Error, Result};
pub use feature::PrintFeature;
pub use limits::FirmwareLimits;
pub use totals::TimeTotals;
