//! Four-axis position vectors.
//!
//! A print head position has three spatial axes (X, Y, Z) plus the extruder
//! axis (E). The planners only ever do component arithmetic and axis-indexed
//! loops over these, so the representation is a plain fixed array.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut, Sub};

/// Number of machine axes tracked by the planners.
pub const AXIS_COUNT: usize = 4;

/// X axis index.
pub const X_AXIS: usize = 0;
/// Y axis index.
pub const Y_AXIS: usize = 1;
/// Z axis index.
pub const Z_AXIS: usize = 2;
/// Extruder axis index.
pub const E_AXIS: usize = 3;

/// A 4-axis vector (X, Y, Z, E), used for positions, deltas, and per-axis
/// feedrates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisVector {
    axes: [f64; AXIS_COUNT],
}

impl AxisVector {
    /// Create a vector from explicit axis values.
    pub fn new(x: f64, y: f64, z: f64, e: f64) -> Self {
        Self { axes: [x, y, z, e] }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Component-wise absolute value.
    pub fn abs(&self) -> Self {
        let mut out = *self;
        for v in out.axes.iter_mut() {
            *v = v.abs();
        }
        out
    }

    /// Euclidean magnitude of the spatial (X, Y, Z) components only.
    pub fn xyz_magnitude(&self) -> f64 {
        let [x, y, z, _] = self.axes;
        (x * x + y * y + z * z).sqrt()
    }

    /// Largest component value.
    pub fn max_component(&self) -> f64 {
        self.axes.iter().copied().fold(f64::MIN, f64::max)
    }

    /// Iterate over the axis values in axis order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.axes.iter().copied()
    }
}

impl Index<usize> for AxisVector {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        debug_assert!(axis < AXIS_COUNT, "axis index {} out of range", axis);
        &self.axes[axis]
    }
}

impl IndexMut<usize> for AxisVector {
    fn index_mut(&mut self, axis: usize) -> &mut f64 {
        debug_assert!(axis < AXIS_COUNT, "axis index {} out of range", axis);
        &mut self.axes[axis]
    }
}

impl Sub for AxisVector {
    type Output = AxisVector;

    fn sub(self, rhs: AxisVector) -> AxisVector {
        let mut out = self;
        for n in 0..AXIS_COUNT {
            out.axes[n] -= rhs.axes[n];
        }
        out
    }
}
