// SPDX-License-Identifier: MIT
//
// Core domain types for Pupilkit.

use serde::{Deserialize, Serialize};

/// A detected or candidate circle in image coordinates.
///
/// Consumed by the raster drawing operation; produced by whatever detection
/// stage sits upstream of this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    /// Horizontal center coordinate, in pixels from the left edge.
    pub center_x: i32,
    /// Vertical center coordinate, in pixels from the top edge.
    pub center_y: i32,
    /// Radius in pixels.
    pub radius: i32,
}

impl Circle {
    pub fn new(center_x: i32, center_y: i32, radius: i32) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }

    /// Center as a coordinate pair, the form drawing routines expect.
    pub fn center(&self) -> (i32, i32) {
        (self.center_x, self.center_y)
    }
}

impl std::fmt::Display for Circle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "circle(({}, {}), r={})",
            self.center_x, self.center_y, self.radius
        )
    }
}
