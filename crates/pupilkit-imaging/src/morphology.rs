// SPDX-License-Identifier: MIT
//
// Structuring-element descriptions for the morphological operations.

use imageproc::distance_transform::Norm;
use serde::{Deserialize, Serialize};

/// Neighbourhood shape of a structuring element.
///
/// Maps onto the distance norms the morphology routines accept: a square is
/// the Chebyshev (L-infinity) ball, a cross the taxicab (L1) ball, and a disk
/// the Euclidean (L2) ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KernelShape {
    Square,
    Cross,
    Disk,
}

/// A structuring element: a shape plus its radius in pixels.
///
/// A radius of 1 gives the familiar 3x3 neighbourhood for the square shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kernel {
    pub shape: KernelShape,
    pub radius: u8,
}

impl Kernel {
    /// Square (Chebyshev) structuring element of the given radius.
    pub fn square(radius: u8) -> Self {
        Self {
            shape: KernelShape::Square,
            radius,
        }
    }

    /// Cross (taxicab) structuring element of the given radius.
    pub fn cross(radius: u8) -> Self {
        Self {
            shape: KernelShape::Cross,
            radius,
        }
    }

    /// Disk (Euclidean) structuring element of the given radius.
    pub fn disk(radius: u8) -> Self {
        Self {
            shape: KernelShape::Disk,
            radius,
        }
    }

    /// The distance norm this kernel shape corresponds to.
    pub(crate) fn norm(&self) -> Norm {
        match self.shape {
            KernelShape::Square => Norm::LInf,
            KernelShape::Cross => Norm::L1,
            KernelShape::Disk => Norm::L2,
        }
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::square(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_record_shape_and_radius() {
        assert_eq!(Kernel::square(2).shape, KernelShape::Square);
        assert_eq!(Kernel::cross(3).radius, 3);
        assert_eq!(Kernel::disk(1).shape, KernelShape::Disk);
    }

    #[test]
    fn shapes_map_to_their_norms() {
        assert!(matches!(Kernel::square(1).norm(), Norm::LInf));
        assert!(matches!(Kernel::cross(1).norm(), Norm::L1));
        assert!(matches!(Kernel::disk(1).norm(), Norm::L2));
    }
}
