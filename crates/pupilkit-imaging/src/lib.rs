// SPDX-License-Identifier: MIT
//
// pupilkit-imaging — Raster operations for pupil isolation pipelines.
//
// Provides a copy-on-operate image wrapper (load, save, binarize, erode,
// open/close, grayscale conversion, histogram equalization, CLAHE, circle
// drawing) plus a temp-file preview path for interactive inspection.

pub mod clahe;
pub mod morphology;
pub mod raster;
pub mod view;

// Re-export the primary types so callers can use `pupilkit_imaging::Raster` etc.
pub use clahe::ClaheOptions;
pub use morphology::{Kernel, KernelShape};
pub use raster::{Raster, Shape};
pub use view::{Colormap, ViewOptions};
