// SPDX-License-Identifier: MIT
//
// Pupilkit — core types and error definitions shared across all crates.

pub mod error;
pub mod types;

pub use error::{PupilkitError, Result};
pub use types::*;
