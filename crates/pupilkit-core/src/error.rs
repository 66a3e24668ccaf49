// SPDX-License-Identifier: MIT
//
// Unified error types for Pupilkit.

use thiserror::Error;

/// Top-level error type for all Pupilkit operations.
#[derive(Debug, Error)]
pub enum PupilkitError {
    // -- Codec errors --
    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("image encode failed: {0}")]
    Encode(String),

    // -- Wrapper preconditions --
    #[error("no image data loaded; nothing to write")]
    EmptyImage,

    #[error("expected a {expected}-channel image, got {actual}")]
    ChannelMismatch { expected: u8, actual: u8 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    // -- Preview / display --
    #[error("image viewer launch failed: {0}")]
    Viewer(String),

    // -- Storage --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PupilkitError>;
