// SPDX-License-Identifier: MIT
//
// Interactive preview support. Rust has no in-process plotting surface, so
// `display` encodes a PNG into the system temp directory and hands it to the
// platform image viewer. Debug aid only; nothing here is a persisted contract.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use pupilkit_core::error::{PupilkitError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::raster::Raster;

/// How a preview is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Colormap {
    /// Render the luma plane, regardless of the buffer's channel count.
    #[default]
    Gray,
    /// Render the buffer in its native colors.
    Native,
}

/// Options for [`Raster::display`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Optional caption; becomes the preview file's stem.
    pub title: Option<String>,
    pub colormap: Colormap,
}

impl ViewOptions {
    /// Options with just a title set.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

impl Raster {
    /// Pop the image up in the platform image viewer.
    ///
    /// Encodes a PNG preview into the system temp directory and launches the
    /// viewer detached; the call returns as soon as the viewer is spawned.
    #[instrument(skip(self, options))]
    pub fn display(&self, options: &ViewOptions) -> Result<()> {
        let path = self.write_preview(options)?;
        spawn_viewer(&path)
    }

    /// Encode a PNG preview into the system temp directory and return its
    /// path. The file stem is derived from the title, falling back to
    /// `pupilkit-view`; the process id keeps concurrent runs apart.
    pub fn write_preview(&self, options: &ViewOptions) -> Result<PathBuf> {
        let (img, _) = self.require()?;

        let stem = options
            .title
            .as_deref()
            .map(slug)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "pupilkit-view".to_string());
        let path = std::env::temp_dir().join(format!("{}-{}.png", stem, std::process::id()));

        let preview = match options.colormap {
            Colormap::Gray => DynamicImage::ImageLuma8(img.to_luma8()),
            Colormap::Native => img.clone(),
        };
        preview
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|err| PupilkitError::Encode(format!("preview encoding failed: {}", err)))?;

        debug!(path = %path.display(), "Preview written");
        Ok(path)
    }
}

/// Launch the platform image viewer on `path`, detached.
fn spawn_viewer(path: &Path) -> Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    std::process::Command::new(opener)
        .arg(path)
        .spawn()
        .map_err(|err| PupilkitError::Viewer(format!("{}: {}", opener, err)))?;

    info!(path = %path.display(), viewer = opener, "Viewer launched");
    Ok(())
}

/// Reduce a title to a filesystem-safe stem: lowercase alphanumerics with
/// single dashes between words.
fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn slug_normalizes_titles() {
        assert_eq!(slug("Binarized pupil mask"), "binarized-pupil-mask");
        assert_eq!(slug("  CLAHE (8x8)!  "), "clahe-8x8");
        assert_eq!(slug("***"), "");
    }

    #[test]
    fn write_preview_creates_decodable_png() {
        let raster = Raster::from_dynamic(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            10,
            10,
            Luma([42]),
        )));

        let path = raster
            .write_preview(&ViewOptions::titled("preview test"))
            .expect("write preview");

        assert!(path.exists());
        assert!(
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("preview-test-"))
        );
        let decoded = image::open(&path).expect("decodable preview");
        assert_eq!(decoded.width(), 10);
        std::fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn write_preview_on_empty_errors() {
        let result = Raster::new().write_preview(&ViewOptions::default());
        assert!(matches!(result, Err(PupilkitError::EmptyImage)));
    }
}
