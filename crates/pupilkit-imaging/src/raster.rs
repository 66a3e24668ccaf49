// SPDX-License-Identifier: MIT
//
// Raster wrapper — a chainable image value object. Each transform borrows the
// current buffer and returns a fresh `Raster`; only construction and `load`
// set the buffer in place. Operates on in-memory images using the `image` and
// `imageproc` crates.

use image::{DynamicImage, Luma, Rgb};
use imageproc::contrast::equalize_histogram;
use imageproc::drawing::draw_hollow_circle_mut;
use imageproc::morphology;
use pupilkit_core::error::{PupilkitError, Result};
use pupilkit_core::types::Circle;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::clahe::{self, ClaheOptions};
use crate::morphology::Kernel;

/// Pixel dimensions of a wrapped buffer.
///
/// Cached on the wrapper at construction / load time so shape queries never
/// have to touch the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    /// Number of pixel rows.
    pub height: u32,
    /// Number of pixel columns.
    pub width: u32,
    /// Samples per pixel (1 for luma, 3 for RGB, 4 for RGBA).
    pub channels: u8,
}

impl Shape {
    /// Derive the shape of a decoded buffer.
    pub fn of(image: &DynamicImage) -> Self {
        Self {
            height: image.height(),
            width: image.width(),
            channels: image.color().channel_count(),
        }
    }
}

/// An image value object for chaining raster operations.
///
/// The wrapper is copy-on-operate: every transform returns a new `Raster`
/// wrapping a freshly allocated buffer, leaving the receiver untouched. A
/// `Raster` may be empty (no buffer loaded yet); transforms and `save` on an
/// empty wrapper fail with [`PupilkitError::EmptyImage`].
///
/// ```ignore
/// let isolated = Raster::open("eye.png")?
///     .to_grayscale()?
///     .apply_clahe(&ClaheOptions::default())?
///     .binarize(1.2)?
///     .morph_open(&Kernel::square(2))?;
/// isolated.save("pupil-mask.png")?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Raster {
    /// The wrapped buffer, if one has been loaded or provided.
    buffer: Option<DynamicImage>,
    /// Shape metadata for the current buffer.
    shape: Option<Shape>,
}

impl Raster {
    // -- Construction ---------------------------------------------------------

    /// Create an empty wrapper with no buffer and no shape metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-decoded `DynamicImage`, computing shape metadata.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let shape = Shape::of(&image);
        Self {
            buffer: Some(image),
            shape: Some(shape),
        }
    }

    /// Load and decode an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let mut raster = Self::new();
        raster.load(path)?;
        Ok(raster)
    }

    /// Decode the image file at `path` into this wrapper, replacing any
    /// existing buffer and recomputing shape metadata.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let img = image::open(path.as_ref()).map_err(|err| {
            PupilkitError::Decode(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        let shape = Shape::of(&img);
        info!(
            height = shape.height,
            width = shape.width,
            channels = shape.channels,
            "Image loaded"
        );
        self.buffer = Some(img);
        self.shape = Some(shape);
        Ok(())
    }

    // -- Accessors ------------------------------------------------------------

    /// Whether the wrapper currently holds a buffer.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_none()
    }

    /// Shape metadata, if a buffer is present.
    pub fn shape(&self) -> Option<Shape> {
        self.shape
    }

    /// Height in pixels, if a buffer is present.
    pub fn height(&self) -> Option<u32> {
        self.shape.map(|s| s.height)
    }

    /// Width in pixels, if a buffer is present.
    pub fn width(&self) -> Option<u32> {
        self.shape.map(|s| s.width)
    }

    /// Samples per pixel, if a buffer is present.
    pub fn channels(&self) -> Option<u8> {
        self.shape.map(|s| s.channels)
    }

    /// Borrow the underlying `DynamicImage`, if any.
    pub fn as_dynamic(&self) -> Option<&DynamicImage> {
        self.buffer.as_ref()
    }

    /// Consume the wrapper and return the underlying `DynamicImage`, if any.
    pub fn into_dynamic(self) -> Option<DynamicImage> {
        self.buffer
    }

    /// Buffer and shape together, or `EmptyImage` when nothing is loaded.
    pub(crate) fn require(&self) -> Result<(&DynamicImage, Shape)> {
        match (&self.buffer, self.shape) {
            (Some(img), Some(shape)) => Ok((img, shape)),
            _ => Err(PupilkitError::EmptyImage),
        }
    }

    /// Single-channel view of the buffer. Operations that delegate to
    /// grayscale-only routines go through here.
    fn require_gray(&self) -> Result<image::GrayImage> {
        let (img, shape) = self.require()?;
        if shape.channels != 1 {
            return Err(PupilkitError::ChannelMismatch {
                expected: 1,
                actual: shape.channels,
            });
        }
        Ok(img.to_luma8())
    }

    // -- Persistence ----------------------------------------------------------

    /// Encode and write the buffer to `path`. The format is inferred from the
    /// file extension. Fails with `EmptyImage` before touching the filesystem
    /// if no buffer is present.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let (img, shape) = self.require()?;
        img.save(path.as_ref()).map_err(|err| {
            PupilkitError::Encode(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        debug!(
            height = shape.height,
            width = shape.width,
            "Image written"
        );
        Ok(())
    }

    // -- Transforms (borrow self, return a new Raster) ------------------------

    /// Two-level threshold at the mean intensity divided by `threshold_factor`.
    ///
    /// Samples below the cutoff become 0; samples at or above it become the
    /// buffer's maximum sample value. The mean divides the summed sample
    /// intensity by the pixel count (`height * width`), not the sample count,
    /// so multi-channel buffers threshold against summed-channel intensity.
    #[instrument(skip(self), fields(threshold_factor))]
    pub fn binarize(&self, threshold_factor: f64) -> Result<Raster> {
        if threshold_factor == 0.0 {
            return Err(PupilkitError::InvalidParameter(
                "threshold factor must be non-zero".to_string(),
            ));
        }
        let (img, shape) = self.require()?;
        let pixel_count = shape.height as u64 * shape.width as u64;
        if pixel_count == 0 {
            return Err(PupilkitError::InvalidParameter(
                "cannot binarize a zero-sized image".to_string(),
            ));
        }

        let binarized = match shape.channels {
            1 => {
                let mut gray = img.to_luma8();
                threshold_samples(&mut gray, pixel_count, threshold_factor);
                DynamicImage::ImageLuma8(gray)
            }
            2 => {
                let mut la = img.to_luma_alpha8();
                threshold_samples(&mut la, pixel_count, threshold_factor);
                DynamicImage::ImageLumaA8(la)
            }
            3 => {
                let mut rgb = img.to_rgb8();
                threshold_samples(&mut rgb, pixel_count, threshold_factor);
                DynamicImage::ImageRgb8(rgb)
            }
            _ => {
                let mut rgba = img.to_rgba8();
                threshold_samples(&mut rgba, pixel_count, threshold_factor);
                DynamicImage::ImageRgba8(rgba)
            }
        };

        debug!("Binarization complete");
        Ok(Raster::from_dynamic(binarized))
    }

    /// Binary erosion with the given structuring element, repeated
    /// `iterations` times. Single-channel buffers only.
    #[instrument(skip(self, kernel), fields(radius = kernel.radius, iterations))]
    pub fn erode(&self, kernel: &Kernel, iterations: u32) -> Result<Raster> {
        let mut gray = self.require_gray()?;
        for _ in 0..iterations {
            gray = morphology::erode(&gray, kernel.norm(), kernel.radius);
        }
        Ok(Raster::from_dynamic(DynamicImage::ImageLuma8(gray)))
    }

    /// Morphological opening (erosion then dilation) with the given
    /// structuring element. Single-channel buffers only.
    #[instrument(skip(self, kernel), fields(radius = kernel.radius))]
    pub fn morph_open(&self, kernel: &Kernel) -> Result<Raster> {
        let gray = self.require_gray()?;
        let opened = morphology::open(&gray, kernel.norm(), kernel.radius);
        Ok(Raster::from_dynamic(DynamicImage::ImageLuma8(opened)))
    }

    /// Morphological closing (dilation then erosion) with the given
    /// structuring element. Single-channel buffers only.
    #[instrument(skip(self, kernel), fields(radius = kernel.radius))]
    pub fn morph_close(&self, kernel: &Kernel) -> Result<Raster> {
        let gray = self.require_gray()?;
        let closed = morphology::close(&gray, kernel.norm(), kernel.radius);
        Ok(Raster::from_dynamic(DynamicImage::ImageLuma8(closed)))
    }

    /// Convert a color buffer to single-channel luma.
    #[instrument(skip(self))]
    pub fn to_grayscale(&self) -> Result<Raster> {
        let (img, shape) = self.require()?;
        if shape.channels < 3 {
            return Err(PupilkitError::ChannelMismatch {
                expected: 3,
                actual: shape.channels,
            });
        }
        Ok(Raster::from_dynamic(DynamicImage::ImageLuma8(
            img.to_luma8(),
        )))
    }

    /// Draw a circle outline onto a copy of the buffer.
    ///
    /// The stroke is built from concentric one-pixel circles spanning
    /// `thickness` radii centred on `circle.radius`. Single-channel buffers
    /// are drawn in luma using the first color component; everything else is
    /// drawn in RGB.
    #[instrument(skip(self, circle), fields(center = %circle, thickness))]
    pub fn draw_circle(&self, circle: &Circle, color: Rgb<u8>, thickness: u32) -> Result<Raster> {
        if thickness == 0 {
            return Err(PupilkitError::InvalidParameter(
                "circle thickness must be at least 1".to_string(),
            ));
        }
        let (img, shape) = self.require()?;
        let span = thickness as i32;
        let innermost = circle.radius - span / 2;

        let drawn = if shape.channels == 1 {
            let mut gray = img.to_luma8();
            let luma = Luma([color.0[0]]);
            for i in 0..span {
                let radius = innermost + i;
                if radius > 0 {
                    draw_hollow_circle_mut(&mut gray, circle.center(), radius, luma);
                }
            }
            DynamicImage::ImageLuma8(gray)
        } else {
            let mut rgb = img.to_rgb8();
            for i in 0..span {
                let radius = innermost + i;
                if radius > 0 {
                    draw_hollow_circle_mut(&mut rgb, circle.center(), radius, color);
                }
            }
            DynamicImage::ImageRgb8(rgb)
        };

        Ok(Raster::from_dynamic(drawn))
    }

    /// Global histogram equalization. Single-channel buffers only.
    #[instrument(skip(self))]
    pub fn enhance_contrast(&self) -> Result<Raster> {
        let gray = self.require_gray()?;
        let equalized = equalize_histogram(&gray);
        Ok(Raster::from_dynamic(DynamicImage::ImageLuma8(equalized)))
    }

    /// Contrast-limited adaptive histogram equalization. Single-channel
    /// buffers only.
    #[instrument(skip(self, options), fields(clip_limit = options.clip_limit))]
    pub fn apply_clahe(&self, options: &ClaheOptions) -> Result<Raster> {
        let gray = self.require_gray()?;
        let equalized = clahe::clahe(&gray, options)?;
        Ok(Raster::from_dynamic(DynamicImage::ImageLuma8(equalized)))
    }
}

/// Threshold a flat sample slice in place: samples below the mean-derived
/// cutoff go to 0, samples at or above it go to the slice's maximum value.
fn threshold_samples(samples: &mut [u8], pixel_count: u64, threshold_factor: f64) {
    let sum: u64 = samples.iter().map(|&v| v as u64).sum();
    let max = samples.iter().copied().max().unwrap_or(0);
    let cutoff = sum as f64 / pixel_count as f64 / threshold_factor;
    for sample in samples.iter_mut() {
        *sample = if (*sample as f64) < cutoff { 0 } else { max };
    }
}
