// SPDX-License-Identifier: MIT
//
// End-to-end demo: load an eye image, isolate the dark pupil region, and mark
// a candidate circle on the mask.
//
//     cargo run --example isolate_pupil -- input.jpg mask.png

use image::Rgb;
use pupilkit_core::types::Circle;
use pupilkit_core::{PupilkitError, Result};
use pupilkit_imaging::{ClaheOptions, Kernel, Raster};
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (input, output) = match (args.next(), args.next()) {
        (Some(input), Some(output)) => (input, output),
        _ => {
            return Err(PupilkitError::InvalidParameter(
                "usage: isolate_pupil <input-image> <output-mask>".to_string(),
            ));
        }
    };

    let source = Raster::open(&input)?;
    let gray = if source.channels() == Some(1) {
        source
    } else {
        source.to_grayscale()?
    };

    let mask = gray
        .apply_clahe(&ClaheOptions::default())?
        .binarize(1.2)?
        .morph_close(&Kernel::square(1))?
        .erode(&Kernel::square(1), 2)?
        .morph_open(&Kernel::square(2))?;

    // Mark a placeholder circle at the image center; a real pipeline would
    // substitute the detected pupil here.
    let (width, height) = (
        mask.width().unwrap_or_default(),
        mask.height().unwrap_or_default(),
    );
    let circle = Circle::new(
        width as i32 / 2,
        height as i32 / 2,
        width.min(height) as i32 / 4,
    );
    let marked = mask.draw_circle(&circle, Rgb([255, 255, 255]), 5)?;

    marked.save(&output)?;
    info!(input = %input, output = %output, %circle, "Pupil mask written");
    Ok(())
}
