// SPDX-License-Identifier: MIT
//
// Criterion benchmarks for the pupilkit-imaging crate. Benchmarks CLAHE and
// binarization on a small synthetic grayscale image.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use pupilkit_imaging::{ClaheOptions, Raster};

/// A 256x256 gradient image: enough structure for the histogram paths to do
/// real work without dominating the benchmark with allocation.
fn gradient_raster() -> Raster {
    let mut img = GrayImage::new(256, 256);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Luma([((x + y) / 2) as u8]);
    }
    Raster::from_dynamic(DynamicImage::ImageLuma8(img))
}

fn bench_clahe(c: &mut Criterion) {
    let raster = gradient_raster();
    let options = ClaheOptions::default();

    c.bench_function("clahe (256x256, 8x8 grid)", |b| {
        b.iter(|| {
            let out = black_box(&raster).apply_clahe(&options).expect("clahe");
            black_box(out);
        });
    });
}

fn bench_binarize(c: &mut Criterion) {
    let raster = gradient_raster();

    c.bench_function("binarize (256x256)", |b| {
        b.iter(|| {
            let out = black_box(&raster).binarize(1.0).expect("binarize");
            black_box(out);
        });
    });
}

criterion_group!(benches, bench_clahe, bench_binarize);
criterion_main!(benches);
