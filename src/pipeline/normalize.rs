//! Geometry normalization: fixed-canvas output from arbitrary source geometry.
//!
//! Every page the transcription provider sees is exactly
//! `canvas_width × canvas_height`. The normalizer first center-crops the
//! relatively longer axis to the target aspect ratio — full height is kept
//! when the source is wider than the target, full width when it is narrower —
//! then resizes with Lanczos3. The operation is lossy and destructive by
//! design; nothing of the original beyond the crop survives.
//!
//! Crop arithmetic is integer and center-anchored: the crop size is truncated
//! and clamped to source bounds, and the offset is `excess / 2`, so a crop can
//! never go negative or read past the source. Rounding off-by-ones err on the
//! side of cropping less.

use crate::config::RunConfig;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::trace;

/// Crop-and-resize a decoded image onto the `width × height` canvas.
///
/// Output dimensions are always exactly `width × height`, for every source
/// aspect ratio.
pub fn normalize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (src_w, src_h) = (img.width(), img.height());
    let src_ratio = f64::from(src_w) / f64::from(src_h);
    let target_ratio = f64::from(width) / f64::from(height);

    let cropped = if src_ratio > target_ratio {
        // Source relatively wider: crop left and right, keep full height.
        let new_w = ((f64::from(src_h) * target_ratio) as u32).clamp(1, src_w);
        let left = (src_w - new_w) / 2;
        img.crop_imm(left, 0, new_w, src_h)
    } else if src_ratio < target_ratio {
        // Source relatively narrower: crop top and bottom, keep full width.
        let new_h = ((f64::from(src_w) / target_ratio) as u32).clamp(1, src_h);
        let top = (src_h - new_h) / 2;
        img.crop_imm(0, top, src_w, new_h)
    } else {
        img.clone()
    };

    trace!(
        "Normalize {}x{} → crop {}x{} → {}x{}",
        src_w,
        src_h,
        cropped.width(),
        cropped.height(),
        width,
        height
    );

    cropped.resize_exact(width, height, FilterType::Lanczos3)
}

/// Normalize a page file onto the configured canvas and write it to `dest`.
///
/// JPEG destinations are encoded at the configured quality; other formats use
/// their default lossless encoder.
pub fn normalize_file(
    source: &Path,
    dest: &Path,
    config: &RunConfig,
) -> Result<(), image::ImageError> {
    let img = image::open(source)?;
    let normalized = normalize_image(&img, config.canvas_width, config.canvas_height);

    let is_jpeg = dest
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            lower == "jpg" || lower == "jpeg"
        })
        .unwrap_or(false);

    if is_jpeg {
        let file = File::create(dest).map_err(image::ImageError::IoError)?;
        let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), config.jpeg_quality);
        // JPEG has no alpha channel.
        encoder.encode_image(&normalized.to_rgb8())?;
    } else {
        normalized.save(dest)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([120, 80, 40])))
    }

    #[test]
    fn wider_source_hits_exact_canvas() {
        // 4:3 landscape against the portrait 951x1268 canvas: the source is
        // relatively wider, so full height is kept and width is cropped.
        let out = normalize_image(&solid(1600, 1200), 951, 1268);
        assert_eq!(out.width(), 951);
        assert_eq!(out.height(), 1268);
    }

    #[test]
    fn narrower_source_hits_exact_canvas() {
        let out = normalize_image(&solid(500, 2000), 951, 1268);
        assert_eq!(out.width(), 951);
        assert_eq!(out.height(), 1268);
    }

    #[test]
    fn matching_ratio_is_resize_only() {
        let out = normalize_image(&solid(1902, 2536), 951, 1268);
        assert_eq!((out.width(), out.height()), (951, 1268));
    }

    #[test]
    fn tiny_sources_never_underflow() {
        for (w, h) in [(1, 1), (1, 500), (500, 1), (2, 3)] {
            let out = normalize_image(&solid(w, h), 951, 1268);
            assert_eq!((out.width(), out.height()), (951, 1268), "source {w}x{h}");
        }
    }

    #[test]
    fn crop_is_symmetric_on_the_vertical_axis() {
        // Mark the horizontal center line; after a left/right crop it must
        // survive in the output (the crop is centered, not anchored).
        let mut img = RgbImage::from_pixel(3000, 1000, Rgb([255, 255, 255]));
        for x in 0..3000 {
            img.put_pixel(x, 500, Rgb([255, 0, 0]));
        }
        let out = normalize_image(&DynamicImage::ImageRgb8(img), 951, 1268);
        let rgb = out.to_rgb8();
        let y = 500 * 1268 / 1000;
        let px = rgb.get_pixel(475, y);
        assert!(px.0[0] > 200 && px.0[1] < 100, "center line lost: {px:?}");
    }

    #[test]
    fn normalize_file_writes_jpeg_at_canvas_size() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.png");
        let dest = dir.path().join("photo1.jpg");
        solid(800, 600).save(&src).unwrap();

        let config = RunConfig::builder().canvas(100, 150).build().unwrap();
        normalize_file(&src, &dest, &config).unwrap();

        let written = image::open(&dest).unwrap();
        assert_eq!((written.width(), written.height()), (100, 150));
    }
}
