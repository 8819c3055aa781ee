// Copyright @yucwang 2026

use std::path::Path;

use crate::core::error::LoadError;
use crate::io::exr_utils::read_exr_from_file;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector3f};

fn srgb_to_linear(v: Float) -> Float {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Reads `.exr` through `exr` and `.hdr/.png/.jpg` through `image`. 8-bit
/// formats are converted from sRGB to linear.
pub fn read_bitmap(path: &str) -> Result<Bitmap, LoadError> {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "exr" => read_exr_from_file(path),
        "hdr" => read_with_image_crate(path, false),
        "png" | "jpg" | "jpeg" => read_with_image_crate(path, true),
        _ => Err(LoadError::UnsupportedFormat(ext)),
    }
}

fn read_with_image_crate(path: &str, srgb: bool) -> Result<Bitmap, LoadError> {
    let img = image::open(path)?.to_rgb32f();
    let (width, height) = (img.width() as usize, img.height() as usize);

    let mut bitmap = Bitmap::new(width, height);
    for (x, y, p) in img.enumerate_pixels() {
        let (mut r, mut g, mut b) = (p[0], p[1], p[2]);
        if srgb {
            r = srgb_to_linear(r);
            g = srgb_to_linear(g);
            b = srgb_to_linear(b);
        }
        bitmap[(x as usize, y as usize)] = Vector3f::new(r, g, b);
    }
    log::info!("Image loaded from {}, width = {}, height = {}.", path, width, height);
    Ok(bitmap)
}
