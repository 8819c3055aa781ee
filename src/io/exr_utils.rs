/* Copyright 2020 @TwoCookingMice */

use crate::core::error::LoadError;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Vector3f;

use exr::prelude::*;

// Read EXR Image from file
pub fn read_exr_from_file(file_path: &str) -> std::result::Result<Bitmap, LoadError> {
    log::info!("Starting reading OpenEXR image from: {}.", file_path);

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .rgba_channels(
            |resolution, _| Bitmap::new(resolution.width(), resolution.height()),
            |bitmap, position, (r, g, b, _a): (f32, f32, f32, f32)| {
                bitmap[(position.x(), position.y())] = Vector3f::new(r, g, b);
            },
        )
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)?;

    let bitmap = image.layer_data.channel_data.pixels;
    log::info!("OpenEXR loaded, width = {}, height = {}.", bitmap.width(), bitmap.height());
    Ok(bitmap)
}

// Write EXR Image to file
pub fn write_exr_to_file(bitmap: &Bitmap, file_path: &str) -> std::result::Result<(), LoadError> {
    log::info!("Starting writing openexr images: {}.", file_path);

    write_rgb_file(file_path, bitmap.width(), bitmap.height(), |x, y| {
        let p = bitmap[(x, y)];
        (p.x, p.y, p.z)
    })?;
    log::info!("EXR written to: {}.", file_path);
    Ok(())
}
