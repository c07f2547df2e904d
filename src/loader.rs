//! Loading image/mask pairs from disk and writing masks back.
//!
//! Images load as 3-channel RGB. Masks load as single-channel 8-bit rasters
//! normalized to [0.0, 1.0]; on save they are scaled back to 8-bit, rounded
//! and clamped, and re-encoded at the mask path. Mask siblings carry a fixed
//! `.jpg` extension, so JPEG output is written at maximum quality to keep
//! the round trip within quantization error.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{GrayImage, RgbImage};
use ndarray::Array2;

use crate::catalog::ImagePair;
use crate::constants::MASK_JPEG_QUALITY;
use crate::error::MaskError;

/// Load the RGB image and grayscale mask of a pair.
///
/// Fails if either file cannot be decoded. Dimension validation happens in
/// `MaskProcessor::new`, which consumes the result.
pub fn load_pair(pair: &ImagePair) -> Result<(RgbImage, GrayImage), MaskError> {
    let image = image::open(&pair.image_path)?.to_rgb8();
    let mask = image::open(&pair.mask_path)?.to_luma8();
    log::debug!(
        "Loaded pair {:?}: image {}x{}, mask {}x{}",
        pair.image_path,
        image.width(),
        image.height(),
        mask.width(),
        mask.height()
    );
    Ok((image, mask))
}

/// Normalize an 8-bit grayscale mask into a `[0.0, 1.0]` raster,
/// indexed `[(row, col)]`.
pub fn mask_to_array(mask: &GrayImage) -> Array2<f32> {
    Array2::from_shape_fn(
        (mask.height() as usize, mask.width() as usize),
        |(y, x)| f32::from(mask.get_pixel(x as u32, y as u32)[0]) / 255.0,
    )
}

/// Scale a normalized mask raster back to an 8-bit grayscale image:
/// `round(value * 255)` clamped to [0, 255].
pub fn array_to_mask(values: &Array2<f32>) -> GrayImage {
    let (height, width) = values.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        let sample = (values[(y as usize, x as usize)] * 255.0)
            .round()
            .clamp(0.0, 255.0);
        image::Luma([sample as u8])
    })
}

/// Write a normalized mask raster to `path`, overwriting in place.
pub fn save_mask(path: &Path, values: &Array2<f32>) -> Result<(), MaskError> {
    let mask = array_to_mask(values);
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg"));

    if is_jpeg {
        let writer = BufWriter::new(File::create(path)?);
        JpegEncoder::new_with_quality(writer, MASK_JPEG_QUALITY).encode_image(&mask)?;
    } else {
        mask.save(path)?;
    }
    log::debug!("Wrote mask {:?} ({}x{})", path, mask.width(), mask.height());
    Ok(())
}
