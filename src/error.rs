//! Error types for catalog, loading and session operations.

use thiserror::Error;

/// Errors that can occur while scanning, loading or persisting masks.
#[derive(Error, Debug)]
pub enum MaskError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode or encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Mask raster does not match the image dimensions
    #[error(
        "Mask is {mask_width}x{mask_height} but image is {image_width}x{image_height}"
    )]
    DimensionMismatch {
        /// Source image width
        image_width: u32,
        /// Source image height
        image_height: u32,
        /// Mask width
        mask_width: u32,
        /// Mask height
        mask_height: u32,
    },

    /// Pair index outside the catalog
    #[error("Pair index {index} out of range (catalog has {len} pairs)")]
    IndexOutOfRange {
        /// The rejected index
        index: usize,
        /// Number of catalogued pairs
        len: usize,
    },
}
