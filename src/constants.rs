//! Global constants for the remask application

/// Application name, used for the window title and the config directory.
pub const APP_NAME: &str = "remask";

/// Substring marking a file as a mask sibling; paths containing it are
/// never catalogued as source images.
pub const MASK_SUFFIX: &str = "_mask";

/// Extension of mask sibling files (`<base>_mask.jpg`).
pub const MASK_EXTENSION: &str = "jpg";

/// Image extensions recognized by the catalog scan (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "jpeg"];

/// Circle radius as a fraction of the image's shorter dimension.
pub const CIRCLE_RADIUS_RATIO: f32 = 0.007;

/// Smallest allowed point-marker radius in pixels.
pub const MIN_CIRCLE_RADIUS: i32 = 3;

/// Segment thickness as a fraction of the circle radius.
pub const LINE_THICKNESS_RATIO: f32 = 0.3;

/// Smallest allowed segment thickness in pixels.
pub const MIN_LINE_THICKNESS: i32 = 1;

/// Capture radius for closing a polygon, in circle radii.
pub const SEARCH_RADIUS_FACTOR: i32 = 3;

/// Brightness floor added to the working mask before compositing, so
/// masked-out regions stay visible instead of going fully black.
pub const MASK_PREVIEW_FLOOR: f32 = 0.3;

/// Overlay color while placing polygon points (RGB).
pub const PLACING_COLOR: [u8; 3] = [255, 0, 0];

/// Overlay color while resolving a closed region (RGB).
pub const RESOLVING_COLOR: [u8; 3] = [0, 0, 255];

/// JPEG quality used when writing mask files. Masks are near-binary
/// rasters; maximum quality keeps the save/load round trip within
/// quantization error.
pub const MASK_JPEG_QUALITY: u8 = 100;

/// Default window size on first launch.
pub const DEFAULT_WINDOW_WIDTH: f32 = 1180.0;
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Width of the pair-list side panel.
pub const CATALOG_PANEL_WIDTH: f32 = 300.0;
