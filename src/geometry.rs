//! Display-fit mathematics.
//!
//! Maps image-space coordinates onto a display surface (uniform scale-to-fit
//! with centering) and back. Extracted for testability.

/// Scale factor and centering offset for the active image on the display
/// surface. Recomputed whenever the active pair or the surface size changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl DisplayGeometry {
    /// Fit an `image_w` x `image_h` image into a `region_w` x `region_h`
    /// surface: uniform scale, centered.
    pub fn fit(image_w: u32, image_h: u32, region_w: f32, region_h: f32) -> Self {
        let scale = (region_w / image_w as f32).min(region_h / image_h as f32);
        Self {
            scale,
            offset_x: (region_w - image_w as f32 * scale) / 2.0,
            offset_y: (region_h - image_h as f32 * scale) / 2.0,
        }
    }

    /// Inverse mapping from display coordinates to image coordinates,
    /// truncated toward zero.
    pub fn display_to_image(&self, display_x: f32, display_y: f32) -> (i32, i32) {
        (
            ((display_x - self.offset_x) / self.scale) as i32,
            ((display_y - self.offset_y) / self.scale) as i32,
        )
    }

    /// Forward mapping from image coordinates to display coordinates.
    pub fn image_to_display(&self, image_x: f32, image_y: f32) -> (f32, f32) {
        (
            image_x * self.scale + self.offset_x,
            image_y * self.scale + self.offset_y,
        )
    }

    /// Size of the scaled image on the display surface.
    pub fn scaled_size(&self, image_w: u32, image_h: u32) -> (f32, f32) {
        (image_w as f32 * self.scale, image_h as f32 * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_fit_width_limited() {
        // 200x100 image into a 100x100 region: scale by width.
        let g = DisplayGeometry::fit(200, 100, 100.0, 100.0);
        assert!(approx_eq(g.scale, 0.5));
        assert!(approx_eq(g.offset_x, 0.0));
        assert!(approx_eq(g.offset_y, 25.0));
    }

    #[test]
    fn test_fit_height_limited() {
        let g = DisplayGeometry::fit(100, 200, 550.0, 850.0);
        assert!(approx_eq(g.scale, 4.25));
        assert!(approx_eq(g.offset_x, (550.0 - 425.0) / 2.0));
        assert!(approx_eq(g.offset_y, 0.0));
    }

    #[test]
    fn test_display_to_image_origin() {
        let g = DisplayGeometry::fit(100, 200, 550.0, 850.0);
        assert_eq!(g.display_to_image(g.offset_x, g.offset_y), (0, 0));
    }

    #[test]
    fn test_display_to_image_truncates() {
        let g = DisplayGeometry {
            scale: 4.25,
            offset_x: 62.5,
            offset_y: 0.0,
        };
        // (66.0 - 62.5) / 4.25 = 0.82.. -> 0, not 1.
        assert_eq!(g.display_to_image(66.0, 0.0), (0, 0));
        assert_eq!(g.display_to_image(66.75, 4.25), (1, 1));
    }

    #[test]
    fn test_round_trip_on_pixel_corners() {
        let g = DisplayGeometry::fit(640, 480, 550.0, 850.0);
        for &(x, y) in &[(0, 0), (10, 20), (639, 479)] {
            let (dx, dy) = g.image_to_display(x as f32, y as f32);
            // Nudge inside the pixel's display footprint before inverting.
            let (ix, iy) = g.display_to_image(dx + g.scale * 0.5, dy + g.scale * 0.5);
            assert_eq!((ix, iy), (x, y));
        }
    }

    #[test]
    fn test_scaled_size() {
        let g = DisplayGeometry::fit(100, 200, 550.0, 850.0);
        let (w, h) = g.scaled_size(100, 200);
        assert!(approx_eq(w, 425.0));
        assert!(approx_eq(h, 850.0));
    }
}
