//! Polygon rasterization.
//!
//! Turns a closed polygon into a bounding-box-local coverage patch used for
//! region compositing. The fill rule is even-odd scanline: pixel centers at
//! integer coordinates, edges treated half-open (`min(y0, y1) <= y <
//! max(y0, y1)`), spans filled `ceil(x_enter) <= x < ceil(x_exit)`.
//! Self-intersecting polygons therefore fill by even-odd parity.

use ndarray::Array2;

/// An image-space polygon vertex.
pub type PointI = (i32, i32);

/// Inclusive axis-aligned bounding box of a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl BBox {
    /// Bounding box of a point set. Returns `None` for an empty set.
    pub fn of_points(points: &[PointI]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bbox = BBox {
            x_min: first.0,
            y_min: first.1,
            x_max: first.0,
            y_max: first.1,
        };
        for &(x, y) in rest {
            bbox.x_min = bbox.x_min.min(x);
            bbox.y_min = bbox.y_min.min(y);
            bbox.x_max = bbox.x_max.max(x);
            bbox.y_max = bbox.y_max.max(y);
        }
        Some(bbox)
    }

    /// Number of pixel columns covered (inclusive bounds).
    pub fn width(&self) -> usize {
        (self.x_max - self.x_min + 1) as usize
    }

    /// Number of pixel rows covered (inclusive bounds).
    pub fn height(&self) -> usize {
        (self.y_max - self.y_min + 1) as usize
    }
}

/// Rasterize a polygon into its bounding box.
///
/// Returns the bounding box and a `height x width` patch with 1.0 inside the
/// polygon and 0.0 elsewhere, or `None` when fewer than 3 vertices are given.
/// The vertex list is taken as-is; the edge from the last vertex back to the
/// first closes the ring.
pub fn polygon_coverage(points: &[PointI]) -> Option<(BBox, Array2<f32>)> {
    if points.len() < 3 {
        return None;
    }
    let bbox = BBox::of_points(points)?;
    let mut coverage = Array2::<f32>::zeros((bbox.height(), bbox.width()));

    let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
    for y in bbox.y_min..=bbox.y_max {
        crossings.clear();
        for i in 0..points.len() {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % points.len()];
            if y0 == y1 {
                continue;
            }
            if y >= y0.min(y1) && y < y0.max(y1) {
                let t = f64::from(y - y0) / f64::from(y1 - y0);
                crossings.push(f64::from(x0) + t * f64::from(x1 - x0));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        let row = (y - bbox.y_min) as usize;
        for pair in crossings.chunks_exact(2) {
            let start = pair[0].ceil() as i64;
            let end = pair[1].ceil() as i64;
            for x in start..end {
                let col = (x as i32 - bbox.x_min) as usize;
                coverage[(row, col)] = 1.0;
            }
        }
    }

    Some((bbox, coverage))
}
