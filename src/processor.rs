//! The mask-editing state machine.
//!
//! A `MaskProcessor` owns all editing state for one image/mask pair: the
//! source image, a committed/working mask double buffer, the in-progress
//! polygon, and the two-mode input machine. Point mode places and removes
//! polygon vertices; a click near the first vertex closes the polygon and
//! enters Contour mode, where primary clicks cycle the region semantics and
//! a secondary click resolves the region back to Point mode.
//!
//! Every contour recompute reads from `committed`, never from the previous
//! `working`, so cycling is idempotent and never compounds rounding error.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use ndarray::{Array2, Zip, s};

use crate::constants::{
    CIRCLE_RADIUS_RATIO, LINE_THICKNESS_RATIO, MASK_PREVIEW_FLOOR, MIN_CIRCLE_RADIUS,
    MIN_LINE_THICKNESS, PLACING_COLOR, RESOLVING_COLOR, SEARCH_RADIUS_FACTOR,
};
use crate::error::MaskError;
use crate::loader::mask_to_array;
use crate::raster::{self, BBox, PointI};

/// Input mode of the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Placing polygon vertices.
    Point,
    /// Polygon closed; choosing the region semantics.
    Contour,
}

/// Semantics applied to a closed polygon's interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourKind {
    /// Revert the region to the committed values.
    Unchanged,
    /// Force the interior to background (0.0).
    Black,
    /// Force the interior to foreground (1.0).
    White,
}

impl ContourKind {
    /// The cycle driven by primary clicks in Contour mode.
    fn next(self) -> Self {
        match self {
            ContourKind::Unchanged => ContourKind::Black,
            ContourKind::Black => ContourKind::White,
            ContourKind::White => ContourKind::Unchanged,
        }
    }
}

/// Drawing parameters derived once per loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawParams {
    /// Radius of the point markers.
    pub circle_radius: i32,
    /// Thickness of the connecting segments.
    pub line_thickness: i32,
    /// Capture radius for closing the polygon on the first vertex.
    pub search_radius: i32,
}

impl DrawParams {
    /// Derive marker sizes from the image dimensions.
    pub fn for_image(width: u32, height: u32) -> Self {
        let shorter = width.min(height) as f32;
        let circle_radius = ((shorter * CIRCLE_RADIUS_RATIO) as i32).max(MIN_CIRCLE_RADIUS);
        let line_thickness =
            ((circle_radius as f32 * LINE_THICKNESS_RATIO) as i32).max(MIN_LINE_THICKNESS);
        Self {
            circle_radius,
            line_thickness,
            search_radius: circle_radius * SEARCH_RADIUS_FACTOR,
        }
    }
}

/// A closed polygon's rasterization, kept while in Contour mode.
#[derive(Debug, Clone)]
struct Region {
    bbox: BBox,
    coverage: Array2<f32>,
}

/// Mask-editing state for exactly one active pair. Constructed whole from a
/// validated (image, mask) pair and replaced wholesale on pair switch.
#[derive(Debug, Clone)]
pub struct MaskProcessor {
    image: RgbImage,
    committed: Array2<f32>,
    working: Array2<f32>,
    points: Vec<PointI>,
    mode: EditMode,
    contour: ContourKind,
    region: Option<Region>,
    dirty: bool,
    params: DrawParams,
}

impl MaskProcessor {
    /// Build a processor from a source image and its 8-bit mask.
    ///
    /// The mask is normalized to [0.0, 1.0] and duplicated into the
    /// committed/working buffers. Fails if the dimensions differ.
    pub fn new(image: RgbImage, mask: &GrayImage) -> Result<Self, MaskError> {
        if image.dimensions() != mask.dimensions() {
            return Err(MaskError::DimensionMismatch {
                image_width: image.width(),
                image_height: image.height(),
                mask_width: mask.width(),
                mask_height: mask.height(),
            });
        }
        let committed = mask_to_array(mask);
        let params = DrawParams::for_image(image.width(), image.height());
        Ok(Self {
            working: committed.clone(),
            committed,
            points: Vec::new(),
            mode: EditMode::Point,
            contour: ContourKind::Unchanged,
            region: None,
            dirty: false,
            params,
            image,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn contour_kind(&self) -> ContourKind {
        self.contour
    }

    /// True when `working` differs from `committed` through a resolved
    /// region edit.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn points(&self) -> &[PointI] {
        &self.points
    }

    pub fn draw_params(&self) -> DrawParams {
        self.params
    }

    pub fn working(&self) -> &Array2<f32> {
        &self.working
    }

    pub fn committed(&self) -> &Array2<f32> {
        &self.committed
    }

    /// Dispatch a primary click in image coordinates.
    pub fn primary_click(&mut self, x: i32, y: i32) {
        match self.mode {
            EditMode::Point => self.place_point(x, y),
            EditMode::Contour => self.cycle_contour(),
        }
    }

    /// Dispatch a secondary click in image coordinates.
    pub fn secondary_click(&mut self, _x: i32, _y: i32) {
        match self.mode {
            EditMode::Point => self.undo_point(),
            EditMode::Contour => self.resolve_contour(),
        }
    }

    /// Confirm `working` as the new baseline. Disk I/O is the caller's
    /// concern.
    pub fn commit(&mut self) {
        self.committed.assign(&self.working);
        self.dirty = false;
    }

    /// Abandon in-progress region edits, reverting `working` to the
    /// committed baseline. The placed polygon, if any, stays.
    pub fn discard_edits(&mut self) {
        self.working.assign(&self.committed);
        self.dirty = false;
    }

    fn place_point(&mut self, x: i32, y: i32) {
        log::debug!("Placing point ({}, {})", x, y);
        if self.points.len() >= 3 {
            let (fx, fy) = self.points[0];
            let (dx, dy) = (i64::from(x - fx), i64::from(y - fy));
            let radius = i64::from(self.params.search_radius);
            if dx * dx + dy * dy <= radius * radius {
                self.points.push((x, y));
                self.close_polygon();
                return;
            }
        }
        self.points.push((x, y));
    }

    fn close_polygon(&mut self) {
        if let Some((bbox, coverage)) = raster::polygon_coverage(&self.points) {
            log::debug!("Polygon closed with {} points, bbox {:?}", self.points.len(), bbox);
            self.region = Some(Region { bbox, coverage });
            self.contour = ContourKind::Unchanged;
            self.mode = EditMode::Contour;
        }
    }

    fn undo_point(&mut self) {
        self.points.pop();
    }

    fn cycle_contour(&mut self) {
        self.contour = self.contour.next();
        log::debug!("Contour type now {:?}", self.contour);
        self.apply_contour();
    }

    /// Recompute `working` over the region's bounding box from `committed`,
    /// under the current contour kind.
    fn apply_contour(&mut self) {
        let Some(region) = &self.region else {
            return;
        };
        // Clicks may land slightly outside the image; composite only the
        // part of the bbox that intersects it.
        let x0 = region.bbox.x_min.max(0);
        let y0 = region.bbox.y_min.max(0);
        let x1 = region.bbox.x_max.min(self.width() as i32 - 1);
        let y1 = region.bbox.y_max.min(self.height() as i32 - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        let (rows, cols) = (y0 as usize..=y1 as usize, x0 as usize..=x1 as usize);
        let patch = region.coverage.slice(s![
            (y0 - region.bbox.y_min) as usize..=(y1 - region.bbox.y_min) as usize,
            (x0 - region.bbox.x_min) as usize..=(x1 - region.bbox.x_min) as usize
        ]);
        let committed = self.committed.slice(s![rows.clone(), cols.clone()]);
        let mut working = self.working.slice_mut(s![rows, cols]);

        match self.contour {
            ContourKind::Unchanged => working.assign(&committed),
            ContourKind::Black => Zip::from(&mut working)
                .and(&committed)
                .and(&patch)
                .for_each(|w, &c, &m| *w = c * (1.0 - m)),
            ContourKind::White => Zip::from(&mut working)
                .and(&committed)
                .and(&patch)
                .for_each(|w, &c, &m| *w = c * (1.0 - m) + m),
        }
    }

    fn resolve_contour(&mut self) {
        if self.contour != ContourKind::Unchanged {
            self.dirty = true;
        }
        log::debug!("Region resolved as {:?}", self.contour);
        self.points.clear();
        self.region = None;
        self.contour = ContourKind::Unchanged;
        self.mode = EditMode::Point;
    }

    /// Overlay color for the current mode. Derived, never stored.
    fn overlay_color(&self) -> Rgb<u8> {
        match self.mode {
            EditMode::Point => Rgb(PLACING_COLOR),
            EditMode::Contour => Rgb(RESOLVING_COLOR),
        }
    }

    /// Render the displayable composite: the image dimmed by the working
    /// mask (with a brightness floor), plus the polygon overlay. Pure
    /// function of the current state.
    pub fn render_composite(&self) -> RgbImage {
        let mut out = RgbImage::new(self.width(), self.height());
        for (x, y, pixel) in out.enumerate_pixels_mut() {
            let factor = (self.working[(y as usize, x as usize)] + MASK_PREVIEW_FLOOR).min(1.0);
            let src = self.image.get_pixel(x, y);
            *pixel = Rgb([
                (f32::from(src[0]) * factor).round() as u8,
                (f32::from(src[1]) * factor).round() as u8,
                (f32::from(src[2]) * factor).round() as u8,
            ]);
        }

        let color = self.overlay_color();
        for window in self.points.windows(2) {
            draw_thick_segment(
                &mut out,
                window[0],
                window[1],
                self.params.line_thickness,
                color,
            );
        }
        for &(x, y) in &self.points {
            draw_filled_circle_mut(&mut out, (x, y), self.params.circle_radius, color);
        }
        out
    }
}

/// Draw a segment of the given thickness as parallel one-pixel segments
/// offset along the normal.
fn draw_thick_segment(
    canvas: &mut RgbImage,
    from: PointI,
    to: PointI,
    thickness: i32,
    color: Rgb<u8>,
) {
    let dx = (to.0 - from.0) as f32;
    let dy = (to.1 - from.1) as f32;
    let length = dx.hypot(dy);
    if length == 0.0 {
        return;
    }
    let (nx, ny) = (-dy / length, dx / length);
    for step in 0..thickness.max(1) {
        let offset = step as f32 - (thickness - 1) as f32 / 2.0;
        draw_line_segment_mut(
            canvas,
            (from.0 as f32 + nx * offset, from.1 as f32 + ny * offset),
            (to.0 as f32 + nx * offset, to.1 as f32 + ny * offset),
            color,
        );
    }
}
