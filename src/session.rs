//! Edit session orchestration.
//!
//! An `EditSession` owns the catalog, the active pair index and the
//! processor for the active pair. It maps display-space clicks to
//! image-space clicks through the current `DisplayGeometry`, enforces the
//! auto-save-on-switch policy, and exposes the dirty flag and active pair
//! name so a UI layer can render the title independently of any string
//! format.
//!
//! Persisting writes the working mask to disk first and commits only after
//! a successful write, so a failed write leaves the session dirty and the
//! in-memory state consistent.

use std::path::Path;

use crate::catalog::Catalog;
use crate::constants::APP_NAME;
use crate::error::MaskError;
use crate::geometry::DisplayGeometry;
use crate::loader;
use crate::processor::MaskProcessor;

/// Orchestration state around the active `MaskProcessor`.
pub struct EditSession {
    catalog: Catalog,
    active: Option<usize>,
    processor: Option<MaskProcessor>,
    geometry: Option<DisplayGeometry>,
    viewport: (f32, f32),
}

impl EditSession {
    /// Create a session rendering into a `width` x `height` display surface.
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            catalog: Catalog::default(),
            active: None,
            processor: None,
            geometry: None,
            viewport: (viewport_width, viewport_height),
        }
    }

    /// Scan `folder` into a fresh catalog. Drops the active pair; nothing is
    /// selected until the next `select_pair`.
    pub fn load_catalog(&mut self, folder: &Path) -> Result<usize, MaskError> {
        let catalog = Catalog::scan(folder)?;
        let count = catalog.len();
        self.catalog = catalog;
        self.active = None;
        self.processor = None;
        self.geometry = None;
        Ok(count)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Display name of the active pair, for title/status rendering.
    pub fn active_name(&self) -> Option<String> {
        let index = self.active?;
        Some(self.catalog.get(index)?.image_path.to_string_lossy().into_owned())
    }

    /// True when the active pair has unsaved region edits.
    pub fn is_dirty(&self) -> bool {
        self.processor.as_ref().is_some_and(MaskProcessor::is_dirty)
    }

    /// Window-title convenience: the active pair's path, `* `-prefixed when
    /// dirty, or the application name when nothing is selected.
    pub fn title(&self) -> String {
        match self.active_name() {
            Some(name) if self.is_dirty() => format!("* {}", name),
            Some(name) => name,
            None => APP_NAME.to_string(),
        }
    }

    /// Make the pair at `index` active.
    ///
    /// A dirty active pair is persisted first (auto-save-on-switch). On any
    /// failure the previous pair stays active and untouched. Any unresolved
    /// polygon on the previous pair is silently discarded with its
    /// processor.
    pub fn select_pair(&mut self, index: usize) -> Result<(), MaskError> {
        let pair = self
            .catalog
            .get(index)
            .ok_or(MaskError::IndexOutOfRange {
                index,
                len: self.catalog.len(),
            })?
            .clone();

        if self.is_dirty() {
            self.persist_active()?;
        }

        let (image, mask) = loader::load_pair(&pair)?;
        let processor = MaskProcessor::new(image, &mask)?;
        self.geometry = Some(DisplayGeometry::fit(
            processor.width(),
            processor.height(),
            self.viewport.0,
            self.viewport.1,
        ));
        self.processor = Some(processor);
        self.active = Some(index);
        log::info!("Selected pair {}: {:?}", index, pair.image_path);
        Ok(())
    }

    /// Write the active pair's working mask to disk, then commit. No-op when
    /// nothing is selected.
    pub fn persist_active(&mut self) -> Result<(), MaskError> {
        let (Some(index), Some(processor)) = (self.active, self.processor.as_mut()) else {
            return Ok(());
        };
        let Some(pair) = self.catalog.get(index) else {
            return Ok(());
        };
        loader::save_mask(&pair.mask_path, processor.working())?;
        processor.commit();
        log::info!("Saved mask {:?}", pair.mask_path);
        Ok(())
    }

    /// Revert the active pair's working mask to its committed baseline.
    /// No-op when nothing is selected.
    pub fn discard_active(&mut self) {
        if let Some(processor) = self.processor.as_mut() {
            processor.discard_edits();
            log::info!("Restored mask to last saved state");
        }
    }

    /// Record the display surface size, refitting the active image when the
    /// size changed.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if self.viewport == (width, height) {
            return;
        }
        self.viewport = (width, height);
        if let Some(processor) = &self.processor {
            self.geometry = Some(DisplayGeometry::fit(
                processor.width(),
                processor.height(),
                width,
                height,
            ));
        }
    }

    pub fn geometry(&self) -> Option<&DisplayGeometry> {
        self.geometry.as_ref()
    }

    pub fn processor(&self) -> Option<&MaskProcessor> {
        self.processor.as_ref()
    }

    /// Forward a primary click in display coordinates. Returns true when the
    /// composite needs re-rendering.
    pub fn handle_primary_click(&mut self, display_x: f32, display_y: f32) -> bool {
        let (Some(geometry), Some(processor)) = (self.geometry, self.processor.as_mut()) else {
            return false;
        };
        let (x, y) = geometry.display_to_image(display_x, display_y);
        log::debug!("Primary click at display ({:.1}, {:.1}) -> image ({}, {})", display_x, display_y, x, y);
        processor.primary_click(x, y);
        true
    }

    /// Forward a secondary click in display coordinates. Returns true when
    /// the composite needs re-rendering.
    pub fn handle_secondary_click(&mut self, display_x: f32, display_y: f32) -> bool {
        let (Some(geometry), Some(processor)) = (self.geometry, self.processor.as_mut()) else {
            return false;
        };
        let (x, y) = geometry.display_to_image(display_x, display_y);
        log::debug!("Secondary click at display ({:.1}, {:.1}) -> image ({}, {})", display_x, display_y, x, y);
        processor.secondary_click(x, y);
        true
    }

    /// Render the active pair's composite, or `None` when nothing is
    /// selected.
    pub fn render_composite(&self) -> Option<image::RgbImage> {
        Some(self.processor.as_ref()?.render_composite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use std::path::PathBuf;

    const VIEW_W: f32 = 550.0;
    const VIEW_H: f32 = 850.0;

    /// Write a `side` x `side` gray image and a uniform mask pair under
    /// `dir` and return the mask path.
    fn write_pair(dir: &Path, name: &str, side: u32, mask_value: u8) -> PathBuf {
        let image = RgbImage::from_pixel(side, side, Rgb([90, 120, 150]));
        image.save(dir.join(format!("{name}.png"))).unwrap();
        let mask = GrayImage::from_pixel(side, side, Luma([mask_value]));
        let mask_path = dir.join(format!("{name}_mask.jpg"));
        crate::loader::save_mask(&mask_path, &crate::loader::mask_to_array(&mask)).unwrap();
        mask_path
    }

    /// Map an image-space pixel center to display coordinates.
    fn display_pos(session: &EditSession, x: i32, y: i32) -> (f32, f32) {
        let g = session.geometry().unwrap();
        g.image_to_display(x as f32 + 0.5, y as f32 + 0.5)
    }

    fn click(session: &mut EditSession, x: i32, y: i32) {
        let (dx, dy) = display_pos(session, x, y);
        assert!(session.handle_primary_click(dx, dy));
    }

    fn click_secondary(session: &mut EditSession, x: i32, y: i32) {
        let (dx, dy) = display_pos(session, x, y);
        assert!(session.handle_secondary_click(dx, dy));
    }

    /// Draw a square region over the active pair and resolve it as White.
    fn paint_white_square(session: &mut EditSession) {
        click(session, 10, 10);
        click(session, 90, 10);
        click(session, 90, 90);
        click(session, 10, 90);
        click(session, 11, 11); // closes
        click(session, 0, 0); // Black
        click(session, 0, 0); // White
        click_secondary(session, 0, 0); // resolve
    }

    #[test]
    fn test_clicks_without_active_pair_are_noops() {
        let mut session = EditSession::new(VIEW_W, VIEW_H);
        assert!(!session.handle_primary_click(10.0, 10.0));
        assert!(!session.handle_secondary_click(10.0, 10.0));
        assert!(session.render_composite().is_none());
        session.discard_active();
        session.persist_active().unwrap();
        assert_eq!(session.title(), APP_NAME);
    }

    #[test]
    fn test_select_out_of_range_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_pair(dir.path(), "a", 32, 0);
        let mut session = EditSession::new(VIEW_W, VIEW_H);
        assert_eq!(session.load_catalog(dir.path()).unwrap(), 1);

        let err = session.select_pair(5).unwrap_err();
        assert!(matches!(
            err,
            MaskError::IndexOutOfRange { index: 5, len: 1 }
        ));
        assert_eq!(session.active_index(), None);
    }

    #[test]
    fn test_dimension_mismatch_keeps_prior_pair() {
        let dir = tempfile::tempdir().unwrap();
        write_pair(dir.path(), "a", 32, 0);
        // Pair with a mask of the wrong shape.
        let image = RgbImage::new(32, 32);
        image.save(dir.path().join("b.png")).unwrap();
        let mask = GrayImage::new(16, 16);
        mask.save(dir.path().join("b_mask.jpg")).unwrap();

        let mut session = EditSession::new(VIEW_W, VIEW_H);
        session.load_catalog(dir.path()).unwrap();
        session.select_pair(0).unwrap();

        let err = session.select_pair(1).unwrap_err();
        assert!(matches!(err, MaskError::DimensionMismatch { .. }));
        assert_eq!(session.active_index(), Some(0));
        assert!(session.render_composite().is_some());
    }

    #[test]
    fn test_persist_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write_pair(dir.path(), "a", 32, 128);
        let mut session = EditSession::new(VIEW_W, VIEW_H);
        session.load_catalog(dir.path()).unwrap();
        session.select_pair(0).unwrap();

        let committed = session.processor().unwrap().committed().clone();
        session.persist_active().unwrap();
        session.select_pair(0).unwrap();

        let reloaded = session.processor().unwrap().committed();
        for (a, b) in committed.iter().zip(reloaded.iter()) {
            assert!((a - b).abs() <= 1.0 / 255.0 + 1e-6);
        }
    }

    #[test]
    fn test_white_square_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let mask_path = write_pair(dir.path(), "a", 100, 0);
        let mut session = EditSession::new(VIEW_W, VIEW_H);
        session.load_catalog(dir.path()).unwrap();
        session.select_pair(0).unwrap();

        paint_white_square(&mut session);
        assert!(session.is_dirty());
        assert!(session.title().starts_with("* "));

        session.persist_active().unwrap();
        assert!(!session.is_dirty());

        let saved = image::open(&mask_path).unwrap().to_luma8();
        // Sampled away from the region edge so JPEG blocks are uniform.
        for &(x, y) in &[(20, 20), (50, 50), (80, 80)] {
            assert!(saved.get_pixel(x, y)[0] >= 254);
        }
        for &(x, y) in &[(4, 4), (4, 95), (95, 4)] {
            assert!(saved.get_pixel(x, y)[0] <= 2);
        }
    }

    #[test]
    fn test_auto_save_on_switch() {
        let dir = tempfile::tempdir().unwrap();
        let mask_a = write_pair(dir.path(), "a", 100, 0);
        write_pair(dir.path(), "b", 100, 0);
        let mut session = EditSession::new(VIEW_W, VIEW_H);
        session.load_catalog(dir.path()).unwrap();
        session.select_pair(0).unwrap();

        paint_white_square(&mut session);
        session.select_pair(1).unwrap();
        assert_eq!(session.active_index(), Some(1));
        assert!(!session.is_dirty());

        let saved = image::open(&mask_a).unwrap().to_luma8();
        assert!(saved.get_pixel(50, 50)[0] >= 254);
    }

    #[test]
    fn test_switch_discards_unresolved_polygon() {
        let dir = tempfile::tempdir().unwrap();
        let mask_a = write_pair(dir.path(), "a", 100, 0);
        write_pair(dir.path(), "b", 100, 0);
        let mut session = EditSession::new(VIEW_W, VIEW_H);
        session.load_catalog(dir.path()).unwrap();
        session.select_pair(0).unwrap();

        // Close a region and preview White, but never resolve: not dirty,
        // so switching drops the polygon without saving.
        click(&mut session, 10, 10);
        click(&mut session, 90, 10);
        click(&mut session, 90, 90);
        click(&mut session, 10, 90);
        click(&mut session, 11, 11);
        click(&mut session, 0, 0); // Black
        click(&mut session, 0, 0); // White preview
        assert!(!session.is_dirty());

        session.select_pair(1).unwrap();
        session.select_pair(0).unwrap();
        assert!(session.processor().unwrap().points().is_empty());
        let saved = image::open(&mask_a).unwrap().to_luma8();
        assert!(saved.get_pixel(50, 50)[0] <= 2);
    }

    #[test]
    fn test_discard_active_restores_committed() {
        let dir = tempfile::tempdir().unwrap();
        write_pair(dir.path(), "a", 100, 0);
        let mut session = EditSession::new(VIEW_W, VIEW_H);
        session.load_catalog(dir.path()).unwrap();
        session.select_pair(0).unwrap();

        paint_white_square(&mut session);
        assert!(session.is_dirty());
        session.discard_active();
        assert!(!session.is_dirty());
        let processor = session.processor().unwrap();
        assert_eq!(processor.working(), processor.committed());
    }

    #[test]
    fn test_persist_failure_leaves_dirty() {
        let dir = tempfile::tempdir().unwrap();
        write_pair(dir.path(), "a", 100, 0);
        let mut session = EditSession::new(VIEW_W, VIEW_H);
        session.load_catalog(dir.path()).unwrap();
        session.select_pair(0).unwrap();
        paint_white_square(&mut session);

        // Make the mask path unwritable by turning it into a directory.
        let mask_path = dir.path().join("a_mask.jpg");
        std::fs::remove_file(&mask_path).unwrap();
        std::fs::create_dir(&mask_path).unwrap();

        assert!(session.persist_active().is_err());
        assert!(session.is_dirty());
    }

    #[test]
    fn test_load_catalog_resets_selection() {
        let dir = tempfile::tempdir().unwrap();
        write_pair(dir.path(), "a", 32, 0);
        let mut session = EditSession::new(VIEW_W, VIEW_H);
        session.load_catalog(dir.path()).unwrap();
        session.select_pair(0).unwrap();
        assert!(session.active_index().is_some());

        session.load_catalog(dir.path()).unwrap();
        assert_eq!(session.active_index(), None);
        assert!(session.render_composite().is_none());
    }
}
