//! Catalog of (image, mask) sibling pairs discovered by directory scan.
//!
//! A pair is an image file plus its mask sibling `<base>_mask.jpg` in the
//! same directory; images without a sibling are silently skipped. The scan
//! is recursive with a stable, reproducible order: entries within a
//! directory are visited lexicographically, files before subdirectories.

use std::path::{Path, PathBuf};

use crate::constants::{IMAGE_EXTENSIONS, MASK_EXTENSION, MASK_SUFFIX};
use crate::error::MaskError;

/// One (image path, mask path) association. Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    /// Path of the source image.
    pub image_path: PathBuf,
    /// Path of the mask sibling.
    pub mask_path: PathBuf,
}

impl ImagePair {
    /// Human-readable label: `file name (parent directory)`.
    pub fn display_name(&self) -> String {
        let name = self
            .image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = self
            .image_path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{} ({})", name, parent)
    }
}

/// Ordered collection of discovered pairs.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pairs: Vec<ImagePair>,
}

impl Catalog {
    /// Scan `folder` recursively for image/mask pairs.
    pub fn scan(folder: &Path) -> Result<Self, MaskError> {
        let mut pairs = Vec::new();
        scan_folder(folder, &mut pairs)?;
        log::info!("Scanned {:?}: found {} pairs", folder, pairs.len());
        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImagePair> {
        self.pairs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImagePair> {
        self.pairs.iter()
    }
}

/// Check if a path has a recognized image extension.
fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// The expected mask sibling: same directory, `<stem>_mask.jpg`.
fn mask_sibling(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let parent = path.parent()?;
    Some(parent.join(format!("{}{}.{}", stem, MASK_SUFFIX, MASK_EXTENSION)))
}

/// Recursively scan one directory, files before subdirectories, both in
/// lexicographic order.
fn scan_folder(folder: &Path, pairs: &mut Vec<ImagePair>) -> Result<(), MaskError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    for path in entries.iter().filter(|p| p.is_file()) {
        if !is_image_file(path) {
            continue;
        }
        // Anything with the mask marker in its path is itself a mask.
        if path.to_string_lossy().contains(MASK_SUFFIX) {
            continue;
        }
        let Some(mask_path) = mask_sibling(path) else {
            continue;
        };
        if mask_path.exists() {
            pairs.push(ImagePair {
                image_path: path.clone(),
                mask_path,
            });
        } else {
            log::debug!("No mask sibling for {:?}, skipping", path);
        }
    }

    for path in entries.iter().filter(|p| p.is_dir()) {
        if let Err(e) = scan_folder(path, pairs) {
            // Keep scanning other directories.
            log::warn!("Failed to scan subdirectory {:?}: {}", path, e);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_pair_requires_mask_sibling() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("a_mask.jpg"));
        touch(&dir.path().join("b.png"));

        let catalog = Catalog::scan(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get(0).unwrap().image_path,
            dir.path().join("a.jpg")
        );
        assert_eq!(
            catalog.get(0).unwrap().mask_path,
            dir.path().join("a_mask.jpg")
        );
    }

    #[test]
    fn test_mask_files_are_not_images() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("a_mask.jpg"));
        // The sibling itself must not be catalogued even though it has an
        // image extension and a (nonsensical) sibling of its own.
        touch(&dir.path().join("a_mask_mask.jpg"));

        let catalog = Catalog::scan(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_extension_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.JPG"));
        touch(&dir.path().join("a_mask.jpg"));
        touch(&dir.path().join("b.Png"));
        touch(&dir.path().join("b_mask.jpg"));
        touch(&dir.path().join("notes.txt"));

        let catalog = Catalog::scan(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_recursive_scan_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub/a.jpg"));
        touch(&dir.path().join("sub/a_mask.jpg"));
        touch(&dir.path().join("z.jpg"));
        touch(&dir.path().join("z_mask.jpg"));
        touch(&dir.path().join("b.jpg"));
        touch(&dir.path().join("b_mask.jpg"));

        let catalog = Catalog::scan(dir.path()).unwrap();
        let names: Vec<_> = catalog
            .iter()
            .map(|p| p.image_path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        // Root files in lexicographic order, then the subdirectory.
        assert_eq!(
            names,
            vec![
                PathBuf::from("b.jpg"),
                PathBuf::from("z.jpg"),
                PathBuf::from("sub/a.jpg"),
            ]
        );
    }

    #[test]
    fn test_display_name() {
        let pair = ImagePair {
            image_path: PathBuf::from("/data/set1/a.jpg"),
            mask_path: PathBuf::from("/data/set1/a_mask.jpg"),
        };
        assert_eq!(pair.display_name(), "a.jpg (/data/set1)");
    }
}
