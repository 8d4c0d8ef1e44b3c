//! Snapshot naming and PNG output
//!
//! The viewer numbers its screenshots: `name-0000.png`, `name-0001.png`,
//! and so on. The embedder reads back the framebuffer pixels and hands
//! them to [`save_snapshot`].

use std::path::{Path, PathBuf};

use crate::error::{ViewerError, ViewerResult};

/// Snapshot file naming state.
#[derive(Debug, Clone)]
pub struct SnapshotNamer {
    base_name: String,
    counter: u32,
    overwrite: bool,
}

impl Default for SnapshotNamer {
    fn default() -> Self {
        Self {
            base_name: "snapshot".to_string(),
            counter: 0,
            overwrite: false,
        }
    }
}

impl SnapshotNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base file name without extension (default `"snapshot"`).
    pub fn set_base_name(&mut self, name: &str) {
        self.base_name = name.to_string();
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Next counter value used for a numbered snapshot.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn set_counter(&mut self, counter: u32) {
        self.counter = counter;
    }

    /// When set, snapshots always target `name.png` without numbering.
    pub fn set_overwrite(&mut self, overwrite: bool) {
        self.overwrite = overwrite;
    }

    /// The path of the next snapshot in `dir`, advancing the counter for
    /// numbered snapshots.
    pub fn next_path(&mut self, dir: &Path) -> PathBuf {
        if self.overwrite {
            return dir.join(format!("{}.png", self.base_name));
        }
        let path = dir.join(format!("{}-{:04}.png", self.base_name, self.counter));
        self.counter += 1;
        path
    }
}

/// Encode RGBA pixels (row-major, top-to-bottom) as a PNG file.
pub fn save_snapshot(path: &Path, rgba: &[u8], width: u32, height: u32) -> ViewerResult<()> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(ViewerError::Snapshot(format!(
            "pixel buffer is {} bytes, expected {expected} for {width}x{height}",
            rgba.len()
        )));
    }

    let img: image::RgbaImage = image::ImageBuffer::from_raw(width, height, rgba.to_vec())
        .ok_or_else(|| ViewerError::Snapshot("failed to build image buffer".to_string()))?;
    img.save(path)
        .map_err(|e| ViewerError::Snapshot(format!("failed to save {}: {e}", path.display())))?;
    log::info!("snapshot saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_names_advance() {
        let mut namer = SnapshotNamer::new();
        let dir = Path::new("/tmp/shots");
        assert_eq!(namer.next_path(dir), dir.join("snapshot-0000.png"));
        assert_eq!(namer.next_path(dir), dir.join("snapshot-0001.png"));
        assert_eq!(namer.counter(), 2);
    }

    #[test]
    fn test_overwrite_mode_keeps_one_name() {
        let mut namer = SnapshotNamer::new();
        namer.set_base_name("frame");
        namer.set_overwrite(true);
        let dir = Path::new("/tmp");
        assert_eq!(namer.next_path(dir), dir.join("frame.png"));
        assert_eq!(namer.next_path(dir), dir.join("frame.png"));
        assert_eq!(namer.counter(), 0);
    }

    #[test]
    fn test_save_snapshot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let pixels = vec![255u8; 4 * 4 * 4];
        save_snapshot(&path, &pixels, 4, 4).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_snapshot_rejects_bad_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let result = save_snapshot(&path, &[0u8; 10], 4, 4);
        assert!(result.is_err());
    }
}
