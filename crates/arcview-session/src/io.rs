//! State file reading and writing
//!
//! A missing file is "no prior state", not an error. An unreadable file or
//! a directory path is a real error, surfaced to the caller with the
//! in-memory state untouched. A file that parses but carries bad fields
//! degrades field by field inside [`ViewerState::from_document`].

use std::fs;
use std::path::Path;

use crate::error::{SessionError, SessionResult};
use crate::state::ViewerState;

/// Write `state` to `path`, creating parent directories as needed.
pub fn save_state_to_file(path: &Path, state: &ViewerState) -> SessionResult<()> {
    if path.is_dir() {
        return Err(SessionError::NotAFile(path.to_path_buf()));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| SessionError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let document = state.to_document();
    let text = serde_json::to_string_pretty(&document)?;
    fs::write(path, text)?;
    log::debug!("viewer state saved to {}", path.display());
    Ok(())
}

/// Read a state from `path`.
///
/// Returns `Ok(None)` when the file does not exist (first start). A file
/// that exists but does not parse restores the default state with a
/// warning: malformed persisted data never blocks loading.
pub fn restore_state_from_file(path: &Path) -> SessionResult<Option<ViewerState>> {
    if !path.exists() {
        // No warning: this is the normal first start.
        return Ok(None);
    }
    if path.is_dir() {
        return Err(SessionError::NotAFile(path.to_path_buf()));
    }

    let text = fs::read_to_string(path)?;
    let state = match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(document) => ViewerState::from_document(&document),
        Err(err) => {
            log::warn!(
                "state file {} is not a valid document ({err}); using defaults",
                path.display()
            );
            ViewerState::default()
        }
    };

    log::debug!("viewer state restored from {}", path.display());
    Ok(Some(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Geometry;

    #[test]
    fn test_save_restore_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");

        let state = ViewerState {
            axis_is_drawn: true,
            geometry: Geometry::Windowed {
                width: 800,
                height: 600,
                pos: (10, 20),
            },
            ..ViewerState::default()
        };

        save_state_to_file(&path, &state).unwrap();
        let restored = restore_state_from_file(&path).unwrap().unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_missing_file_is_no_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let result = restore_state_from_file(&dir.path().join("absent.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_directory_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            restore_state_from_file(dir.path()),
            Err(SessionError::NotAFile(_))
        ));
        assert!(matches!(
            save_state_to_file(dir.path(), &ViewerState::default()),
            Err(SessionError::NotAFile(_))
        ));
    }

    #[test]
    fn test_unparsable_file_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        fs::write(&path, "not a document {").unwrap();

        let restored = restore_state_from_file(&path).unwrap().unwrap();
        assert_eq!(restored, ViewerState::default());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config/viewer.json");

        save_state_to_file(&path, &ViewerState::default()).unwrap();
        assert!(path.exists());
    }
}
