//! Ordered concatenation and all-or-nothing artifact persistence.

use std::path::Path;

use tracing::debug;

use bookdesk_shared::{BookdeskError, Result};

/// Marker repeated to form the separator line between fragments.
const DELIMITER_MARKER: &str = "=";

/// Width of the separator line.
const DELIMITER_WIDTH: usize = 80;

/// The fixed delimiter inserted between adjacent fragments: a line of 80
/// `=` characters padded by blank lines, so fragment boundaries stay
/// locatable in the assembled text.
pub fn delimiter() -> String {
    format!("\n\n{}\n\n", DELIMITER_MARKER.repeat(DELIMITER_WIDTH))
}

/// Concatenate fragments in source order.
///
/// Precondition: every configured source produced a fragment. An upstream
/// fetch error shows up here as a count mismatch and no content is produced.
pub(crate) fn assemble(fragments: &[String], expected: usize) -> Result<String> {
    if fragments.len() != expected {
        return Err(BookdeskError::Incomplete {
            expected,
            got: fragments.len(),
        });
    }

    Ok(fragments.join(&delimiter()))
}

/// Write the artifact atomically: temp file in the same directory, then rename.
///
/// Either the artifact becomes fully visible at `location` or the filesystem
/// is left as it was; a truncated artifact is never observable by a later
/// cache probe.
pub(crate) fn write_artifact(location: &Path, content: &str) -> Result<()> {
    let file_name = location
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            BookdeskError::io(
                location,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "artifact path has no file name",
                ),
            )
        })?;

    if let Some(parent) = location.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| BookdeskError::io(parent, e))?;
        }
    }

    let temp = location.with_file_name(format!(".{file_name}.tmp"));

    if let Err(e) = std::fs::write(&temp, content) {
        let _ = std::fs::remove_file(&temp);
        return Err(BookdeskError::io(&temp, e));
    }

    if let Err(e) = std::fs::rename(&temp, location) {
        let _ = std::fs::remove_file(&temp);
        return Err(BookdeskError::io(location, e));
    }

    debug!(path = %location.display(), bytes = content.len(), "artifact written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bd-persist-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn assemble_joins_in_source_order() {
        let fragments = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let content = assemble(&fragments, 3).unwrap();

        let d = delimiter();
        assert_eq!(content, format!("one{d}two{d}three"));
    }

    #[test]
    fn assemble_single_fragment_has_no_delimiter() {
        let fragments = vec!["only".to_string()];
        let content = assemble(&fragments, 1).unwrap();
        assert_eq!(content, "only");
    }

    #[test]
    fn assemble_rejects_count_mismatch() {
        let fragments = vec!["one".to_string(), "two".to_string()];
        let err = assemble(&fragments, 8).unwrap_err();
        assert!(matches!(
            err,
            BookdeskError::Incomplete {
                expected: 8,
                got: 2
            }
        ));
    }

    #[test]
    fn delimiter_is_deterministic() {
        assert_eq!(delimiter(), delimiter());
        assert!(delimiter().contains(&"=".repeat(80)));
        assert!(!delimiter().contains(&"=".repeat(81)));
    }

    #[test]
    fn write_artifact_roundtrip() {
        let dir = temp_dir();
        let path = dir.join("book.txt");

        write_artifact(&path, "full text").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "full text");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_artifact_leaves_no_temp_file() {
        let dir = temp_dir();
        let path = dir.join("book.txt");

        write_artifact(&path, "content").unwrap();

        for entry in std::fs::read_dir(&dir).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "temp file left behind: {name}");
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_artifact_creates_parent_dirs() {
        let dir = temp_dir();
        let path = dir.join("var/nested/book.txt");

        write_artifact(&path, "content").unwrap();
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_artifact_replaces_existing() {
        let dir = temp_dir();
        let path = dir.join("book.txt");

        write_artifact(&path, "old").unwrap();
        write_artifact(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
