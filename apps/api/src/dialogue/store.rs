//! Transcript persistence to a single fixed file.
//!
//! Each save replaces the whole file: the JSON is written to a temp file in the
//! same directory and renamed over the target. Concurrent saves race; the last
//! rename wins.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::dialogue::TranscriptError;
use crate::models::dialogue::DialogueTurn;

pub async fn save_transcript(path: &Path, turns: &[DialogueTurn]) -> Result<(), TranscriptError> {
    let json = serde_json::to_vec_pretty(turns)?;
    let target = path.to_path_buf();

    tokio::task::spawn_blocking(move || write_atomically(&target, &json))
        .await
        .map_err(|e| TranscriptError::Write {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), TranscriptError> {
    let write_error = |source: std::io::Error| TranscriptError::Write {
        path: path.display().to_string(),
        source,
    };

    let dir = parent_dir(path);
    let mut file = NamedTempFile::new_in(&dir).map_err(write_error)?;
    file.write_all(contents).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::parser::parse_transcript;

    #[tokio::test]
    async fn test_save_overwrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("course.json");

        let turns = parse_transcript("Emp: hi\nAI: hello\nEmp: bye").unwrap();
        save_transcript(&path, &turns).await.unwrap();
        let first = std::fs::read(&path).unwrap();

        save_transcript(&path, &turns).await.unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        let saved: serde_json::Value = serde_json::from_slice(&second).unwrap();
        assert_eq!(
            saved,
            serde_json::json!([{"Emp": "hi", "AI": "hello"}, {"Emp": "bye"}])
        );
    }

    #[tokio::test]
    async fn test_save_replaces_previous_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("course.json");

        let long = parse_transcript("A: 1\nB: 2\nA: 3\nB: 4").unwrap();
        save_transcript(&path, &long).await.unwrap();
        let short = parse_transcript("A: x\nB: y").unwrap();
        save_transcript(&path, &short).await.unwrap();

        let saved: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved, serde_json::json!([{"A": "x", "B": "y"}]));
    }

    #[tokio::test]
    async fn test_unwritable_location_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-subdir").join("course.json");

        let result = save_transcript(&path, &[]).await;
        assert!(matches!(result, Err(TranscriptError::Write { .. })));
    }

    #[test]
    fn test_parent_dir_of_bare_filename_is_cwd() {
        assert_eq!(parent_dir(Path::new("course.json")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/tmp/x/course.json")), PathBuf::from("/tmp/x"));
    }
}
