//! JSON persistence for the record collection

use crate::output::{OutputError, OutputResult, Record};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};

/// Serializes records as an indented JSON array
///
/// Four-space indentation; non-ASCII characters are written literally.
fn to_pretty_json(records: &[Record]) -> OutputResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Path of the temporary file written next to `path` before the final rename
fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "records.json".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}

/// Writes the records to `path`, replacing any existing file atomically
///
/// The JSON is written to a sibling temporary file which is then renamed over
/// the destination, so readers never observe a half-written file. Parent
/// directories are not created.
///
/// # Arguments
///
/// * `records` - The records to persist, in collection order
/// * `path` - Destination file
///
/// # Returns
///
/// * `Ok(())` - File written
/// * `Err(OutputError)` - Serialization or I/O failure; `path` is left untouched
pub fn write_records(records: &[Record], path: &Path) -> OutputResult<()> {
    let bytes = to_pretty_json(records)?;
    let staging = staging_path(path);

    if let Err(source) = std::fs::write(&staging, &bytes) {
        let _ = std::fs::remove_file(&staging);
        return Err(OutputError::Write {
            path: staging.display().to_string(),
            source,
        });
    }

    if let Err(source) = std::fs::rename(&staging, path) {
        let _ = std::fs::remove_file(&staging);
        return Err(OutputError::Write {
            path: path.display().to_string(),
            source,
        });
    }

    tracing::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Reads a record collection previously written by [`write_records`]
pub fn load_records(path: &Path) -> OutputResult<Vec<Record>> {
    let content = std::fs::read_to_string(path).map_err(|source| OutputError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_records() -> Vec<Record> {
        vec![
            Record {
                context: "Crème brûlée à 東京".to_string(),
                question: "What is it?".to_string(),
                answer: "A dessert.".to_string(),
            },
            Record::fallback("second page"),
        ]
    }

    #[test]
    fn test_write_uses_four_space_indent_and_key_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_records(&sample_records(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.starts_with("[\n    {\n        \"context\""));
        let context_pos = content.find("\"context\"").unwrap();
        let question_pos = content.find("\"question\"").unwrap();
        let answer_pos = content.find("\"answer\"").unwrap();
        assert!(context_pos < question_pos && question_pos < answer_pos);
    }

    #[test]
    fn test_write_keeps_unicode_literal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_records(&sample_records(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.contains("Crème brûlée à 東京"));
        assert!(!content.contains("\\u"));
    }

    #[test]
    fn test_write_replaces_existing_file_and_leaves_no_staging() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "old contents").unwrap();

        write_records(&sample_records(), &path).unwrap();

        assert_eq!(load_records(&path).unwrap(), sample_records());
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_empty_collection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");

        write_records(&[], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let result = write_records(&sample_records(), &path);
        assert!(matches!(result, Err(OutputError::Write { .. })));
        assert!(!path.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_staging_write_removes_staging_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let staging = staging_path(&path);
        // Every write to /dev/full fails with ENOSPC
        std::os::unix::fs::symlink("/dev/full", &staging).unwrap();

        let result = write_records(&sample_records(), &path);

        assert!(matches!(result, Err(OutputError::Write { .. })));
        assert!(std::fs::symlink_metadata(&staging).is_err());
        assert!(!path.exists());
    }
}
