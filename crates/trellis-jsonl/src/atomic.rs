//! Atomic write operations for JSONL files.
//!
//! On POSIX systems, renames within one filesystem are atomic. This module
//! exploits that to provide crash-safe whole-file writes:
//!
//! 1. Data is written to a temporary file with a `.tmp` extension.
//! 2. The temporary file is flushed and closed.
//! 3. The temporary file is atomically renamed over the target path.
//!
//! If a crash occurs before the rename, the original file is untouched.
//! The temporary file may be left behind, but data integrity is preserved.

use crate::error::Result;
use crate::writer::JsonlWriter;
use serde::Serialize;
use std::path::Path;
use tokio::fs::File;

/// Atomically writes a slice of values to a JSONL file.
///
/// Either all values are written and the target file is replaced, or the
/// target file is left unchanged.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, a value fails
/// to serialize, an IO error occurs during writing, or the rename fails.
/// On failure the original file (if any) is left unchanged.
pub async fn write_jsonl_atomic<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_jsonl_atomic_iter(path, values.iter()).await
}

/// Atomically writes an iterator of values to a JSONL file.
///
/// A more flexible version of [`write_jsonl_atomic`] that avoids collecting
/// values into a slice first.
///
/// # Errors
///
/// See [`write_jsonl_atomic`].
pub async fn write_jsonl_atomic_iter<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    if let Err(e) = write_to_temp_file(&temp_path, values).await {
        // Best-effort cleanup of the temp file before propagating
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Creates the temporary path used during an atomic write.
///
/// Appends `.tmp` to the filename: `deps.jsonl` becomes `deps.jsonl.tmp`.
fn make_temp_path(path: &Path) -> std::path::PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}

async fn write_to_temp_file<T, I>(temp_path: &Path, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = JsonlWriter::new(file);
    writer.write_all(values).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestRecord {
        id: u32,
        name: String,
    }

    #[test]
    fn make_temp_path_with_extension() {
        let path = Path::new("/path/to/file.jsonl");
        assert_eq!(make_temp_path(path), Path::new("/path/to/file.jsonl.tmp"));
    }

    #[test]
    fn make_temp_path_without_extension() {
        let path = Path::new("/path/to/file");
        assert_eq!(make_temp_path(path), Path::new("/path/to/file.tmp"));
    }

    #[test]
    fn make_temp_path_relative() {
        let path = Path::new("data.jsonl");
        assert_eq!(make_temp_path(path), Path::new("data.jsonl.tmp"));
    }

    #[tokio::test]
    async fn atomic_write_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("records.jsonl");

        let records = vec![
            TestRecord {
                id: 1,
                name: "first".to_string(),
            },
            TestRecord {
                id: 2,
                name: "second".to_string(),
            },
        ];

        write_jsonl_atomic(&target, &records).await.unwrap();
        assert!(target.exists());

        let mut contents = String::new();
        File::open(&target)
            .await
            .unwrap()
            .read_to_string(&mut contents)
            .await
            .unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn atomic_write_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("records.jsonl");

        let first = vec![TestRecord {
            id: 1,
            name: "old".to_string(),
        }];
        write_jsonl_atomic(&target, &first).await.unwrap();

        let second = vec![
            TestRecord {
                id: 2,
                name: "new".to_string(),
            },
            TestRecord {
                id: 3,
                name: "newer".to_string(),
            },
        ];
        write_jsonl_atomic(&target, &second).await.unwrap();

        let mut contents = String::new();
        File::open(&target)
            .await
            .unwrap()
            .read_to_string(&mut contents)
            .await
            .unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("\"new\""));
        assert!(!contents.contains("\"old\""));
    }

    #[tokio::test]
    async fn atomic_write_leaves_no_temp_file_behind() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("records.jsonl");

        let records = vec![TestRecord {
            id: 1,
            name: "only".to_string(),
        }];
        write_jsonl_atomic(&target, &records).await.unwrap();

        assert!(!make_temp_path(&target).exists());
    }
}
