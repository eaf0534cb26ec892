//! Markup input and artifact output
//!
//! Provides:
//! - Size-limited reading of markup files with BOM / UTF-16 detection
//! - Atomic byte writes (temp file in the same directory, then rename)
//! - Parent directory creation for store and artifact paths

use crate::config::MAX_FILE_SIZE;
use crate::error::{FileError, FileResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Detected encoding of a markup file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileEncoding {
    #[default]
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
}

/// Markup text read from disk
#[derive(Debug, Clone)]
pub struct MarkupSource {
    pub text: String,
    pub encoding: FileEncoding,
    pub size_bytes: u64,
}

fn detect_encoding(bytes: &[u8]) -> FileEncoding {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => FileEncoding::Utf8Bom,
        [0xFF, 0xFE, ..] => FileEncoding::Utf16Le,
        [0xFE, 0xFF, ..] => FileEncoding::Utf16Be,
        _ => FileEncoding::Utf8,
    }
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes
        .chunks_exact(2)
        .map(|chunk| from_bytes([chunk[0], chunk[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Decode file bytes; binary or invalid text yields `None`
fn decode(bytes: &[u8], encoding: FileEncoding) -> Option<String> {
    match encoding {
        FileEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
        FileEncoding::Utf8Bom => String::from_utf8(bytes[3..].to_vec()).ok(),
        FileEncoding::Utf16Le => decode_utf16(&bytes[2..], u16::from_le_bytes),
        FileEncoding::Utf16Be => decode_utf16(&bytes[2..], u16::from_be_bytes),
    }
}

/// Read a markup file, enforcing the size limit and text encoding
pub fn read_markup_sync(path: impl AsRef<Path>) -> FileResult<MarkupSource> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FileError::NotFound(path_buf.clone()),
        std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied {
            path: path_buf.clone(),
        },
        _ => FileError::ReadError {
            path: path_buf.clone(),
            source: e,
        },
    })?;

    if !metadata.is_file() {
        return Err(FileError::NotAFile { path: path_buf });
    }

    let size_bytes = metadata.len();
    if size_bytes > MAX_FILE_SIZE {
        return Err(FileError::FileTooLarge {
            path: path_buf,
            size: size_bytes,
            max_size: MAX_FILE_SIZE,
        });
    }

    let bytes = std::fs::read(path).map_err(|e| FileError::ReadError {
        path: path_buf.clone(),
        source: e,
    })?;

    let encoding = detect_encoding(&bytes);
    let text = decode(&bytes, encoding).ok_or(FileError::EncodingError { path: path_buf })?;

    log::debug!(
        "Read {} ({} bytes, {:?})",
        path.display(),
        size_bytes,
        encoding
    );

    Ok(MarkupSource {
        text,
        encoding,
        size_bytes,
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "artifact".to_string());

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    parent.join(format!(".{}.{}.tmp", filename, timestamp))
}

/// Create the parent directory of `path` if it is missing
pub fn ensure_parent_dir_sync(path: impl AsRef<Path>) -> FileResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| FileError::DirectoryError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Write bytes to a file atomically: the target is either fully replaced or
/// left unchanged
pub fn write_bytes_atomic_sync(path: impl AsRef<Path>, bytes: &[u8]) -> FileResult<()> {
    let path = path.as_ref();
    let temp_path = temp_path_for(path);

    let write_result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.flush()?;
        file.sync_all()?;
        Ok::<(), std::io::Error>(())
    })();

    if let Err(e) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::AtomicWriteError {
            path: path.to_path_buf(),
            source: e,
        });
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::RenameError {
            path: path.to_path_buf(),
            source: e,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Title\n").unwrap();

        let source = read_markup_sync(&path).unwrap();
        assert_eq!(source.text, "# Title\n");
        assert_eq!(source.encoding, FileEncoding::Utf8);
        assert_eq!(source.size_bytes, 8);
    }

    #[test]
    fn test_read_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.md");
        std::fs::write(&path, b"\xEF\xBB\xBFhello").unwrap();

        let source = read_markup_sync(&path).unwrap();
        assert_eq!(source.text, "hello");
        assert_eq!(source.encoding, FileEncoding::Utf8Bom);
    }

    #[test]
    fn test_read_utf16le() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.md");
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        std::fs::write(&path, bytes).unwrap();

        assert_eq!(read_markup_sync(&path).unwrap().text, "hi");
    }

    #[test]
    fn test_read_binary_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.md");
        std::fs::write(&path, [0x89, 0x50, 0x4E, 0x47, 0xFF, 0x00]).unwrap();

        assert!(matches!(
            read_markup_sync(&path),
            Err(FileError::EncodingError { .. })
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_markup_sync(dir.path().join("missing.md"));
        assert!(matches!(result, Err(FileError::NotFound(_))));
    }

    #[test]
    fn test_read_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_markup_sync(dir.path()),
            Err(FileError::NotAFile { .. })
        ));
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        std::fs::write(&path, "old").unwrap();

        write_bytes_atomic_sync(&path, b"new").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_atomic_write_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.html");
        assert!(matches!(
            write_bytes_atomic_sync(&path, b"x"),
            Err(FileError::AtomicWriteError { .. })
        ));
    }
}
