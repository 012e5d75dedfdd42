//! Text loading from shell-provided sources.
//!
//! The core never reads files itself. Shells implement [`TextSource`] for
//! their I/O mechanism (file dialog, upload widget, fetch API, filesystem)
//! and [`load_text`] decodes whatever bytes come back into a [`TextBuffer`].

use std::future::Future;

use thiserror::Error;

use crate::TextBuffer;

/// Error type for loading operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The source has nothing under this path
    #[error("no text found at {0}")]
    NotFound(String),
    /// The source failed while reading
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Trait for async text providers.
///
/// No `Send` bounds: works in both native and WASM (single-threaded) contexts.
pub trait TextSource {
    /// Read the raw bytes stored under `path`.
    fn read_bytes(&self, path: &str) -> impl Future<Output = LoadResult<Vec<u8>>>;
}

/// Read `path` from `source` and replace the buffer contents with it.
///
/// Invalid UTF-8 is decoded lossily. On error the buffer is left unchanged.
/// Returns the number of characters loaded.
pub async fn load_text<S: TextSource>(source: &S, path: &str, buffer: &mut TextBuffer) -> LoadResult<usize> {
    let bytes = source.read_bytes(path).await?;
    buffer.load_bytes(&bytes);
    tracing::debug!(path, bytes = bytes.len(), chars = buffer.stats().chars, "text loaded");
    Ok(buffer.stats().chars)
}

/// Native filesystem source.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsTextSource;

impl TextSource for FsTextSource {
    fn read_bytes(&self, path: &str) -> impl Future<Output = LoadResult<Vec<u8>>> {
        let result = std::fs::read(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_string()),
            _ => LoadError::Io {
                path: path.to_string(),
                message: err.to_string(),
            },
        });
        std::future::ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MemorySource {
        files: HashMap<String, Vec<u8>>,
    }

    impl TextSource for MemorySource {
        fn read_bytes(&self, path: &str) -> impl Future<Output = LoadResult<Vec<u8>>> {
            let result = self
                .files
                .get(path)
                .cloned()
                .ok_or_else(|| LoadError::NotFound(path.to_string()));
            std::future::ready(result)
        }
    }

    fn source() -> MemorySource {
        let mut files = HashMap::new();
        files.insert("lyrics.txt".to_string(), b"line one\nline two".to_vec());
        files.insert("broken.txt".to_string(), b"bad \xc3\x28 byte".to_vec());
        MemorySource { files }
    }

    #[test]
    fn test_load_text() {
        let mut buffer = TextBuffer::new();
        let chars = pollster::block_on(load_text(&source(), "lyrics.txt", &mut buffer)).unwrap();
        assert_eq!(chars, 17);
        assert_eq!(buffer.text(), "line one\nline two");
        assert_eq!(buffer.stats().lines, 2);
    }

    #[test]
    fn test_load_invalid_utf8() {
        let mut buffer = TextBuffer::new();
        pollster::block_on(load_text(&source(), "broken.txt", &mut buffer)).unwrap();
        assert_eq!(buffer.text(), "bad \u{FFFD}( byte");
    }

    #[test]
    fn test_missing_leaves_buffer() {
        let mut buffer = TextBuffer::with_text("keep");
        let result = pollster::block_on(load_text(&source(), "nope.txt", &mut buffer));
        assert_eq!(result, Err(LoadError::NotFound("nope.txt".into())));
        assert_eq!(buffer.text(), "keep");
    }

    #[test]
    fn test_fs_source_missing_file() {
        let result = pollster::block_on(FsTextSource.read_bytes("/definitely/not/here.txt"));
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }
}
