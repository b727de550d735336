//! # Source Reader Module
//!
//! Risolve un riferimento opaco ad un'immagine nei suoi byte grezzi.
//!
//! ## Riferimenti supportati:
//! - `SourceRef::Path`: file locale
//! - `SourceRef::Memory`: buffer già in memoria
//! - `SourceRef::Uri`: content URI; il reader di default gestisce solo `file://`
//!
//! La dimensione originale viene presa dai metadata quando disponibile,
//! altrimenti misurata dopo la lettura. Nessun I/O di rete.

use crate::error::OptimizeError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opaque handle to readable image bytes
#[derive(Debug, Clone)]
pub enum SourceRef {
    Path(PathBuf),
    Memory(Arc<[u8]>),
    Uri(String),
}

impl SourceRef {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        SourceRef::Path(path.into())
    }

    pub fn memory(bytes: impl Into<Arc<[u8]>>) -> Self {
        SourceRef::Memory(bytes.into())
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Path(path) => write!(f, "{}", path.display()),
            SourceRef::Memory(bytes) => write!(f, "<memory:{} bytes>", bytes.len()),
            SourceRef::Uri(uri) => f.write_str(uri),
        }
    }
}

impl From<&Path> for SourceRef {
    fn from(path: &Path) -> Self {
        SourceRef::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for SourceRef {
    fn from(path: PathBuf) -> Self {
        SourceRef::Path(path)
    }
}

impl From<Vec<u8>> for SourceRef {
    fn from(bytes: Vec<u8>) -> Self {
        SourceRef::Memory(bytes.into())
    }
}

/// Raw bytes plus an optional pre-known size
#[derive(Debug, Clone)]
pub struct SourceBytes {
    pub bytes: Vec<u8>,
    pub known_size: Option<u64>,
}

impl SourceBytes {
    pub fn new(bytes: Vec<u8>, known_size: Option<u64>) -> Self {
        Self { bytes, known_size }
    }

    /// Original size in bytes: the known size if any, otherwise measured
    pub fn original_size(&self) -> u64 {
        self.known_size.unwrap_or(self.bytes.len() as u64)
    }
}

/// Resolves source references to bytes
pub trait SourceReader: Send + Sync {
    fn read(&self, source: &SourceRef) -> Result<SourceBytes, OptimizeError>;

    /// Size without reading the content, when cheaply available
    fn size_hint(&self, source: &SourceRef) -> Result<Option<u64>, OptimizeError>;
}

/// Reader for local files, `file://` URIs and in-memory buffers
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSourceReader;

impl LocalSourceReader {
    fn resolve_path(source: &SourceRef) -> Result<Option<PathBuf>, OptimizeError> {
        match source {
            SourceRef::Path(path) => Ok(Some(path.clone())),
            SourceRef::Memory(_) => Ok(None),
            SourceRef::Uri(uri) => match uri.strip_prefix("file://") {
                Some(path) => Ok(Some(PathBuf::from(path))),
                None => Err(OptimizeError::UnsupportedSource(uri.clone())),
            },
        }
    }
}

impl SourceReader for LocalSourceReader {
    fn read(&self, source: &SourceRef) -> Result<SourceBytes, OptimizeError> {
        if let SourceRef::Memory(bytes) = source {
            return Ok(SourceBytes::new(bytes.to_vec(), Some(bytes.len() as u64)));
        }

        match Self::resolve_path(source)? {
            Some(path) => {
                let known_size = std::fs::metadata(&path).ok().map(|m| m.len());
                let bytes = std::fs::read(&path)?;
                Ok(SourceBytes::new(bytes, known_size))
            }
            None => Err(OptimizeError::UnsupportedSource(source.to_string())),
        }
    }

    fn size_hint(&self, source: &SourceRef) -> Result<Option<u64>, OptimizeError> {
        if let SourceRef::Memory(bytes) = source {
            return Ok(Some(bytes.len() as u64));
        }

        match Self::resolve_path(source)? {
            Some(path) => Ok(Some(std::fs::metadata(path)?.len())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_memory() {
        let reader = LocalSourceReader;
        let source = SourceRef::memory(vec![1u8, 2, 3]);

        let read = reader.read(&source).unwrap();
        assert_eq!(read.bytes, vec![1, 2, 3]);
        assert_eq!(read.original_size(), 3);
        assert_eq!(reader.size_hint(&source).unwrap(), Some(3));
        assert_eq!(source.to_string(), "<memory:3 bytes>");
    }

    #[test]
    fn test_read_path_and_file_uri() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        std::fs::write(&path, vec![7u8; 2048]).unwrap();

        let reader = LocalSourceReader;
        let read = reader.read(&SourceRef::path(&path)).unwrap();
        assert_eq!(read.known_size, Some(2048));
        assert_eq!(read.bytes.len(), 2048);

        let uri = SourceRef::Uri(format!("file://{}", path.display()));
        assert_eq!(reader.size_hint(&uri).unwrap(), Some(2048));
        assert_eq!(reader.read(&uri).unwrap().original_size(), 2048);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let reader = LocalSourceReader;
        let err = reader.read(&SourceRef::path("/nonexistent/photo.jpg")).unwrap_err();
        assert!(matches!(err, OptimizeError::Io(_)));
    }

    #[test]
    fn test_remote_uri_unsupported() {
        let reader = LocalSourceReader;
        let source = SourceRef::Uri("https://example.com/a.jpg".to_string());
        assert!(matches!(
            reader.read(&source),
            Err(OptimizeError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn test_original_size_falls_back_to_length() {
        let bytes = SourceBytes::new(vec![0u8; 10], None);
        assert_eq!(bytes.original_size(), 10);
        let bytes = SourceBytes::new(vec![0u8; 10], Some(99));
        assert_eq!(bytes.original_size(), 99);
    }
}
