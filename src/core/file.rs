use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::{ContentHash, generate_key};

/// One diagram source snapshot.
///
/// Edits never mutate a `DiagramFile`; [`DiagramFile::with_content`] builds a
/// fresh snapshot so that cache keys stay content-addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramFile {
    path: PathBuf,
    /// Lowercased extension without the leading dot (empty if none).
    extension: String,
    content: Arc<str>,
    hash: ContentHash,
}

impl DiagramFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Arc<str>>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let content = content.into();
        let hash = ContentHash::of(content.as_bytes());
        Self {
            path,
            extension,
            content,
            hash,
        }
    }

    /// Read a diagram source from disk.
    pub fn read(path: &Path) -> io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(path, content))
    }

    /// New snapshot of the same document with different content.
    pub fn with_content(&self, content: impl Into<Arc<str>>) -> Self {
        let content = content.into();
        Self {
            path: self.path.clone(),
            extension: self.extension.clone(),
            hash: ContentHash::of(content.as_bytes()),
            content,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn shared_content(&self) -> Arc<str> {
        Arc::clone(&self.content)
    }

    /// Hash of the content alone (path not included).
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    /// Cache key for this snapshot, see [`generate_key`].
    pub fn cache_key(&self) -> String {
        generate_key(&self.path.to_string_lossy(), &self.content)
    }

    /// Short display name (file name, or the full path as fallback).
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_is_lowercased() {
        let file = DiagramFile::new("/docs/Flow.MMD", "graph TD;A-->B");
        assert_eq!(file.extension(), "mmd");

        let file = DiagramFile::new("/docs/README", "");
        assert_eq!(file.extension(), "");
    }

    #[test]
    fn test_with_content_replaces_snapshot() {
        let first = DiagramFile::new("a.mmd", "graph TD;A-->B");
        let second = first.with_content("graph TD;A-->C");

        assert_eq!(first.content(), "graph TD;A-->B");
        assert_eq!(second.path(), first.path());
        assert_ne!(first.hash(), second.hash());
        assert_ne!(first.cache_key(), second.cache_key());
    }

    #[test]
    fn test_read_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seq.puml");
        std::fs::write(&path, "@startuml\nA -> B\n@enduml\n").unwrap();

        let file = DiagramFile::read(&path).unwrap();
        assert_eq!(file.extension(), "puml");
        assert!(file.content().contains("A -> B"));
        assert_eq!(file.display_name(), "seq.puml");
    }
}
