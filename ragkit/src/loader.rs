//! Loading source documents from disk.
//!
//! The loader walks a data directory for plain-text and markdown files and
//! turns each into a [`Document`] tagged with its source file. Splitting
//! into embeddable pieces is delegated to the configured splitter.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{info, warn};

use crate::chunking::{RecursiveSplitter, TextSplitter};
use crate::document::{ChunkMetadata, Document};

/// Loads `.txt` and `.md` files from a directory tree into documents.
pub struct DataLoader {
    splitter: RecursiveSplitter,
}

impl DataLoader {
    /// Create a data loader with the given splitting configuration.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { splitter: RecursiveSplitter::new(chunk_size, chunk_overlap) }
    }

    /// Load every supported file under `data_directory`, recursively.
    ///
    /// Unreadable files are skipped with a warning; a missing directory
    /// yields an empty list.
    pub fn load_documents(&self, data_directory: &Path) -> Vec<Document> {
        if !data_directory.exists() {
            warn!(directory = %data_directory.display(), "data directory not found");
            return Vec::new();
        }

        let mut files = Vec::new();
        collect_files(data_directory, &mut files);
        files.sort();

        let mut documents = Vec::new();
        for file in files {
            let file_type = match file.extension().and_then(|e| e.to_str()) {
                Some("txt") => "text",
                Some("md") => "markdown",
                _ => continue,
            };

            match fs::read_to_string(&file) {
                Ok(text) => {
                    let source_file = file
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let mut metadata = ChunkMetadata {
                        source_file: Some(source_file),
                        ..Default::default()
                    };
                    metadata.extra.insert("file_type".to_string(), json!(file_type));
                    documents.push(Document::new(text, metadata));
                }
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "failed to read file, skipping");
                }
            }
        }

        info!(document_count = documents.len(), "documents loaded");
        documents
    }

    /// Split loaded documents into embeddable pieces.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let pieces = self.splitter.split_documents(documents);
        info!(document_count = documents.len(), chunk_count = pieces.len(), "documents split");
        pieces
    }
}

/// Recursively collect regular files under `dir`.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        warn!(directory = %dir.display(), "failed to read directory");
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out);
        } else {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn loads_text_and_markdown_skipping_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write!(File::create(dir.path().join("a.txt")).unwrap(), "plain text content").unwrap();
        write!(File::create(dir.path().join("b.md")).unwrap(), "# markdown content").unwrap();
        write!(File::create(dir.path().join("c.bin")).unwrap(), "binary-ish").unwrap();

        let loader = DataLoader::new(1000, 200);
        let documents = loader.load_documents(dir.path());

        assert_eq!(documents.len(), 2);
        let sources: Vec<_> =
            documents.iter().map(|d| d.metadata.source_file.as_deref().unwrap()).collect();
        assert!(sources.contains(&"a.txt"));
        assert!(sources.contains(&"b.md"));
    }

    #[test]
    fn recurses_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        write!(File::create(dir.path().join("nested/deep.txt")).unwrap(), "nested file").unwrap();

        let loader = DataLoader::new(1000, 200);
        let documents = loader.load_documents(dir.path());

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].text, "nested file");
    }

    #[test]
    fn missing_directory_yields_no_documents() {
        let loader = DataLoader::new(1000, 200);
        let documents = loader.load_documents(Path::new("/nonexistent/ragkit-test-dir"));
        assert!(documents.is_empty());
    }

    #[test]
    fn split_documents_tags_chunk_indices() {
        let dir = tempfile::tempdir().unwrap();
        let long_text = "paragraph one is right here\n\n".repeat(10);
        write!(File::create(dir.path().join("long.txt")).unwrap(), "{long_text}").unwrap();

        let loader = DataLoader::new(60, 0);
        let documents = loader.load_documents(dir.path());
        let pieces = loader.split_documents(&documents);

        assert!(pieces.len() > 1);
        assert_eq!(pieces[0].metadata.extra["chunk_index"], 0);
    }
}
