//! Disk persistence for chunk collections
//!
//! One JSON file per collection under `{root}/collections/`. Writes go to a
//! unique temp file and are renamed into place, so a reader never sees a
//! half-written collection.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::Chunk;

/// Prefix shared by every collection name
pub const COLLECTION_PREFIX: &str = "doc_";

const COLLECTION_EXT: &str = "json";

/// A stored chunk together with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// All chunks of one document, immutable once published
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// `doc_{doc_id}`
    pub name: String,
    pub doc_id: String,
    /// Embedding dimensions at the time of storing
    pub dimensions: usize,
    /// Entries in chunk index order
    pub entries: Vec<StoredChunk>,
}

impl Collection {
    /// Collection name for a document
    pub fn name_for(doc_id: &str) -> String {
        format!("{}{}", COLLECTION_PREFIX, doc_id)
    }
}

/// Path of a collection file
pub fn collection_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, COLLECTION_EXT))
}

/// Save a collection with an atomic temp-file + rename
pub fn save_collection(collection: &Collection, dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let bytes = serde_json::to_vec(collection).map_err(io::Error::other)?;
    let path = collection_path(dir, &collection.name);
    // Unique per writer so concurrent stores of the same document never share a temp file
    let tmp_path = dir.join(format!(
        "{}.{}.{}.tmp",
        collection.name,
        COLLECTION_EXT,
        uuid::Uuid::new_v4().simple()
    ));

    fs::write(&tmp_path, &bytes)?;
    if let Err(e) = fs::rename(&tmp_path, &path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    tracing::debug!(
        "Saved collection '{}' ({} chunks, {} bytes)",
        collection.name,
        collection.entries.len(),
        bytes.len()
    );
    Ok(())
}

/// Load one collection file
pub fn load_collection(path: &Path) -> io::Result<Collection> {
    let raw = fs::read(path)?;
    let collection: Collection = serde_json::from_slice(&raw)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    let expected = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if collection.name != expected || collection.name != Collection::name_for(&collection.doc_id) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("collection name '{}' does not match file {:?}", collection.name, path),
        ));
    }

    if let Some(bad) = collection
        .entries
        .iter()
        .find(|e| e.embedding.len() != collection.dimensions)
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "chunk '{}' has {} dimensions, collection '{}' declares {}",
                bad.chunk.id,
                bad.embedding.len(),
                collection.name,
                collection.dimensions
            ),
        ));
    }

    Ok(collection)
}

/// Remove a collection file; `Ok(false)` if there was none
pub fn remove_collection(dir: &Path, name: &str) -> io::Result<bool> {
    match fs::remove_file(collection_path(dir, name)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Load every collection file in `dir`, skipping unreadable ones
pub fn load_all_collections(dir: &Path) -> io::Result<Vec<Collection>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut collections = Vec::new();
    for entry in fs::read_dir(dir)? {
        let file_path = entry?.path();
        let is_collection = file_path.extension().and_then(|s| s.to_str()) == Some(COLLECTION_EXT)
            && file_path
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.starts_with(COLLECTION_PREFIX));

        if is_collection {
            match load_collection(&file_path) {
                Ok(collection) => collections.push(collection),
                Err(e) => {
                    tracing::warn!("Failed to load {:?}: {}", file_path, e);
                }
            }
        }
    }

    tracing::info!("Loaded {} collections from {:?}", collections.len(), dir);
    Ok(collections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;
    use tempfile::TempDir;

    fn sample(doc_id: &str) -> Collection {
        Collection {
            name: Collection::name_for(doc_id),
            doc_id: doc_id.to_string(),
            dimensions: 2,
            entries: vec![StoredChunk {
                chunk: Chunk::new(doc_id, 0, "Hello.".into(), ChunkMetadata { start_char: 0, end_char: 6 }),
                embedding: vec![0.6, 0.8],
            }],
        }
    }

    #[test]
    fn test_save_then_load_all() {
        let dir = TempDir::new().unwrap();
        save_collection(&sample("aa"), dir.path()).unwrap();
        save_collection(&sample("bb"), dir.path()).unwrap();

        let mut loaded = load_all_collections(dir.path()).unwrap();
        loaded.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "doc_aa");
        assert_eq!(loaded[1].entries[0].chunk.id, "bb_chunk_0");

        // No temp files left behind
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_corrupt_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        save_collection(&sample("aa"), dir.path()).unwrap();
        fs::write(dir.path().join("doc_broken.json"), b"{ not json").unwrap();

        let loaded = load_all_collections(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].doc_id, "aa");
    }

    #[test]
    fn test_short_embedding_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut collection = sample("aa");
        collection.entries[0].embedding = vec![0.6];
        save_collection(&collection, dir.path()).unwrap();
        save_collection(&sample("bb"), dir.path()).unwrap();

        let err = load_collection(&collection_path(dir.path(), "doc_aa")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let loaded = load_all_collections(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].doc_id, "bb");
    }

    #[test]
    fn test_remove_collection() {
        let dir = TempDir::new().unwrap();
        save_collection(&sample("aa"), dir.path()).unwrap();
        assert!(remove_collection(dir.path(), "doc_aa").unwrap());
        assert!(!remove_collection(dir.path(), "doc_aa").unwrap());
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_all_collections(&dir.path().join("nope")).unwrap().is_empty());
    }
}
