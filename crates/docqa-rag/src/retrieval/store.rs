//! Per-document chunk collections with exact nearest-neighbour search

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::ingestion::identity::is_doc_id;
use crate::providers::EmbeddingProvider;
use crate::types::{Chunk, RetrievedChunk};

use super::distance::DistanceMetric;
use super::persistence::{self, Collection, StoredChunk};

/// Subdirectory of the storage root holding collection files
const COLLECTIONS_DIR: &str = "collections";

/// Chunk store keyed by document ID
///
/// Collections are immutable once published. `store` builds a complete collection,
/// persists it, then swaps it into the map in one insert; readers clone the `Arc`
/// and scan without holding any map lock, so they observe the old collection, no
/// collection, or the complete new one.
pub struct ChunkStore {
    dir: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    metric: DistanceMetric,
    collections: DashMap<String, Arc<Collection>>,
}

impl ChunkStore {
    /// Open the store under `root`, loading every persisted collection
    pub async fn open(
        root: impl AsRef<Path>,
        embedder: Arc<dyn EmbeddingProvider>,
        metric: DistanceMetric,
    ) -> Result<Self> {
        let dir = root.as_ref().join(COLLECTIONS_DIR);

        let load_dir = dir.clone();
        let loaded = tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&load_dir)?;
            persistence::load_all_collections(&load_dir)
        })
        .await
        .map_err(|e| Error::internal(format!("Collection loader panicked: {}", e)))??;

        let collections = DashMap::new();
        for collection in loaded {
            if collection.dimensions != embedder.dimensions() {
                tracing::warn!(
                    "Collection '{}' has {} dimensions, embedder has {}; it will be replaced on re-upload",
                    collection.name,
                    collection.dimensions,
                    embedder.dimensions()
                );
            }
            collections.insert(collection.doc_id.clone(), Arc::new(collection));
        }

        tracing::info!(
            "Chunk store ready at {:?} ({} collections, {:?} distance)",
            dir,
            collections.len(),
            metric
        );

        Ok(Self {
            dir,
            embedder,
            metric,
            collections,
        })
    }

    /// Distance metric in use
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Embedding provider shared with the store
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Replace the collection for `doc_id` with `chunks`
    ///
    /// On any failure the previous collection (if any) is removed as well, so a
    /// failed store never leaves stale or mixed data addressable.
    pub async fn store(&self, chunks: &[Chunk], doc_id: &str) -> Result<()> {
        if !is_doc_id(doc_id) {
            return Err(Error::BadRequest(format!("Invalid document ID: {}", doc_id)));
        }

        match self.build_and_persist(chunks, doc_id).await {
            Ok(collection) => {
                tracing::info!(
                    "Stored collection '{}' ({} chunks)",
                    collection.name,
                    collection.entries.len()
                );
                self.collections.insert(doc_id.to_string(), Arc::new(collection));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Store failed for {}: {}", doc_id, e);
                if let Err(cleanup) = self.delete(doc_id).await {
                    tracing::error!("Failed to remove stale collection for {}: {}", doc_id, cleanup);
                }
                Err(match e {
                    Error::RetrievalUnavailable(msg) => Error::RetrievalUnavailable(msg),
                    other => Error::retrieval(other.to_string()),
                })
            }
        }
    }

    async fn build_and_persist(&self, chunks: &[Chunk], doc_id: &str) -> Result<Collection> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            self.embedder.embed_batch(&texts).await?
        };

        if embeddings.len() != chunks.len() {
            return Err(Error::retrieval(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let collection = Collection {
            name: Collection::name_for(doc_id),
            doc_id: doc_id.to_string(),
            dimensions: self.embedder.dimensions(),
            entries: chunks
                .iter()
                .cloned()
                .zip(embeddings)
                .map(|(chunk, embedding)| StoredChunk { chunk, embedding })
                .collect(),
        };

        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || {
            persistence::save_collection(&collection, &dir).map(|_| collection)
        })
        .await
        .map_err(|e| Error::internal(format!("Collection writer panicked: {}", e)))?
        .map_err(Error::from)
    }

    /// Nearest chunks of one document, surfacing backend failures
    ///
    /// A missing collection is an empty result, not an error.
    pub async fn try_retrieve(&self, query: &str, doc_id: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let Some(collection) = self.collection(doc_id) else {
            return Ok(Vec::new());
        };
        if collection.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| Error::retrieval(format!("Failed to embed query: {}", e)))?;

        if query_embedding.len() != collection.dimensions {
            return Err(Error::retrieval(format!(
                "Query has {} dimensions, collection '{}' has {}",
                query_embedding.len(),
                collection.name,
                collection.dimensions
            )));
        }

        Ok(self.rank(&collection, &query_embedding, top_k))
    }

    fn rank(&self, collection: &Collection, query: &[f32], top_k: usize) -> Vec<RetrievedChunk> {
        let mut scored: Vec<(f32, &StoredChunk)> = collection
            .entries
            .iter()
            .map(|entry| (self.metric.distance(query, &entry.embedding), entry))
            .collect();

        scored.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| a.1.chunk.chunk_index.cmp(&b.1.chunk.chunk_index))
        });
        scored.truncate(top_k.max(1));

        scored
            .into_iter()
            .map(|(distance, entry)| RetrievedChunk {
                text: entry.chunk.text.clone(),
                id: entry.chunk.id.clone(),
                distance,
                metadata: entry.chunk.metadata,
            })
            .collect()
    }

    /// Nearest chunks of one document; failures degrade to an empty result
    pub async fn retrieve(&self, query: &str, doc_id: &str, top_k: usize) -> Vec<RetrievedChunk> {
        match self.try_retrieve(query, doc_id, top_k).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Retrieval for {} degraded to empty: {}", doc_id, e);
                Vec::new()
            }
        }
    }

    /// Per-document retrieval concatenated in `doc_ids` order
    ///
    /// Each document contributes its own top-k; results are not re-ranked globally.
    pub async fn retrieve_multi(&self, query: &str, doc_ids: &[String], top_k: usize) -> Vec<RetrievedChunk> {
        let mut results = Vec::new();
        for doc_id in doc_ids {
            results.extend(self.retrieve(query, doc_id, top_k).await);
        }
        results
    }

    /// Remove the collection for `doc_id` from memory and disk
    pub async fn delete(&self, doc_id: &str) -> Result<bool> {
        let in_memory = self.collections.remove(doc_id).is_some();
        if !is_doc_id(doc_id) {
            return Ok(in_memory);
        }

        let dir = self.dir.clone();
        let name = Collection::name_for(doc_id);
        let on_disk = tokio::task::spawn_blocking(move || persistence::remove_collection(&dir, &name))
            .await
            .map_err(|e| Error::internal(format!("Collection remover panicked: {}", e)))??;

        if in_memory || on_disk {
            tracing::info!("Deleted collection for {}", doc_id);
        }
        Ok(in_memory || on_disk)
    }

    /// Names of all collections (`doc_{doc_id}`), sorted
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.value().name.clone()).collect();
        names.sort();
        names
    }

    /// Document IDs with a collection, sorted
    pub fn doc_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Whether a collection exists for `doc_id`
    pub fn contains(&self, doc_id: &str) -> bool {
        self.collections.contains_key(doc_id)
    }

    /// Stored chunks of a document in index order; empty if unknown
    pub fn get_chunks(&self, doc_id: &str) -> Vec<Chunk> {
        self.collection(doc_id)
            .map(|c| c.entries.iter().map(|e| e.chunk.clone()).collect())
            .unwrap_or_default()
    }

    fn collection(&self, doc_id: &str) -> Option<Arc<Collection>> {
        self.collections.get(doc_id).map(|entry| Arc::clone(entry.value()))
    }
}
