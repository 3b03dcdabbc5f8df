//! Application state for the document Q&A server

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::Assistant;
use crate::ingestion::{FileParser, IngestPipeline, TextChunker};
use crate::providers::{self, EmbeddingProvider, LlmProvider};
use crate::retrieval::ChunkStore;
use crate::session::SessionStore;
use crate::types::DocumentRecord;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Extract / chunk / store pipeline
    pipeline: Arc<IngestPipeline>,
    /// Ask / summarize / challenge / evaluate
    assistant: Assistant,
    /// Document registry (persisted to disk)
    documents: DashMap<String, DocumentRecord>,
    /// Path to documents registry file
    documents_path: PathBuf,
    /// Serializes registry writes
    save_lock: Mutex<()>,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create new application state with the configured providers
    pub async fn new(config: RagConfig) -> Result<Self> {
        let embedder = providers::build_embedder(&config)?;
        let llm = providers::build_llm(&config)?;
        Self::with_providers(config, embedder, llm).await
    }

    /// Create application state around explicit providers
    pub async fn with_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        tracing::info!("Initializing application state at {:?}...", config.storage.root);

        let store = Arc::new(ChunkStore::open(&config.storage.root, embedder, config.storage.distance).await?);

        let pipeline = Arc::new(IngestPipeline::new(
            Arc::new(FileParser::new()),
            TextChunker::new(config.chunking.chunk_size),
            Arc::clone(&store),
        ));

        let assistant = Assistant::new(&config, Arc::clone(&pipeline), llm, Arc::new(SessionStore::new()));

        // Load persisted documents registry, keeping only documents whose chunks survived
        let documents_path = config.storage.root.join("documents.json");
        let documents = Self::load_documents(&documents_path);
        documents.retain(|doc_id, _| {
            let present = store.contains(doc_id);
            if !present {
                tracing::warn!("Dropping registry entry {}: no stored collection", doc_id);
            }
            present
        });
        tracing::info!("Loaded {} documents from registry", documents.len());

        // A collection without a registry entry is left over from an interrupted upload
        for doc_id in store.doc_ids() {
            if !documents.contains_key(&doc_id) {
                tracing::warn!("Removing collection {}: not in registry", doc_id);
                store.delete(&doc_id).await?;
            }
        }

        let state = Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline,
                assistant,
                documents,
                documents_path,
                save_lock: Mutex::new(()),
                ready: RwLock::new(false),
            }),
        };

        state.set_ready(true);
        Ok(state)
    }

    /// Load documents from disk
    fn load_documents(path: &Path) -> DashMap<String, DocumentRecord> {
        let documents = DashMap::new();

        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<Vec<DocumentRecord>>(&content) {
                    Ok(docs) => {
                        for doc in docs {
                            documents.insert(doc.doc_id.clone(), doc);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse documents.json: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read documents.json: {}", e);
                }
            }
        }

        documents
    }

    /// Save documents to disk (temp file + rename)
    fn save_documents(&self) {
        let _guard = self.inner.save_lock.lock();
        let docs = self.documents();

        let content = match serde_json::to_string_pretty(&docs) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Failed to serialize documents: {}", e);
                return;
            }
        };

        let tmp_path = self.inner.documents_path.with_extension("json.tmp");
        let written = fs::write(&tmp_path, content)
            .and_then(|_| fs::rename(&tmp_path, &self.inner.documents_path));
        if let Err(e) = written {
            tracing::error!("Failed to save documents.json: {}", e);
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get ingestion pipeline
    pub fn pipeline(&self) -> &Arc<IngestPipeline> {
        &self.inner.pipeline
    }

    /// Get chunk store
    pub fn store(&self) -> &Arc<ChunkStore> {
        self.inner.pipeline.store()
    }

    /// Get assistant
    pub fn assistant(&self) -> &Assistant {
        &self.inner.assistant
    }

    /// All registered documents, newest first
    pub fn documents(&self) -> Vec<DocumentRecord> {
        let mut docs: Vec<DocumentRecord> = self
            .inner
            .documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        docs.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then_with(|| a.doc_id.cmp(&b.doc_id)));
        docs
    }

    /// Look up a document
    pub fn get_document(&self, doc_id: &str) -> Option<DocumentRecord> {
        self.inner.documents.get(doc_id).map(|d| d.value().clone())
    }

    /// Register (or re-register) a document
    pub fn add_document(&self, doc: DocumentRecord) {
        self.inner.documents.insert(doc.doc_id.clone(), doc);
        self.save_documents();
    }

    /// Attach a generated summary to a registered document
    pub fn set_summary(&self, doc_id: &str, summary: &str) {
        let updated = match self.inner.documents.get_mut(doc_id) {
            Some(mut doc) => {
                doc.summary = Some(summary.to_string());
                true
            }
            None => false,
        };
        if updated {
            self.save_documents();
        }
    }

    /// Remove a document from the registry
    pub fn remove_document(&self, doc_id: &str) -> Option<DocumentRecord> {
        let removed = self.inner.documents.remove(doc_id).map(|(_, doc)| doc);
        if removed.is_some() {
            self.save_documents();
        }
        removed
    }

    /// Check if ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
