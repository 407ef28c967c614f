//! Example-rule corpus loading and vector retrieval
//!
//! The corpus directory is read once at startup, embedded, and served from
//! an in-memory vector index for the lifetime of the process.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use rig::Embed;
use rig::client::EmbeddingsClient;
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::openai;
use rig::vector_store::VectorStoreIndex;
use rig::vector_store::in_memory_store::{InMemoryVectorIndex, InMemoryVectorStore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Error type for corpus loading and index construction
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CorpusError {
    #[error("Failed to read rule directory {path}: {source}")]
    ReadDir {
        path: String,
        source: std::io::Error,
    },

    #[error("Rule directory {0} contains no usable documents")]
    Empty(String),

    #[error("Failed to build rule embeddings: {0}")]
    Embedding(String),
}

/// Error type for vector retrieval at request time
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RetrievalError {
    #[error("Vector search failed: {0}")]
    Search(String),
}

/// One example rule from the corpus
#[derive(Embed, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDocument {
    /// Content hash, stable across restarts for an unchanged file
    pub id: String,
    #[embed]
    pub content: String,
}

/// Trait for retrieving example rules relevant to a query
#[async_trait]
pub trait RuleRetriever: Send + Sync {
    /// Return the contents of the `k` most relevant example rules
    async fn top_rules(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError>;
}

/// Load every regular file in the directory as a rule document
///
/// Unreadable and empty files are skipped with a warning. An empty corpus
/// is an error: the synthesizer is useless without examples.
pub fn load_rules_from_dir(dir: &Path) -> Result<Vec<RuleDocument>, CorpusError> {
    let entries = fs::read_dir(dir).map_err(|source| CorpusError::ReadDir {
        path: dir.display().to_string(),
        source,
    })?;

    let mut documents = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Failed to read directory entry, skipping");
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read rule file, skipping");
                continue;
            }
        };

        if content.trim().is_empty() {
            tracing::warn!(path = %path.display(), "Rule file is empty, skipping");
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        documents.push(RuleDocument {
            id: compute_hash(&file_name, &content),
            content,
        });
    }

    if documents.is_empty() {
        return Err(CorpusError::Empty(dir.display().to_string()));
    }

    tracing::info!(
        dir = %dir.display(),
        documents = documents.len(),
        "Loaded rule corpus"
    );

    Ok(documents)
}

/// Compute SHA256 hash of file name + content
fn compute_hash(name: &str, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// In-memory vector index over the rule corpus
pub struct RuleIndex {
    index: InMemoryVectorIndex<openai::EmbeddingModel, RuleDocument>,
}

impl RuleIndex {
    /// Embed the corpus and build the index
    ///
    /// Runs once at startup; the resulting index is read-only.
    pub async fn build(
        client: &openai::Client,
        embedding_model: &str,
        documents: Vec<RuleDocument>,
    ) -> Result<Self, CorpusError> {
        let model = client.embedding_model(embedding_model);
        let document_count = documents.len();

        let embeddings = EmbeddingsBuilder::new(model.clone())
            .documents(documents)
            .map_err(|e| CorpusError::Embedding(e.to_string()))?
            .build()
            .await
            .map_err(|e| CorpusError::Embedding(e.to_string()))?;

        let store = InMemoryVectorStore::from_documents_with_id_f(embeddings, |doc| doc.id.clone());

        tracing::info!(
            model = %embedding_model,
            documents = document_count,
            "Rule corpus embedded and indexed"
        );

        Ok(Self {
            index: store.index(model),
        })
    }
}

#[async_trait]
impl RuleRetriever for RuleIndex {
    async fn top_rules(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        let results = self
            .index
            .top_n::<RuleDocument>(query, k)
            .await
            .map_err(|e| RetrievalError::Search(e.to_string()))?;

        tracing::debug!(
            requested = k,
            retrieved = results.len(),
            "Retrieved example rules for query"
        );

        Ok(results
            .into_iter()
            .map(|(_score, _id, doc)| doc.content)
            .collect())
    }
}
