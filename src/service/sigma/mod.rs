//! Sigma rule synthesis service (RAG)
//!
//! Retrieves the most relevant example rules from the corpus index, assembles
//! a single prompt around the user's question, runs one model call, and
//! normalizes the answer into a bare rule body.

use std::sync::Arc;

use crate::service::llm::{CompletionBackend, CompletionError};

pub mod corpus;
pub mod normalize;
pub mod prompts;

pub use corpus::{CorpusError, RetrievalError, RuleDocument, RuleIndex, RuleRetriever, load_rules_from_dir};
pub use normalize::strip_code_fences;

use prompts::{SIGMA_SYSTEM_PROMPT, build_sigma_prompt};

/// Error type for rule synthesis
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SigmaError {
    #[error("Rule retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Rule synthesis failed: {0}")]
    Synthesis(String),
}

impl From<CompletionError> for SigmaError {
    fn from(err: CompletionError) -> Self {
        SigmaError::Synthesis(err.to_string())
    }
}

/// Service producing Sigma rules from attack procedure descriptions
pub struct RuleSynthesisService {
    backend: Arc<dyn CompletionBackend>,
    retriever: Arc<dyn RuleRetriever>,
    top_k: usize,
}

impl RuleSynthesisService {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        retriever: Arc<dyn RuleRetriever>,
        top_k: usize,
    ) -> Self {
        Self {
            backend,
            retriever,
            top_k,
        }
    }

    /// Create a Sigma rule for an attack procedure description
    ///
    /// Retrieval and synthesis failures both surface as a single error;
    /// there are no partial results.
    pub async fn create_rule(&self, procedure: &str) -> Result<String, SigmaError> {
        let question =
            format!("Create a Sigma rule that detects the following attack procedure: {procedure}");

        let retrieved_docs = self.retriever.top_rules(&question, self.top_k).await?;

        self.synthesize(&question, &retrieved_docs).await
    }

    /// Assemble the prompt from the question and retrieved examples, run the
    /// model call, and strip fence markers from the answer
    pub async fn synthesize(
        &self,
        question: &str,
        retrieved_docs: &[String],
    ) -> Result<String, SigmaError> {
        let prompt = build_sigma_prompt(question, retrieved_docs);

        tracing::debug!(
            examples = retrieved_docs.len(),
            prompt_length = prompt.len(),
            "Initiating model call for rule synthesis"
        );

        let start_time = std::time::Instant::now();

        let raw = self.backend.complete(SIGMA_SYSTEM_PROMPT, &prompt).await?;

        tracing::info!(
            elapsed_ms = start_time.elapsed().as_millis(),
            response_length = raw.len(),
            "Rule synthesis completed"
        );

        Ok(strip_code_fences(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the prompt it was handed and replies with a fenced rule.
    struct RecordingBackend {
        seen_prompt: Mutex<Option<String>>,
        response: String,
    }

    #[async_trait]
    impl CompletionBackend for RecordingBackend {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, CompletionError> {
            *self.seen_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(self.response.clone())
        }
    }

    struct CannedRetriever {
        rules: Vec<String>,
    }

    #[async_trait]
    impl RuleRetriever for CannedRetriever {
        async fn top_rules(&self, _query: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
            Ok(self.rules.iter().take(k).cloned().collect())
        }
    }

    struct FailingRetriever;

    #[async_trait]
    impl RuleRetriever for FailingRetriever {
        async fn top_rules(&self, _query: &str, _k: usize) -> Result<Vec<String>, RetrievalError> {
            Err(RetrievalError::Search("index unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_create_rule_assembles_prompt_and_strips_fences() {
        let backend = Arc::new(RecordingBackend {
            seen_prompt: Mutex::new(None),
            response: "```yaml\ntitle: Suspicious PowerShell Download\n```".to_string(),
        });
        let retriever = Arc::new(CannedRetriever {
            rules: vec!["title: Example One\n".to_string(), "title: Example Two\n".to_string()],
        });
        let service = RuleSynthesisService::new(backend.clone(), retriever, 5);

        let rule = service.create_rule("PowerShell downloaded a payload").await.unwrap();

        assert_eq!(rule, "title: Suspicious PowerShell Download\n");

        let prompt = backend.seen_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("title: Example One"));
        assert!(prompt.contains(
            "Create a Sigma rule that detects the following attack procedure: PowerShell downloaded a payload"
        ));
    }

    #[tokio::test]
    async fn test_retrieval_failure_surfaces_as_error() {
        let backend = Arc::new(RecordingBackend {
            seen_prompt: Mutex::new(None),
            response: String::new(),
        });
        let service = RuleSynthesisService::new(backend, Arc::new(FailingRetriever), 5);

        assert!(matches!(
            service.create_rule("anything").await,
            Err(SigmaError::Retrieval(_))
        ));
    }

    #[tokio::test]
    async fn test_model_failure_surfaces_as_error() {
        struct FailingBackend;

        #[async_trait]
        impl CompletionBackend for FailingBackend {
            async fn complete(
                &self,
                _system: &str,
                _prompt: &str,
            ) -> Result<String, CompletionError> {
                Err(CompletionError::RequestFailed("timeout".to_string()))
            }
        }

        let service = RuleSynthesisService::new(
            Arc::new(FailingBackend),
            Arc::new(CannedRetriever { rules: vec![] }),
            5,
        );

        assert!(matches!(
            service.create_rule("anything").await,
            Err(SigmaError::Synthesis(_))
        ));
    }
}
