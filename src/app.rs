//! Application state and service initialization
//!
//! This module centralizes all service initialization and dependency injection,
//! making it easier to manage the application lifecycle and test services.

use std::path::Path;
use std::sync::Arc;

use rig::providers::openai;

use crate::api::health::CorpusStatus;
use crate::model::Config;
use crate::retriever::{PageRetriever, WebPageRetriever};
use crate::service::sigma::{CorpusError, RuleIndex, load_rules_from_dir};
use crate::service::{
    AnthropicCompletion, CompletionBackend, OpenAiCompletion, ProcedureAnalysisService,
    ProcedureEvaluator, ProcedureExtractor, RuleSynthesisService,
};

const ENV_EXTRACTION_MODEL: &str = "EXTRACTION_MODEL";
const ENV_EVALUATION_MODEL: &str = "EVALUATION_MODEL";
const ENV_SIGMA_MODEL: &str = "SIGMA_MODEL";
const ENV_EMBEDDING_MODEL: &str = "EMBEDDING_MODEL";

/// Default model for extraction and evaluation
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-opus-20240229";
/// Default model for rule synthesis
const DEFAULT_SIGMA_MODEL: &str = "gpt-4-1106-preview";
/// Default model for corpus embeddings
const DEFAULT_EMBEDDING_MODEL: &str = openai::TEXT_EMBEDDING_3_SMALL;

/// Completion budget for extraction and evaluation calls
const MAX_COMPLETION_TOKENS: u64 = 2000;

/// Application state containing all services and shared resources
pub struct AppState {
    /// Extract-then-evaluate procedure pipeline
    pub procedure_service: Arc<ProcedureAnalysisService>,
    /// RAG rule synthesis service
    pub sigma_service: Arc<RuleSynthesisService>,
    /// Web narrative fetcher for URL inputs
    pub page_retriever: Arc<dyn PageRetriever>,
    /// Corpus facts for the readiness probe
    pub corpus: CorpusStatus,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. Model client initialization (Anthropic + OpenAI, both required)
    /// 2. Rule corpus loading and embedding index construction
    /// 3. Service dependency graph construction
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let extraction_model = std::env::var(ENV_EXTRACTION_MODEL)
            .unwrap_or_else(|_| DEFAULT_ANTHROPIC_MODEL.to_string());
        let evaluation_model = std::env::var(ENV_EVALUATION_MODEL)
            .unwrap_or_else(|_| DEFAULT_ANTHROPIC_MODEL.to_string());
        let sigma_model =
            std::env::var(ENV_SIGMA_MODEL).unwrap_or_else(|_| DEFAULT_SIGMA_MODEL.to_string());
        let embedding_model = std::env::var(ENV_EMBEDDING_MODEL)
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());

        tracing::info!(
            extraction_model = %extraction_model,
            evaluation_model = %evaluation_model,
            sigma_model = %sigma_model,
            embedding_model = %embedding_model,
            "Initializing model clients"
        );

        let extraction_backend: Arc<dyn CompletionBackend> = Arc::new(AnthropicCompletion::new(
            &config.anthropic_api_key,
            &extraction_model,
            MAX_COMPLETION_TOKENS,
        )?);
        let evaluation_backend: Arc<dyn CompletionBackend> = Arc::new(AnthropicCompletion::new(
            &config.anthropic_api_key,
            &evaluation_model,
            MAX_COMPLETION_TOKENS,
        )?);
        let sigma_backend = OpenAiCompletion::new(&config.openai_api_key, &sigma_model)?;

        // Load and embed the rule corpus before binding the server; a process
        // without a usable index must not start.
        let documents = load_rules_from_dir(Path::new(&config.corpus.rules_dir))?;
        let corpus = CorpusStatus {
            documents: documents.len(),
        };
        let rule_index =
            RuleIndex::build(sigma_backend.openai_client(), &embedding_model, documents).await?;

        let procedure_service = Arc::new(ProcedureAnalysisService::new(
            ProcedureExtractor::new(extraction_backend),
            ProcedureEvaluator::new(evaluation_backend),
        ));

        let sigma_service = Arc::new(RuleSynthesisService::new(
            Arc::new(sigma_backend),
            Arc::new(rule_index),
            config.corpus.top_k,
        ));

        let page_retriever: Arc<dyn PageRetriever> = Arc::new(WebPageRetriever::new());

        Ok(Self {
            procedure_service,
            sigma_service,
            page_retriever,
            corpus,
        })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Model client initialization failed
    #[error("Model client initialization failed: {0}")]
    ModelInit(#[from] crate::service::llm::CompletionError),

    /// Rule corpus loading or embedding failed
    #[error("Rule corpus initialization failed: {0}")]
    CorpusInit(#[from] CorpusError),
}
