//! Procedure extraction stage
//!
//! Turns a raw threat narrative into zero or more structured procedure
//! candidates with a single model call. Malformed model output is not an
//! error here: it degrades to an empty candidate list and the caller
//! continues.

use std::sync::Arc;

use crate::model::{ExtractedProcedures, ProcedureCandidate};
use crate::service::llm::{CompletionBackend, CompletionError, ParsedResponse, parse_json_response};

pub mod prompts;

use prompts::EXTRACTION_SYSTEM_PROMPT;

/// Extracts structured procedure candidates from narrative text
pub struct ProcedureExtractor {
    backend: Arc<dyn CompletionBackend>,
}

impl ProcedureExtractor {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Extract procedure candidates from a narrative
    ///
    /// Returns `Err` only for transport failures of the model call itself.
    /// A response that is not valid JSON, or that carries no `procedures`
    /// key, yields `Ok` with an empty list.
    pub async fn extract(
        &self,
        narrative: &str,
    ) -> Result<Vec<ProcedureCandidate>, CompletionError> {
        tracing::debug!(
            narrative_length = narrative.len(),
            "Initiating model call for procedure extraction"
        );

        let start_time = std::time::Instant::now();

        let raw = self
            .backend
            .complete(EXTRACTION_SYSTEM_PROMPT, narrative)
            .await?;

        let elapsed = start_time.elapsed();

        match parse_json_response::<ExtractedProcedures>(&raw) {
            ParsedResponse::Valid(extracted) => {
                if extracted.procedures.is_empty() {
                    tracing::info!(
                        elapsed_ms = elapsed.as_millis(),
                        "No procedures detected in narrative"
                    );
                } else {
                    tracing::info!(
                        elapsed_ms = elapsed.as_millis(),
                        candidate_count = extracted.procedures.len(),
                        "Procedure extraction completed"
                    );
                }
                Ok(extracted.procedures)
            }
            ParsedResponse::Malformed(reason) => {
                tracing::warn!(
                    elapsed_ms = elapsed.as_millis(),
                    reason = %reason,
                    response_length = raw.len(),
                    "Extraction response was not valid JSON, treating as no procedures"
                );
                Ok(Vec::new())
            }
        }
    }
}
