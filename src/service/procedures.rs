//! Two-stage procedure analysis pipeline
//!
//! Composes the extraction and evaluation stages: extract candidates from a
//! narrative, then score each candidate. When extraction yields nothing the
//! evaluator is never invoked.

use crate::model::EvaluatedProcedure;
use crate::service::evaluation::ProcedureEvaluator;
use crate::service::extraction::ProcedureExtractor;
use crate::service::llm::CompletionError;

/// Service running the extract-then-evaluate pipeline over one narrative
pub struct ProcedureAnalysisService {
    extractor: ProcedureExtractor,
    evaluator: ProcedureEvaluator,
}

impl ProcedureAnalysisService {
    pub fn new(extractor: ProcedureExtractor, evaluator: ProcedureEvaluator) -> Self {
        Self {
            extractor,
            evaluator,
        }
    }

    /// Run the full pipeline over a narrative
    ///
    /// The output is never longer than the extracted candidate list;
    /// evaluation failures drop candidates, they never duplicate or
    /// fabricate records.
    pub async fn analyze(
        &self,
        narrative: &str,
    ) -> Result<Vec<EvaluatedProcedure>, CompletionError> {
        let candidates = self.extractor.extract(narrative).await?;

        if candidates.is_empty() {
            tracing::info!("No procedure candidates extracted, skipping evaluation");
            return Ok(Vec::new());
        }

        self.evaluator.evaluate_all(&candidates).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::llm::CompletionBackend;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedBackend {
        response: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    fn service_with(
        extraction_response: &str,
        evaluation_response: &str,
    ) -> (ProcedureAnalysisService, Arc<AtomicUsize>) {
        let evaluation_calls = Arc::new(AtomicUsize::new(0));

        let extractor = ProcedureExtractor::new(Arc::new(CannedBackend {
            response: extraction_response.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }));
        let evaluator = ProcedureEvaluator::new(Arc::new(CannedBackend {
            response: evaluation_response.to_string(),
            calls: Arc::clone(&evaluation_calls),
        }));

        (
            ProcedureAnalysisService::new(extractor, evaluator),
            evaluation_calls,
        )
    }

    #[tokio::test]
    async fn test_single_candidate_flows_through() {
        let (service, _) = service_with(
            r#"{"procedures": [{"techniques": "T1059.001", "description": "Attacker used PowerShell to download a payload"}]}"#,
            r#"{"technique": "T1059.001", "description": "Attacker used PowerShell to download a payload", "quality_score": "8", "analysis": "Specific and detectable."}"#,
        );

        let evaluations = service
            .analyze("Attacker used PowerShell to download a payload")
            .await
            .unwrap();

        assert_eq!(evaluations.len(), 1);
        assert_eq!(evaluations[0].technique, "T1059.001");
        assert_eq!(evaluations[0].quality_score, "8");
    }

    #[tokio::test]
    async fn test_empty_extraction_short_circuits_evaluator() {
        let (service, evaluation_calls) = service_with(r#"{"procedures": []}"#, "unused");

        let evaluations = service.analyze("Benign changelog text").await.unwrap();

        assert!(evaluations.is_empty());
        assert_eq!(evaluation_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_extraction_short_circuits_evaluator() {
        let (service, evaluation_calls) = service_with("no json here", "unused");

        let evaluations = service.analyze("Some narrative").await.unwrap();

        assert!(evaluations.is_empty());
        assert_eq!(evaluation_calls.load(Ordering::SeqCst), 0);
    }
}
