//! Procedure evaluation stage
//!
//! Scores each extracted candidate independently with one model call per
//! candidate. A candidate whose evaluation response does not parse is
//! dropped with a warning; the remaining candidates are still processed.

use std::sync::Arc;

use crate::model::{EvaluatedProcedure, ProcedureCandidate};
use crate::service::llm::{CompletionBackend, CompletionError, ParsedResponse, parse_json_response};

pub mod prompts;

use prompts::EVALUATION_SYSTEM_PROMPT;

/// Scores procedure candidates for detection-engineering quality
pub struct ProcedureEvaluator {
    backend: Arc<dyn CompletionBackend>,
}

impl ProcedureEvaluator {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Evaluate all candidates, tolerating per-candidate parse failures
    ///
    /// Candidates are processed in order and survivors keep their relative
    /// order; the output is never longer than the input. An empty input
    /// returns immediately without any model call. Transport failures of
    /// the model call itself propagate as `Err` and fail the request.
    pub async fn evaluate_all(
        &self,
        candidates: &[ProcedureCandidate],
    ) -> Result<Vec<EvaluatedProcedure>, CompletionError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut evaluations = Vec::with_capacity(candidates.len());

        for (i, candidate) in candidates.iter().enumerate() {
            let payload = match serde_json::to_string(candidate) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(
                        candidate = i + 1,
                        error = %e,
                        "Failed to serialize candidate for evaluation, skipping"
                    );
                    continue;
                }
            };

            tracing::debug!(
                candidate = i + 1,
                total = candidates.len(),
                "Initiating model call for procedure evaluation"
            );

            let start_time = std::time::Instant::now();

            let raw = self
                .backend
                .complete(EVALUATION_SYSTEM_PROMPT, &payload)
                .await?;

            let elapsed = start_time.elapsed();

            match parse_json_response::<EvaluatedProcedure>(&raw) {
                ParsedResponse::Valid(evaluated) => {
                    tracing::info!(
                        candidate = i + 1,
                        total = candidates.len(),
                        elapsed_ms = elapsed.as_millis(),
                        quality_score = %evaluated.quality_score,
                        "Procedure evaluation completed"
                    );
                    evaluations.push(evaluated);
                }
                ParsedResponse::Malformed(reason) => {
                    tracing::warn!(
                        candidate = i + 1,
                        total = candidates.len(),
                        elapsed_ms = elapsed.as_millis(),
                        reason = %reason,
                        "Evaluation response was not valid JSON, skipping candidate"
                    );
                }
            }
        }

        tracing::info!(
            candidates = candidates.len(),
            evaluated = evaluations.len(),
            "Procedure evaluation pass complete"
        );

        Ok(evaluations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays one queued response per call, in order.
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<String, CompletionError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CompletionError::RequestFailed("exhausted".to_string())))
        }
    }

    fn candidate(technique: &str) -> ProcedureCandidate {
        ProcedureCandidate {
            techniques: vec![technique.to_string()],
            description: format!("procedure using {technique}"),
        }
    }

    fn scored_response(technique: &str, score: &str) -> Result<String, CompletionError> {
        Ok(format!(
            r#"{{"technique": "{technique}", "description": "d", "quality_score": "{score}", "analysis": "a"}}"#
        ))
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_model_calls() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let evaluator = ProcedureEvaluator::new(backend.clone());

        let evaluations = evaluator.evaluate_all(&[]).await.unwrap();

        assert!(evaluations.is_empty());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_responses_drop_only_affected_candidates() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            scored_response("T1059.001", "8"),
            Ok("the model rambled instead of answering".to_string()),
            scored_response("T1036.005", "6"),
        ]));
        let evaluator = ProcedureEvaluator::new(backend.clone());

        let candidates = [
            candidate("T1059.001"),
            candidate("T1583.001"),
            candidate("T1036.005"),
        ];
        let evaluations = evaluator.evaluate_all(&candidates).await.unwrap();

        // 3 candidates, 1 malformed response: exactly 2 survivors, order kept
        assert_eq!(evaluations.len(), 2);
        assert_eq!(evaluations[0].technique, "T1059.001");
        assert_eq!(evaluations[1].technique, "T1036.005");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_all_responses_malformed_yields_empty() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("{broken".to_string()),
            Ok("also broken".to_string()),
        ]));
        let evaluator = ProcedureEvaluator::new(backend);

        let candidates = [candidate("T1059.001"), candidate("T1036.005")];
        let evaluations = evaluator.evaluate_all(&candidates).await.unwrap();

        assert!(evaluations.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_fails_the_pass() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            scored_response("T1059.001", "8"),
            Err(CompletionError::RequestFailed("timeout".to_string())),
        ]));
        let evaluator = ProcedureEvaluator::new(backend);

        let candidates = [candidate("T1059.001"), candidate("T1036.005")];

        assert!(evaluator.evaluate_all(&candidates).await.is_err());
    }
}
