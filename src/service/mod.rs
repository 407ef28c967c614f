pub mod evaluation;
pub mod extraction;
pub mod llm;
pub mod procedures;
pub mod sigma;

pub use evaluation::ProcedureEvaluator;
pub use extraction::ProcedureExtractor;
pub use llm::{AnthropicCompletion, CompletionBackend, OpenAiCompletion};
pub use procedures::ProcedureAnalysisService;
pub use sigma::RuleSynthesisService;
