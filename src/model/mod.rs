pub mod config;
pub mod procedures;

pub use config::{Config, ConfigError, CorpusConfig};
pub use procedures::{EvaluatedProcedure, ExtractedProcedures, ProcedureCandidate};
