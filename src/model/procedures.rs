//! Pipeline data model: procedure candidates and their evaluations

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Wire shape of the extraction model's response.
///
/// The model is asked for a single JSON object with a `procedures` key.
/// An absent key deserializes to an empty list, which the pipeline treats
/// as "no procedures found".
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedProcedures {
    #[serde(default)]
    pub procedures: Vec<ProcedureCandidate>,
}

/// One attack procedure produced by the extraction stage.
///
/// `techniques` holds free-text technique labels; a single label may name
/// several taxonomy IDs (e.g. "Masquerading: Match Legitimate Name or
/// Location (T1036.005)"). The model sometimes emits the field as one
/// string rather than a list, so deserialization accepts both.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcedureCandidate {
    #[serde(deserialize_with = "string_or_seq")]
    pub techniques: Vec<String>,
    pub description: String,
}

/// A scored procedure produced by the evaluation stage.
///
/// `quality_score` is the average of the five quality checks on a 1-10
/// scale. It is carried as an opaque numeric-looking string and never
/// interpreted; the model may answer with a JSON number or a quoted
/// string, both normalize to `String` here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EvaluatedProcedure {
    #[serde(deserialize_with = "string_or_seq_joined")]
    pub technique: String,
    pub description: String,
    #[serde(deserialize_with = "numeric_string")]
    pub quality_score: String,
    pub analysis: String,
}

/// Accept either a JSON string or a list of strings; a bare string becomes
/// a one-element list.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

/// Accept either a JSON string or a list of strings; a list is joined with
/// ", " into a single label.
fn string_or_seq_joined<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    string_or_seq(deserializer).map(|labels| labels.join(", "))
}

/// Accept either a JSON string or a JSON number, normalized to `String`.
fn numeric_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_procedures_key_is_empty() {
        let extracted: ExtractedProcedures = serde_json::from_str("{}").unwrap();
        assert!(extracted.procedures.is_empty());
    }

    #[test]
    fn test_techniques_as_single_string() {
        let candidate: ProcedureCandidate = serde_json::from_str(
            r#"{"techniques": "Command and Scripting Interpreter: PowerShell (T1059.001)", "description": "Downloaded a payload"}"#,
        )
        .unwrap();

        assert_eq!(candidate.techniques.len(), 1);
        assert!(candidate.techniques[0].contains("T1059.001"));
    }

    #[test]
    fn test_techniques_as_list() {
        let candidate: ProcedureCandidate = serde_json::from_str(
            r#"{"techniques": ["T1583.001", "T1036.005"], "description": "Staged payloads"}"#,
        )
        .unwrap();

        assert_eq!(candidate.techniques, vec!["T1583.001", "T1036.005"]);
    }

    #[test]
    fn test_quality_score_as_number() {
        let evaluated: EvaluatedProcedure = serde_json::from_str(
            r#"{"technique": "T1059.001", "description": "d", "quality_score": 7.8, "analysis": "a"}"#,
        )
        .unwrap();

        assert_eq!(evaluated.quality_score, "7.8");
    }

    #[test]
    fn test_quality_score_as_string() {
        let evaluated: EvaluatedProcedure = serde_json::from_str(
            r#"{"technique": "T1059.001", "description": "d", "quality_score": "8", "analysis": "a"}"#,
        )
        .unwrap();

        assert_eq!(evaluated.quality_score, "8");
    }
}
