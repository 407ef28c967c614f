//! Prompt for procedure quality evaluation

/// System prompt for the evaluation model call
///
/// The five quality checks are scored 1-10 each; the model reports their
/// average as `quality_score` plus a short `analysis` rationale.
pub const EVALUATION_SYSTEM_PROMPT: &str = r#"For the provided attack procedure, conduct the following quality checks. Your output should be entirely in JSON. Evaluate and score the procedure based on the criteria provided, using a scale of 1 to 10:
1. Does the procedure include enough context for a detection engineer to write an effective Sigma rule?
2. Does the procedure address how the threat actor used a specific technique so that it can be emulated in a lab environment?
3. Does the procedure include context-specific details that differentiate it from benign activities, minimizing false positives?
4. Is the log data needed to detect the described procedure readily accessible and commonly collected in typical security environments?
5. If the procedure mentions named malware, does it also describe in detail how the malware performs the technique?

Calculate the average score across all these quality checks. Your response will only include a JSON object with the keys "quality_score" and "analysis". The analysis should be less than 4 sentences. Use the following template for your response:

<RESPONSE TEMPLATE>
{
    "technique": {TECHNIQUE},
    "description": {PROCEDURE},
    "quality_score": {AVERAGE SCORE (in double quotes)},
    "analysis": {EXPLANATION}
}
</RESPONSE TEMPLATE>"#;
