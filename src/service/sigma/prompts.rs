//! Prompts for Sigma rule synthesis

/// System prompt for the synthesis model call
///
/// The instructions, examples and question all travel in the user prompt;
/// this preamble only frames the task.
pub const SIGMA_SYSTEM_PROMPT: &str = "You are an assistant for detection engineering tasks. Use the provided instructions, example rules, and question to produce the requested Sigma rule.";

/// Rule-authoring directives plus the quality criteria the rule must meet
pub const SIGMA_RULE_INSTRUCTIONS: &str = r#"<INSTRUCTIONS>
You are a cybersecurity expert creating precise and technically accurate Sigma rules, focusing on specific threat behaviors while avoiding false positives from generic activities. You will be shown a set of good Sigma rules as examples, but you have access to your entire cyber security knowledge to answer the question. You will then be asked to create a Sigma rule based on a provided set of logs or a description of an attack. Always format your output as a Sigma rule. Before starting, always make sure the provided details are specific enough to create a good Sigma rule, otherwise, say there is not enough information. Use the additional {EVALUATION CRITERIA} to ensure the Sigma rules meet quality standards.

As you make the Sigma rule, always abide by the following instructions:
1) Make sure the rule contains event IDs when available.
2) Account for variants in the names of tools (esp. when searching the filesystem).
3) Account for potentially deceptive threat actor behavior.
4) Ensure rule is useful for real-world threat hunting.
5) Use placeholders such as <unique-id>, <author-name>, <references> and <current-date> in their respective fields
6) Assume I have only access to Windows Event logs and Windows Security logs.
</INSTRUCTIONS>

<EVALUATION CRITERIA>
1) Does the rule address a specific, known threat or vulnerability?
2) Can the rule be applied across different environments without modification?
3) Have you minimized the potential for false positives and negatives?
4) Is the rule compatible with the log sources it targets?
5) Will this rule significantly contribute to an organization's security posture? Aim for clarity, precision, and applicability to ensure the rule adds value to security monitoring efforts.
</EVALUATION CRITERIA>"#;

/// Assemble the synthesis prompt: instruction block, retrieved example
/// rules joined with blank lines, then the verbatim question.
pub fn build_sigma_prompt(question: &str, retrieved_docs: &[String]) -> String {
    let examples = retrieved_docs.join("\n\n");

    format!(
        "<Instructions>\n{SIGMA_RULE_INSTRUCTIONS}\n</Instructions>\n\n<Examples>\n{examples}\n</Examples>\n\n<Question>\n{question}\n</Question>"
    )
}
