//! Textual normalization of synthesized rule output
//!
//! Models tend to wrap the rule body in Markdown code fences; the stored
//! rule must be the bare YAML body.

/// Strip Markdown code-fence markers and the `yaml` language tag
///
/// Tolerates input without any markers (returned unchanged) and is
/// idempotent. Inner content is preserved, including occurrences of the
/// word "yaml" inside the rule itself.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```yaml\n", "")
        .replace("```yaml", "")
        .replace("```\n", "")
        .replace("```", "")
}
