//! Prompt for attack procedure extraction

/// System prompt for the extraction model call
///
/// Asks for exactly one JSON object with a `procedures` key; an empty object
/// means no procedures were detected.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"Extract one or two of the most significant attack behaviors detected in the text. Always include as much technical detail from the text that would be helpful for threat hunting and would help with detection rule generation. Output your response as a JSON object only, with the keys "techniques", "description". Make sure to include as much detail as possible for each procedure to assist with Sigma rule generation. Use only the information provided in your response. Write the procedure in active voice.

<RESPONSE TEMPLATE>
{
    "procedures": [
        {
            "techniques": string (e.g., "Acquire Infrastructure: Domains (T1583.001), Masquerading: Match Legitimate Name or Location (T1036.005)"),
            "description": string (e.g., "The threat actor ITG05 staged payloads for their operations on the freely available hosting provider firstcloudit[.]com. The payloads included the malware MASEPIE, OCEANMAP, and STEELHOOK, which are designed to exfiltrate files, execute arbitrary commands, and steal browser data from the victim's machine.")
        },
        {
            "techniques": string,
            "description": string
        }
    ]
}
</RESPONSE TEMPLATE>

If no procedures are detected return an empty JSON object."#;
