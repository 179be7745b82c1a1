// Prompt for job-posting field extraction.
// Reuses the cross-cutting JSON-only rule from llm_client::prompts.

use crate::analysis::schema::JobField;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Extraction prompt template.
/// Replace: {schema_json}, {json_only}, then {jd_text} last so posting text is never rewritten.
pub const JD_EXTRACT_PROMPT_TEMPLATE: &str = r#"Analyze the following job posting and organize it as JSON.

Job posting:
{jd_text}

Reply using exactly this JSON object. Keep every key as written, fill each value with
text taken from the posting, and leave a value as "" when the posting does not mention it.

{schema_json}

{json_only}"#;

/// Builds the extraction prompt for one job posting.
///
/// The caller has already rejected blank input; the text is embedded verbatim.
pub fn build_prompt(jd_text: &str) -> String {
    JD_EXTRACT_PROMPT_TEMPLATE
        .replace("{schema_json}", &schema_template())
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{jd_text}", jd_text)
}

/// The nine keys with empty values, one per line, in display order.
fn schema_template() -> String {
    let lines: Vec<String> = JobField::ALL
        .iter()
        .map(|field| format!("  \"{}\": \"\"", field.key()))
        .collect();
    format!("{{\n{}\n}}", lines.join(",\n"))
}
