// Shared prompt fragments.
// Feature prompts live next to the feature (see analysis/prompts.rs).

/// Output rule appended to every prompt that expects a bare JSON object back.
/// Neither vendor used here takes a separate system prompt, so it travels inline.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with the JSON object only. \
    Do NOT wrap it in a code block (```). \
    Do NOT add explanations, greetings, or any sentence before or after the JSON.";
