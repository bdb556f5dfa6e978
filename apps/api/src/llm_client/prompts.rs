// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Common instruction appended to prompts that expect a JSON reply.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Respond with the JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Value substituted when the caller gave no topic.
pub const DEFAULT_TOPIC: &str = "general";
