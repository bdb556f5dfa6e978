// Anchor text suggestions: prompt building, the completion call, and
// best-effort parsing of the model's output.
// All LLM calls go through llm_client — no direct completion API calls here.

pub mod generator;
pub mod handlers;
pub mod models;
pub mod prompts;
