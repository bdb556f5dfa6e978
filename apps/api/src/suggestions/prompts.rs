// All LLM prompt constants for the Suggestions module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for anchor text generation.
pub const ANCHOR_SYSTEM: &str = "You are a very helpful SEO and backlinks assistant.";

/// Anchor text prompt template.
/// Replace: {keywords}, {target_url}, {topic}, {json_only_instruction}
pub const ANCHOR_PROMPT_TEMPLATE: &str = r#"Given the following refined keywords from the website {target_url}:
{keywords}

and considering the business niche: {topic},
generate a structured JSON object with SEO-optimized anchor text suggestions.
The JSON object should have the following structure:
{
  "primary": {
    "category": "Exact Match",
    "text": "Primary anchor text suggestion using an exact match",
    "searchVolume": "Estimated search volume",
    "difficulty": "Estimated keyword difficulty",
    "bestFor": "Where this anchor works best"
  },
  "alternatives": [
    {
      "category": "Partial Match",
      "text": "Anchor text suggestion variation",
      "searchVolume": "Estimated search volume",
      "difficulty": "Estimated keyword difficulty"
    },
    {
      "category": "Branded",
      "text": "Anchor text suggestion including a brand name",
      "searchVolume": "Estimated search volume",
      "difficulty": "Estimated keyword difficulty"
    },
    {
      "category": "Natural",
      "text": "Anchor text suggestion with semantic variation",
      "searchVolume": "Estimated search volume",
      "difficulty": "Estimated keyword difficulty"
    },
    {
      "category": "Generic",
      "text": "Generic anchor text suggestion",
      "searchVolume": "Estimated search volume",
      "difficulty": "Estimated keyword difficulty"
    }
  ]
}
Ensure that the suggestions are realistic and diverse to help improve SEO rankings.
{json_only_instruction}"#;

/// Rendered in place of the keyword list when refinement found nothing.
pub const NO_KEYWORDS_LINE: &str =
    "- (no keywords met the volume and difficulty criteria; infer suitable ones from the website and niche)";
