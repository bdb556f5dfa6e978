//! Anchor text generation — prompt the completion model with the refined
//! keywords and read back whatever it produced.
//!
//! Unparseable output is not an error: the raw text is handed to the caller.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{DEFAULT_TOPIC, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{strip_json_fences, LlmClient};
use crate::seo_client::KeywordRecord;
use crate::suggestions::models::{AnchorOutcome, AnchorTexts};
use crate::suggestions::prompts::{ANCHOR_PROMPT_TEMPLATE, ANCHOR_SYSTEM, NO_KEYWORDS_LINE};

/// Generates anchor text suggestions for `target_url`.
///
/// Fails only when the completion call itself fails or its response has no
/// content.
pub async fn generate_anchor_texts(
    llm: &LlmClient,
    keywords: &[KeywordRecord],
    target_url: &str,
    topic: Option<&str>,
) -> Result<AnchorOutcome, AppError> {
    let prompt = build_anchor_prompt(keywords, target_url, topic);

    let text = llm.call_text(&prompt, ANCHOR_SYSTEM).await?;
    let outcome = parse_anchor_texts(&text);

    match &outcome {
        Ok(parsed) => info!(
            suggestions = parsed.suggestion_count(),
            "Anchor texts parsed"
        ),
        Err(_) => warn!("Failed to parse completion output as anchor texts, returning raw text"),
    }

    Ok(outcome)
}

/// Fills the anchor prompt template. A blank topic becomes "general".
pub fn build_anchor_prompt(
    keywords: &[KeywordRecord],
    target_url: &str,
    topic: Option<&str>,
) -> String {
    let topic = topic
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TOPIC);

    let keyword_lines = if keywords.is_empty() {
        NO_KEYWORDS_LINE.to_string()
    } else {
        keywords
            .iter()
            .map(keyword_line)
            .collect::<Vec<_>>()
            .join("\n")
    };

    ANCHOR_PROMPT_TEMPLATE
        .replace("{keywords}", &keyword_lines)
        .replace("{target_url}", target_url)
        .replace("{topic}", topic)
        .replace("{json_only_instruction}", JSON_ONLY_INSTRUCTION)
}

fn keyword_line(record: &KeywordRecord) -> String {
    match (record.volume, record.difficulty) {
        (Some(volume), Some(difficulty)) => format!(
            "- {} (monthly volume: {}, difficulty: {})",
            record.keyword, volume, difficulty
        ),
        (Some(volume), None) => format!("- {} (monthly volume: {})", record.keyword, volume),
        (None, Some(difficulty)) => format!("- {} (difficulty: {})", record.keyword, difficulty),
        (None, None) => format!("- {}", record.keyword),
    }
}

/// Parses completion output, tolerating a Markdown code fence around it.
///
/// `Err` carries the trimmed text exactly as the model returned it.
pub fn parse_anchor_texts(text: &str) -> AnchorOutcome {
    let trimmed = text.trim();
    serde_json::from_str::<AnchorTexts>(strip_json_fences(trimmed))
        .map_err(|_| trimmed.to_string())
}
