//! Axum route handler for the anchor text endpoint.

use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::suggestions::generator::generate_anchor_texts;
use crate::suggestions::models::AnchorTextsField;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMetrics {
    pub keyword_count: usize,
    pub refined_keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub anchor_texts: AnchorTextsField,
    pub metrics: GenerateMetrics,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate
///
/// Refines keywords for the target URL, then asks the LLM for anchor texts.
/// `anchorTexts` is an object when the model produced usable JSON, else its raw text.
/// The body is read as JSON whatever `Content-Type` the caller sent.
pub async fn handle_generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = Json::<GenerateRequest>::from_bytes(&body).map_err(|rejection| {
        warn!("Rejected generate request body: {}", rejection.body_text());
        AppError::Validation("Invalid request body".to_string())
    })?;

    let target_url = request
        .target_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::Validation("Target URL is required".to_string()))?;
    let topic = request.topic.as_deref();

    let as_of = Utc::now().date_naive();
    info!(target_url, ?topic, %as_of, "Generating anchor texts");

    let refined = state.refiner.refine(target_url, topic, as_of).await?;
    let refined_keywords = refined.keyword_texts();
    info!(
        origin = ?refined.origin,
        candidates = refined.candidates_considered,
        keywords = refined_keywords.len(),
        "Final refined keywords: {:?}",
        refined_keywords
    );

    let outcome = generate_anchor_texts(&state.llm, &refined.keywords, target_url, topic).await?;

    Ok(Json(GenerateResponse {
        anchor_texts: outcome.into(),
        metrics: GenerateMetrics {
            keyword_count: refined_keywords.len(),
            refined_keywords,
        },
    }))
}
