//! Google Gemini API client for patent summarization
//!
//! Builds a fixed patent-analyst prompt from extracted text (truncated to a
//! character budget), calls the generateContent endpoint with safety
//! thresholds, and maps the response into either a summary or one of the
//! failure variants in [`crate::error::AppError`]. No call is retried.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::settings;

/// Model used for summarization
const GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Extracted text below this is not worth sending
pub const MIN_TEXT_CHARS: usize = 100;

/// Prompt budget; longer texts are cut to exactly this many characters
pub const MAX_TEXT_CHARS: usize = 100_000;

/// Result of a successful summarization call
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub text: String,
    /// True when the input exceeded [`MAX_TEXT_CHARS`] and only the first
    /// part was summarized
    pub truncated: bool,
}

// ==================== Gemini wire format ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SafetyRating {
    category: String,
    probability: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}

/// All four harm categories block at medium severity and above
fn safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .iter()
    .map(|category| SafetySetting {
        category: category.to_string(),
        threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
    })
    .collect()
}

// ==================== Input preparation ====================

#[derive(Debug)]
struct PreparedInput<'a> {
    text: &'a str,
    truncated: bool,
}

/// Enforce the minimum length and the character cap.
///
/// Short input short-circuits with `InputTooShort` before any outbound
/// call. Over-cap input is cut to exactly [`MAX_TEXT_CHARS`] characters
/// (a char boundary, never mid-codepoint).
fn prepare_input(text: &str) -> Result<PreparedInput<'_>, AppError> {
    let char_count = text.chars().count();
    if char_count < MIN_TEXT_CHARS {
        return Err(AppError::InputTooShort {
            got: char_count,
            min: MIN_TEXT_CHARS,
        });
    }

    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((byte_idx, _)) => Ok(PreparedInput {
            text: &text[..byte_idx],
            truncated: true,
        }),
        None => Ok(PreparedInput {
            text,
            truncated: false,
        }),
    }
}

/// Fixed prompt template: four sections, text interpolated verbatim
fn build_prompt(text: &str) -> String {
    format!(
        r#"Please act as a patent analyst and provide a concise summary of the following patent document text. Focus on these key aspects:

1. **Problem Solved:** Briefly describe the technical problem or need the invention aims to address, as stated in the background or summary sections.
2. **Core Invention/Solution:** Explain the main technical concept, mechanism, or process disclosed. What is the essence of the invention described? Focus on the primary innovation outlined in the summary/detailed description.
3. **Key Features/Advantages:** Highlight 1-3 key distinguishing features, components, steps, or advantages mentioned in the description that characterize the invention.
4. **Field of Invention:** Briefly state the technical field this invention belongs to, if readily apparent.

Keep the summary factual, objective, and focused on the technical disclosure. Avoid interpreting claim scope or providing legal opinions. Use clear language suitable for someone understanding the technology. Aim for 2-4 paragraphs.

Patent Text:
---
{}
---
Patent Summary:
"#,
        text
    )
}

// ==================== Response interpretation ====================

fn format_ratings(ratings: &[SafetyRating]) -> String {
    if ratings.is_empty() {
        return "N/A".to_string();
    }
    ratings
        .iter()
        .map(|r| format!("{}: {}", r.category, r.probability))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pull the summary text out of a response, or explain why it was withheld
fn interpret_response(response: GeminiResponse) -> Result<String, AppError> {
    let candidate = response.candidates.into_iter().next();

    // A candidate may carry its text split across several parts
    if let Some(text) = candidate
        .as_ref()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect::<String>())
        .filter(|t| !t.trim().is_empty())
    {
        return Ok(text);
    }

    // No text came back: report the block reason and any ratings available
    let reason = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
        .or_else(|| candidate.as_ref().and_then(|c| c.finish_reason.clone()))
        .unwrap_or_else(|| "Unknown".to_string());

    let ratings = response
        .prompt_feedback
        .as_ref()
        .filter(|f| !f.safety_ratings.is_empty())
        .map(|f| format_ratings(&f.safety_ratings))
        .or_else(|| candidate.map(|c| format_ratings(&c.safety_ratings)))
        .unwrap_or_else(|| "N/A".to_string());

    Err(AppError::ContentBlocked { reason, ratings })
}

/// Map a non-success HTTP response onto the failure taxonomy
fn map_api_error(status: u16, body: &str) -> AppError {
    let lower = body.to_lowercase();
    if status == 429 || lower.contains("quota") || lower.contains("resource_exhausted") {
        return AppError::QuotaExceeded(format!("API error {}: {}", status, body));
    }
    if status == 401
        || status == 403
        || lower.contains("api key not valid")
        || lower.contains("api_key_invalid")
    {
        return AppError::Configuration(format!(
            "the configured API key was rejected (status {})",
            status
        ));
    }
    AppError::Transient(format!("API error {}: {}", status, body))
}

// ==================== Summarization call ====================

/// Generate a patent summary for the given extracted text.
///
/// Preconditions checked here (configured key, minimum length) short-circuit
/// without issuing a request.
pub async fn summarize_patent(text: &str) -> Result<SummaryOutcome, AppError> {
    let api_key = settings::get_api_key()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::Configuration("GEMINI_API_KEY not set".to_string()))?;

    let prepared = prepare_input(text)?;
    if prepared.truncated {
        println!(
            "[Summarize] Input over budget, summarizing the first {} characters",
            MAX_TEXT_CHARS
        );
    }

    let request = GeminiRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: build_prompt(prepared.text),
            }],
        }],
        safety_settings: safety_settings(),
    };

    let url = format!(
        "{}/models/{}:generateContent",
        GEMINI_API_BASE, GEMINI_MODEL
    );

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .map_err(|e| AppError::Transient(format!("Failed to create HTTP client: {}", e)))?;

    let response = client
        .post(&url)
        .query(&[("key", api_key.as_str())])
        .header("content-type", "application/json")
        .json(&request)
        .send()
        .await
        .map_err(|e| AppError::Transient(format!("HTTP request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(map_api_error(status, &body));
    }

    let api_response: GeminiResponse = response
        .json()
        .await
        .map_err(|e| AppError::Transient(format!("Failed to parse response: {}", e)))?;

    // Track token usage
    if let Some(usage) = &api_response.usage_metadata {
        let _ = settings::add_gemini_tokens(
            usage.prompt_token_count.unwrap_or(0),
            usage.candidates_token_count.unwrap_or(0),
        );
    }

    let truncated = prepared.truncated;
    interpret_response(api_response).map(|text| SummaryOutcome { text, truncated })
}
