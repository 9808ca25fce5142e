//! Validation of structured model output.
//!
//! The text model is asked for JSON matching a schema, but nothing guarantees it
//! complies. Responses are parsed into typed drafts and validated before they
//! reach the domain.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use validator::Validate;

use sleighbound_domain::CHOICES_PER_SEGMENT;

/// Schema violation in a model response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{schema} output invalid: {message}")]
pub struct SchemaError {
    pub schema: &'static str,
    pub message: String,
}

/// The story half of a segment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StoryDraft {
    #[validate(length(min = 1))]
    pub story: String,
    #[validate(length(min = 1))]
    pub image_prompt: String,
}

/// Follow-up choices for a scene.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChoiceDraft {
    #[validate(length(equal = 3))]
    pub choice: Vec<String>,
}

// Keep the derive attribute in sync with the domain invariant.
const _: () = assert!(CHOICES_PER_SEGMENT == 3);

pub fn parse_story(raw: &str) -> Result<StoryDraft, SchemaError> {
    parse_validated("story", raw)
}

pub fn parse_choices(raw: &str) -> Result<ChoiceDraft, SchemaError> {
    parse_validated("choices", raw)
}

fn parse_validated<T>(schema: &'static str, raw: &str) -> Result<T, SchemaError>
where
    T: DeserializeOwned + Validate,
{
    let json_str = extract_json(raw);

    let draft: T = serde_json::from_str(json_str).map_err(|e| {
        tracing::warn!(
            error = %e,
            schema,
            response = %raw,
            "Failed to parse model response as JSON"
        );
        SchemaError {
            schema,
            message: format!("Invalid JSON in response: {}", e),
        }
    })?;

    draft.validate().map_err(|e| {
        tracing::warn!(error = %e, schema, "Model response failed schema validation");
        SchemaError {
            schema,
            message: e.to_string(),
        }
    })?;

    Ok(draft)
}

/// Extract JSON from a response that might have markdown code blocks or extra text.
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }

    // Fenced block, with or without a language tag
    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let block = after[..end].trim();
            return match block.find('{') {
                Some(brace) => &block[brace..],
                None => block,
            };
        }
    }

    // Raw object embedded in prose
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    trimmed
}
