use std::sync::Arc;

use sleighbound_domain::{DomainError, StorySegment, StoryState};

use super::prompts;
use super::schema::{self, SchemaError};
use crate::infrastructure::ports::{ChatMessage, FinishReason, LlmError, LlmPort, LlmRequest};

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("Story generation failed: {0}")]
    Llm(#[from] LlmError),
    #[error("Story generation hit the model's output limit while writing {0}")]
    Truncated(&'static str),
    #[error("Story generation returned invalid output: {0}")]
    InvalidOutput(#[from] SchemaError),
    #[error("Story generation produced an invalid segment: {0}")]
    InvalidSegment(#[from] DomainError),
}

/// Produces story segments with two text-generation calls: one for the scene
/// and its illustration prompt, one for the follow-up choices.
pub struct StoryGenerator {
    llm: Arc<dyn LlmPort>,
}

impl StoryGenerator {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    pub async fn generate(
        &self,
        story_so_far: &str,
        choice: &str,
        state: &StoryState,
    ) -> Result<StorySegment, StoryError> {
        let story_request = LlmRequest::new(vec![ChatMessage::user(prompts::story_prompt(
            state,
            story_so_far,
            choice,
        ))])
        .with_response_schema(prompts::story_schema());

        tracing::debug!(
            node_count = state.node_count(),
            phase = %state.phase(),
            "Requesting story segment"
        );
        let story_json = self.complete(story_request, "story").await?;
        let draft = schema::parse_story(&story_json)?;

        let choices_request =
            LlmRequest::new(vec![ChatMessage::user(prompts::choices_prompt(&draft.story))])
                .with_response_schema(prompts::choices_schema());

        let choices_json = self.complete(choices_request, "choices").await?;
        let choices = schema::parse_choices(&choices_json)?;

        let segment = StorySegment::new(draft.story, draft.image_prompt, choices.choice)?;

        tracing::info!(
            node_count = state.node_count(),
            phase = %state.phase(),
            story_chars = segment.story().len(),
            "Story segment generated"
        );

        Ok(segment)
    }

    /// Run one text-generation call and hand back its content. A response cut
    /// off by the output limit is rejected before any JSON parsing.
    async fn complete(
        &self,
        request: LlmRequest,
        call: &'static str,
    ) -> Result<String, StoryError> {
        let response = self.llm.generate(request).await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                call,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Model usage"
            );
        }

        match response.finish_reason {
            FinishReason::Stop => {}
            FinishReason::Length => return Err(StoryError::Truncated(call)),
            other => tracing::warn!(call, finish_reason = ?other, "Unexpected finish reason"),
        }

        Ok(response.content)
    }
}
