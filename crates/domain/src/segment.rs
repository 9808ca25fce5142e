//! A generated unit of narrative.

use serde::Serialize;

use crate::error::DomainError;

/// Every segment offers exactly this many follow-up choices.
pub const CHOICES_PER_SEGMENT: usize = 3;

/// One story segment: the scene text, the model's illustration prompt, and the
/// player's next choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorySegment {
    story: String,
    image_prompt: String,
    choices: [String; CHOICES_PER_SEGMENT],
}

impl StorySegment {
    /// Validate and assemble a segment.
    ///
    /// Fails when the story or image prompt is blank, or when `choices` does not
    /// hold exactly [`CHOICES_PER_SEGMENT`] non-blank entries.
    pub fn new(
        story: impl Into<String>,
        image_prompt: impl Into<String>,
        choices: Vec<String>,
    ) -> Result<Self, DomainError> {
        let story = story.into();
        let image_prompt = image_prompt.into();

        if story.trim().is_empty() {
            return Err(DomainError::validation("story text cannot be empty"));
        }
        if image_prompt.trim().is_empty() {
            return Err(DomainError::validation("image prompt cannot be empty"));
        }
        if choices.iter().any(|c| c.trim().is_empty()) {
            return Err(DomainError::validation("choices cannot be blank"));
        }

        let count = choices.len();
        let choices: [String; CHOICES_PER_SEGMENT] = choices.try_into().map_err(|_| {
            DomainError::validation(format!(
                "expected {} choices, got {}",
                CHOICES_PER_SEGMENT, count
            ))
        })?;

        Ok(Self {
            story,
            image_prompt,
            choices,
        })
    }

    pub fn story(&self) -> &str {
        &self.story
    }

    pub fn image_prompt(&self) -> &str {
        &self.image_prompt
    }

    pub fn choices(&self) -> &[String; CHOICES_PER_SEGMENT] {
        &self.choices
    }

    pub fn into_parts(self) -> (String, String, [String; CHOICES_PER_SEGMENT]) {
        (self.story, self.image_prompt, self.choices)
    }
}
