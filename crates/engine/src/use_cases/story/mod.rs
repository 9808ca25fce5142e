//! Story continuation use case.
//!
//! One request advances the story by one node: generate the segment, build the
//! illustration prompt, resolve the illustration, and report the new node count.

mod generator;
pub mod prompts;
mod schema;

use std::sync::Arc;

use serde::Serialize;
use sleighbound_domain::{StoryState, CHOICES_PER_SEGMENT};

use crate::use_cases::illustration::{IllustrationError, ImageResolver};

pub use generator::{StoryError, StoryGenerator};
pub use schema::SchemaError;

/// Container for story use cases.
pub struct StoryUseCases {
    pub continue_story: Arc<ContinueStory>,
}

impl StoryUseCases {
    pub fn new(continue_story: Arc<ContinueStory>) -> Self {
        Self { continue_story }
    }
}

/// Caller-supplied story position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinueStoryInput {
    pub story_so_far: String,
    pub choice: String,
    pub node_count: u32,
}

impl ContinueStoryInput {
    /// Decode a request body, substituting defaults instead of rejecting.
    ///
    /// A body that is empty, not JSON, or not an object yields all defaults. A
    /// field that is missing or has the wrong type takes its default. Negative
    /// node counts clamp to zero and fractional ones truncate.
    pub fn from_json_lenient(body: &[u8]) -> Self {
        let value: serde_json::Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                if !body.is_empty() {
                    tracing::debug!(error = %e, "Request body is not JSON, using defaults");
                }
                return Self::default();
            }
        };

        let Some(fields) = value.as_object() else {
            return Self::default();
        };

        let text = |name: &str| {
            fields
                .get(name)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_default()
        };

        let node_count = fields
            .get("node_count")
            .and_then(|v| {
                v.as_u64()
                    .or_else(|| v.as_i64().map(|n| n.max(0) as u64))
                    .or_else(|| v.as_f64().map(|f| f.max(0.0).trunc() as u64))
            })
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0);

        Self {
            story_so_far: text("story_so_far"),
            choice: text("choice"),
            node_count,
        }
    }
}

/// Successful continuation, serialized as the public response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContinueStoryOutput {
    pub story: String,
    pub choices: [String; CHOICES_PER_SEGMENT],
    pub image_url: String,
    pub node_count: u32,
    pub is_conclusion: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ContinueStoryError {
    #[error(transparent)]
    Story(#[from] StoryError),
    #[error(transparent)]
    Illustration(#[from] IllustrationError),
}

/// Drives one story node: generation, illustration, envelope.
pub struct ContinueStory {
    generator: StoryGenerator,
    images: ImageResolver,
}

impl ContinueStory {
    pub fn new(generator: StoryGenerator, images: ImageResolver) -> Self {
        Self { generator, images }
    }

    pub async fn execute(
        &self,
        input: ContinueStoryInput,
    ) -> Result<ContinueStoryOutput, ContinueStoryError> {
        let mut state = StoryState::new(input.node_count);
        // Advance before generating so the prompt matches the node being written
        state.advance();

        let segment = self
            .generator
            .generate(&input.story_so_far, &input.choice, &state)
            .await?;

        let image_prompt = prompts::image_prompt(segment.image_prompt());
        let image_url = self.images.resolve(&image_prompt).await?;

        let (story, _, choices) = segment.into_parts();
        Ok(ContinueStoryOutput {
            story,
            choices,
            image_url,
            node_count: state.node_count(),
            is_conclusion: state.is_conclusion(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        ImageResult, LlmError, LlmRequest, LlmResponse, MockImageGenPort, MockLlmPort,
    };
    use mockall::Sequence;
    use sleighbound_domain::MAX_NODES;

    const STORY_JSON: &str =
        r#"{"story": "Glitter drifts from the chimney.", "image_prompt": "A glittering chimney at night"}"#;
    const CHOICES_JSON: &str =
        r#"{"choice": ["Climb the chimney", "Catch the glitter", "Knock on the door"]}"#;

    fn story_llm<F>(story_prompt_check: F) -> MockLlmPort
    where
        F: Fn(&str) -> bool + Send + 'static,
    {
        let mut llm = MockLlmPort::new();
        let mut seq = Sequence::new();
        llm.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .withf(move |req: &LlmRequest| story_prompt_check(&req.messages[0].content))
            .returning(|_| Ok(LlmResponse::text(STORY_JSON)));
        llm.expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(LlmResponse::text(CHOICES_JSON)));
        llm
    }

    fn image_gen() -> MockImageGenPort {
        let mut image_gen = MockImageGenPort::new();
        image_gen
            .expect_generate()
            .times(1)
            .withf(|req| {
                req.prompt.starts_with("A glittering chimney at night Artistic style:")
            })
            .returning(|_| {
                Ok(ImageResult {
                    urls: vec!["https://img.test/chimney.webp".to_string()],
                })
            });
        image_gen
    }

    fn use_case(llm: MockLlmPort, image_gen: MockImageGenPort) -> ContinueStory {
        ContinueStory::new(
            StoryGenerator::new(Arc::new(llm)),
            ImageResolver::new(Arc::new(image_gen), 100),
        )
    }

    #[tokio::test]
    async fn first_node_uses_continuation_prompt() {
        let llm = story_llm(|prompt| !prompt.contains("This is the final scene"));
        let continue_story = use_case(llm, image_gen());

        let output = continue_story
            .execute(ContinueStoryInput::default())
            .await
            .unwrap();

        assert_eq!(output.node_count, 1);
        assert!(!output.is_conclusion);
        assert_eq!(output.story, "Glitter drifts from the chimney.");
        assert_eq!(output.choices[0], "Climb the chimney");
        assert_eq!(output.image_url, "https://img.test/chimney.webp");
    }

    #[tokio::test]
    async fn node_before_penultimate_gets_twist() {
        // Advancing from MAX_NODES - 2 lands on the penultimate node
        let llm = story_llm(|prompt| {
            prompt.contains("major twist") && !prompt.contains("This is the final scene")
        });
        let continue_story = use_case(llm, image_gen());

        let output = continue_story
            .execute(ContinueStoryInput {
                node_count: MAX_NODES - 2,
                choice: "Follow the footprints".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(output.node_count, MAX_NODES - 1);
        assert!(!output.is_conclusion);
    }

    #[tokio::test]
    async fn reaching_max_nodes_concludes() {
        let llm = story_llm(|prompt| prompt.contains("This is the final scene"));
        let continue_story = use_case(llm, image_gen());

        let output = continue_story
            .execute(ContinueStoryInput {
                node_count: MAX_NODES - 1,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(output.node_count, MAX_NODES);
        assert!(output.is_conclusion);
        assert_eq!(output.choices.len(), 3);
    }

    #[tokio::test]
    async fn past_max_nodes_still_concludes_with_choices() {
        let llm = story_llm(|prompt| prompt.contains("This is the final scene"));
        let continue_story = use_case(llm, image_gen());

        let output = continue_story
            .execute(ContinueStoryInput {
                node_count: MAX_NODES,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(output.node_count, MAX_NODES + 1);
        assert!(output.is_conclusion);
        assert_eq!(output.choices.len(), 3);
    }

    #[tokio::test]
    async fn story_failure_skips_image_generation() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .times(1)
            .returning(|_| Err(LlmError::RequestFailed("timeout".to_string())));
        let mut image_gen = MockImageGenPort::new();
        image_gen.expect_generate().never();

        let err = use_case(llm, image_gen)
            .execute(ContinueStoryInput::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ContinueStoryError::Story(_)));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn lenient_input_reads_fields() {
        let input = ContinueStoryInput::from_json_lenient(
            br#"{"story_so_far": "Once upon a time", "choice": "Run", "node_count": 2}"#,
        );
        assert_eq!(
            input,
            ContinueStoryInput {
                story_so_far: "Once upon a time".to_string(),
                choice: "Run".to_string(),
                node_count: 2,
            }
        );
    }

    #[test]
    fn lenient_input_defaults_bad_shapes() {
        assert_eq!(
            ContinueStoryInput::from_json_lenient(b""),
            ContinueStoryInput::default()
        );
        assert_eq!(
            ContinueStoryInput::from_json_lenient(b"not json"),
            ContinueStoryInput::default()
        );
        assert_eq!(
            ContinueStoryInput::from_json_lenient(b"[1, 2, 3]"),
            ContinueStoryInput::default()
        );

        let input = ContinueStoryInput::from_json_lenient(
            br#"{"story_so_far": 7, "choice": null, "node_count": "three"}"#,
        );
        assert_eq!(input, ContinueStoryInput::default());
    }

    #[test]
    fn lenient_input_normalizes_node_count() {
        let negative = ContinueStoryInput::from_json_lenient(br#"{"node_count": -4}"#);
        assert_eq!(negative.node_count, 0);

        let fractional = ContinueStoryInput::from_json_lenient(br#"{"node_count": 2.9}"#);
        assert_eq!(fractional.node_count, 2);

        let huge = ContinueStoryInput::from_json_lenient(br#"{"node_count": 99999999999}"#);
        assert_eq!(huge.node_count, u32::MAX);
    }

    #[test]
    fn output_serializes_envelope_fields() {
        let output = ContinueStoryOutput {
            story: "s".to_string(),
            choices: ["a", "b", "c"].map(String::from),
            image_url: "https://img.test/x.webp".to_string(),
            node_count: 3,
            is_conclusion: false,
        };

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "story": "s",
                "choices": ["a", "b", "c"],
                "image_url": "https://img.test/x.webp",
                "node_count": 3,
                "is_conclusion": false
            })
        );
    }
}
