//! Prompt construction for story, choice, and illustration generation.
//!
//! Every function here is a pure string transform.

use serde_json::json;
use sleighbound_domain::{StoryPhase, StoryState};

const PREMISE: &str = r#"You are narrating an urgent Christmas adventure: Santa has mysteriously vanished just days before Christmas.
Write in the second person ("you") from the point of view of one of Santa's most trusted elves, who is searching for him."#;

const FINAL_SCENE_INSTRUCTIONS: &str = r#"This is the final scene. Bring the story to a satisfying close that solves the mystery of Santa's disappearance.
Keep the tone hopeful and magical, and congratulate the player on the bravery and resourcefulness that saved Christmas.

Respond with:
1. "story": a vivid closing scene of around 200-250 words that
   - reveals what happened to Santa,
   - includes a heartwarming reunion with Santa,
   - reflects the player's final choice.

2. "image_prompt": a concise 2-3 sentence prompt for an illustration that
   - focuses on the main visual elements of the scene,
   - describes only the key characters and core scene elements,
   - emphasizes the magical Christmas atmosphere.

Here is the story so far:"#;

const CONTINUATION_INSTRUCTIONS: &str = r#"Respond with:
1. "story": a vivid scene of around 100 words that
   - uses simple language suitable for children,
   - only introduces details that every one of the next three choices can use,
   - has at most 3-4 key elements (objects, clues, locations) worth investigating,
   - focuses on the environment and its magical elements.

2. "image_prompt": a concise 2-3 sentence prompt for an illustration that
   - focuses on the main visual elements of the scene,
   - describes only the key characters and core scene elements,
   - emphasizes the magical Christmas atmosphere,
   - does not show Santa or anyone resembling him.

Here is the story so far:"#;

const MIDDLE_PHASE_PRESSURE: &str =
    "Start building towards a conclusion as the search for Santa intensifies.";

const PENULTIMATE_TWIST: &str =
    "Add a major twist or reveal that sets up the finale of this story.";

const ILLUSTRATION_STYLE: &str = r#"
    Artistic style: detailed digital art, warm lighting, festive colors, magical atmosphere,
    in the spirit of animated-film concept art meeting classic Christmas storybook illustration.
    High quality, highly detailed, soft glowing light, Christmas sparkle, 4k, focus on environmental elements.
"#;

/// Build the prompt for the next story segment.
///
/// The conclusion gets a dedicated final-scene prompt. Every other node gets a
/// continuation prompt, with extra narrative pressure in the middle phase and a
/// twist on the node just before the conclusion.
pub fn story_prompt(state: &StoryState, story_so_far: &str, choice: &str) -> String {
    if state.phase() == StoryPhase::Conclusion {
        return format!(
            "{}\n{}\n{}\nThe player has decided to make the final choice: {}.",
            PREMISE, FINAL_SCENE_INSTRUCTIONS, story_so_far, choice
        );
    }

    let mut prompt = format!(
        "{}\n\n{}\n{}\nThe player has decided to do the following: {}.",
        PREMISE, CONTINUATION_INSTRUCTIONS, story_so_far, choice
    );

    if state.phase() == StoryPhase::Middle {
        prompt.push('\n');
        prompt.push_str(MIDDLE_PHASE_PRESSURE);
    }
    if state.is_penultimate() {
        prompt.push('\n');
        prompt.push_str(PENULTIMATE_TWIST);
    }

    prompt
}

/// Build the prompt that extracts three follow-up choices from a finished scene.
pub fn choices_prompt(story: &str) -> String {
    format!(
        r#"{}

Provide exactly 3 distinct choices for what the player can do next. Each choice
- must ONLY use elements that appear in the scene,
- must start with an action verb.

Here is the scene to draw the choices from:
{}"#,
        PREMISE, story
    )
}

/// Turn the model's illustration prompt into the final image-service prompt.
///
/// Appends the house illustration style and collapses every whitespace run into a
/// single space.
pub fn image_prompt(model_prompt: &str) -> String {
    let combined = format!("{}\n{}", model_prompt, ILLUSTRATION_STYLE);
    collapse_whitespace(&combined)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Response schema for a story segment: `{ story, image_prompt }`.
pub fn story_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "story": { "type": "STRING" },
            "image_prompt": { "type": "STRING" }
        },
        "required": ["story", "image_prompt"]
    })
}

/// Response schema for follow-up choices: `{ choice: [string] }`.
pub fn choices_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "choice": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["choice"]
    })
}
