//! Use cases - orchestration of ports and domain logic.

pub mod illustration;
pub mod story;

pub use illustration::{IllustrationError, ImageResolver};
pub use story::{
    ContinueStory, ContinueStoryError, ContinueStoryInput, ContinueStoryOutput, StoryGenerator,
    StoryUseCases,
};
