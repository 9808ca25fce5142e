//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{ImageGenPort, LlmPort};
use crate::use_cases;

/// Main application state.
///
/// Holds all use cases. Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub story: use_cases::StoryUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        llm: Arc<dyn LlmPort>,
        image_gen: Arc<dyn ImageGenPort>,
        image_cache_capacity: usize,
    ) -> Self {
        let generator = use_cases::StoryGenerator::new(llm);
        let images = use_cases::ImageResolver::new(image_gen, image_cache_capacity);
        let continue_story = Arc::new(use_cases::ContinueStory::new(generator, images));

        Self {
            use_cases: UseCases {
                story: use_cases::StoryUseCases::new(continue_story),
            },
        }
    }
}
