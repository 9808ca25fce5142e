//! Sleighbound domain types.
//!
//! Pure story-progression logic with no I/O:
//!
//! - `story` - node counting and the phase policy derived from it
//! - `segment` - a validated unit of generated narrative
//! - `error` - the domain error type

pub mod error;
pub mod segment;
pub mod story;

pub use error::DomainError;
pub use segment::{StorySegment, CHOICES_PER_SEGMENT};
pub use story::{StoryPhase, StoryState, MAX_NODES, MIDDLE_PHASE_START};
