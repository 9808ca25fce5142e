//! Sleighbound Engine library.
//!
//! Server-side code for the interactive Christmas story narrator.
//!
//! ## Structure
//!
//! - `use_cases/` - Story continuation and illustration orchestration
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
