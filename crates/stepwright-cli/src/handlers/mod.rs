//! Command handlers - extracted from main.rs for testability
//!
//! Each handler module contains:
//! - The execution logic for a CLI command
//! - Pure helper functions
//! - Tests

pub mod artifact;
pub mod backend;
pub mod run;
pub mod serve;
pub mod translate;

// Re-export handlers for convenient access
pub use artifact::execute_artifact;
pub use backend::{load_tree, model_translator, step_translator};
pub use run::execute_run;
pub use serve::execute_serve;
pub use translate::execute_translate;
