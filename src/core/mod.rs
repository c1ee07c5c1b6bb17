// Public modules
pub mod build;
pub mod error;
pub mod naming;
pub mod plugins;
pub mod refactor;
pub mod runner;
pub mod template;
pub mod vcs;

// Public modules for CLI access
pub mod defaults;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
