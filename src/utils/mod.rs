//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Command rendering and output helpers
//! - `io` - File I/O with consistent error handling
//! - `paths` - Forward-slash relative path helpers

pub mod command;
pub mod io;
pub mod paths;
