// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer
#![allow(clippy::single_char_add_str)] // push_str("\n") reads better than push('\n')
#![allow(clippy::collapsible_if)] // Separate ifs can be more readable
#![allow(clippy::manual_strip)] // Manual prefix stripping can be clearer

// Module declarations
pub mod agents;
pub mod commands;
pub mod config;
pub mod extraction;
pub mod file_storage;
mod models;
pub mod pipeline;
pub mod report;
mod templates;
mod utils;

// Re-export models for use in commands
pub use models::*;
pub use utils::title_from_key;
