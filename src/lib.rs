pub mod config;
pub mod db;
pub mod error;

// Retrieval and generation
pub mod llm;
pub mod prompt;
pub mod store;

// HTTP surface
pub mod api;

// Command line
pub mod cli;

// Utilities
pub mod utils;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
