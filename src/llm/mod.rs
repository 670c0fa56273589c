//! Hosted language model access.
//!
//! Generation is best-effort: [`Generator::generate`] never fails. A failed
//! call yields a short error description in place of the generated text so
//! the HTTP layer can still answer with a well-formed response.

pub mod gemini;
pub mod models;

pub use gemini::GeminiClient;

use crate::Error;
use async_trait::async_trait;

/// Prefix of the text returned in place of a recommendation when generation fails
pub const GENERATION_ERROR_PREFIX: &str = "Error generating content: ";

#[async_trait]
pub trait Generator: Send + Sync {
    /// Model identifier reported by the health check
    fn model_name(&self) -> &str;

    /// Generated text for `prompt`, or an error description on failure
    async fn generate(&self, prompt: &str) -> String;
}

/// Text substituted for the recommendation when generation fails
pub fn describe_generation_error(err: &Error) -> String {
    match err {
        Error::Generation(msg) => format!("{GENERATION_ERROR_PREFIX}{msg}"),
        other => format!("{GENERATION_ERROR_PREFIX}{other}"),
    }
}
