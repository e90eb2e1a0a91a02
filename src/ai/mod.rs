//! Generative AI collaborator
//!
//! The dispatcher only sees the [`Generator`] trait; [`GeminiClient`] is the
//! production implementation.

mod gemini;
pub mod mime;

use async_trait::async_trait;

pub use gemini::GeminiClient;

use crate::Result;

/// Text generation backend
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a reply to a text-only prompt
    async fn generate_text(&self, prompt: &str) -> Result<String>;

    /// Generate a reply to a prompt accompanied by one inline file
    ///
    /// `data_base64` is the standard-alphabet base64 encoding of the file.
    async fn generate_with_file(
        &self,
        prompt: &str,
        data_base64: &str,
        mime_type: &str,
    ) -> Result<String>;
}
