//! The advice relay: free-text question in, expert answer out.
//!
//! The interesting part lives behind the [`Advisor`] trait so the HTTP
//! layer can be driven by a scripted implementation in tests.

pub mod mock;
pub mod openai;

use async_trait::async_trait;

use crate::error::AppError;

/// Something that can answer a bodybuilding question. Could be an LLM API
/// or a test script.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Answer a prompt. The reply is returned verbatim — no sanitization,
    /// no truncation.
    async fn advise(&self, prompt: &str) -> Result<String, AppError>;
}

/// Reject empty or whitespace-only prompts before any network call.
pub fn validate_prompt(prompt: &str) -> Result<&str, AppError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Prompt is required"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_is_rejected() {
        assert!(validate_prompt("").is_err());
    }

    #[test]
    fn whitespace_only_prompt_is_rejected() {
        let err = validate_prompt("   \n\t ").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.to_string(), "Prompt is required");
    }

    #[test]
    fn prompt_is_trimmed() {
        assert_eq!(
            validate_prompt("  how do I grow my chest?  ").unwrap(),
            "how do I grow my chest?"
        );
    }
}
