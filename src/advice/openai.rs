//! An advisor that calls the OpenAI chat-completions API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Advisor;
use crate::consts::DEFAULT_MODEL;
use crate::error::AppError;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_COMPLETION_TOKENS: u32 = 800;

/// Forwards each prompt as a single user message and returns the first
/// choice's text. No retry, no backoff, no partial result.
pub struct OpenAiAdvisor {
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiAdvisor {
    pub fn new(model: Option<String>, api_key: String, client: reqwest::Client) -> Self {
        Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
            client,
        }
    }

    fn extract_reply(resp: ApiResponse) -> Result<String, AppError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::upstream("OpenAI API returned no choices"))?;

        choice
            .message
            .content
            .ok_or_else(|| AppError::upstream("OpenAI API returned a choice without content"))
    }
}

#[async_trait]
impl Advisor for OpenAiAdvisor {
    async fn advise(&self, prompt: &str) -> Result<String, AppError> {
        let body = ApiRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let resp = self
            .client
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "OpenAI API error ({status}): {text}"
            )));
        }

        let api_resp: ApiResponse = resp.json().await?;
        Self::extract_reply(api_resp)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> ApiResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn extracts_first_choice_content() {
        let resp = parse(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Eat more protein." } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        }));

        let reply = OpenAiAdvisor::extract_reply(resp).unwrap();
        assert_eq!(reply, "Eat more protein.");
    }

    #[test]
    fn reply_is_untouched() {
        let text = "  Sets:\n 1. Bench\n 2. Incline  ";
        let resp = parse(serde_json::json!({
            "choices": [{ "message": { "content": text } }]
        }));

        assert_eq!(OpenAiAdvisor::extract_reply(resp).unwrap(), text);
    }

    #[test]
    fn no_choices_is_an_upstream_error() {
        let resp = parse(serde_json::json!({ "choices": [] }));
        let err = OpenAiAdvisor::extract_reply(resp).unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn null_content_is_an_upstream_error() {
        let resp = parse(serde_json::json!({
            "choices": [{ "message": { "content": null } }]
        }));
        assert!(OpenAiAdvisor::extract_reply(resp).is_err());
    }

    #[test]
    fn default_model_is_used_when_none_given() {
        let advisor = OpenAiAdvisor::new(None, "sk-test".to_string(), reqwest::Client::new());
        assert_eq!(advisor.model, DEFAULT_MODEL);
    }
}
