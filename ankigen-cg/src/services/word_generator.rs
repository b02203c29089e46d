//! Word generation service
//!
//! Trait seam for the external service that turns a free-text context into
//! card candidates, plus the production OpenAI chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::CardCandidate;
use ankigen_common::config::Settings;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Word generation client errors
#[derive(Debug, Error)]
pub enum WordGenError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("API key not configured")]
    MissingApiKey,
}

/// External service that generates card candidates from a context string
///
/// Bounded-size input (the context), bounded-size output (at most `max_count`
/// candidates), explicit failure signaling. Returning fewer candidates than
/// requested is not a failure.
#[async_trait]
pub trait WordGenerationService: Send + Sync {
    async fn generate(
        &self,
        context: &str,
        max_count: u32,
    ) -> Result<Vec<CardCandidate>, WordGenError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// OpenAI-backed word generator
pub struct OpenAiWordGenerator {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiWordGenerator {
    pub fn new(settings: &Settings) -> Result<Self, WordGenError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.generation_timeout_secs))
            .build()
            .map_err(|e| WordGenError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: settings.openai_api_key.clone(),
            model: settings.openai_model.clone(),
        })
    }

    fn build_prompt(context: &str, max_count: u32) -> String {
        format!(
            "You are a language-learning assistant. Based on the following context, \
             generate up to {max_count} useful English vocabulary words or short phrases \
             with Portuguese translations.\n\
             Context: {context}\n\
             Respond with ONLY a JSON array, no prose, where each element is an object \
             with exactly these keys: \
             \"word\", \"translation\", \"example\", \"example_translation\". \
             The example must be a natural sentence using the word."
        )
    }

    /// Extract the JSON array from the model reply, tolerating fenced code
    /// blocks and surrounding prose
    fn parse_candidates(content: &str) -> Result<Vec<CardCandidate>, WordGenError> {
        let trimmed = content.trim();

        let json_slice = if let Some(start) = trimmed.find('[') {
            let end = trimmed
                .rfind(']')
                .ok_or_else(|| WordGenError::Parse("unterminated JSON array".to_string()))?;
            if end < start {
                return Err(WordGenError::Parse("unterminated JSON array".to_string()));
            }
            &trimmed[start..=end]
        } else {
            return Err(WordGenError::Parse("no JSON array in response".to_string()));
        };

        serde_json::from_str::<Vec<CardCandidate>>(json_slice)
            .map_err(|e| WordGenError::Parse(e.to_string()))
    }
}

#[async_trait]
impl WordGenerationService for OpenAiWordGenerator {
    async fn generate(
        &self,
        context: &str,
        max_count: u32,
    ) -> Result<Vec<CardCandidate>, WordGenError> {
        if self.api_key.trim().is_empty() {
            return Err(WordGenError::MissingApiKey);
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: Self::build_prompt(context, max_count),
            }],
            temperature: 0.7,
        };

        let url = format!("{}/chat/completions", OPENAI_BASE_URL);
        tracing::debug!(model = %self.model, max_count, "Requesting word generation");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| WordGenError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(WordGenError::Api(status.as_u16(), error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| WordGenError::Parse(e.to_string()))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| WordGenError::Parse("response contained no choices".to_string()))?;

        let mut candidates = Self::parse_candidates(content)?;
        // The model occasionally over-delivers; enforce the requested bound
        candidates.truncate(max_count as usize);

        tracing::info!(
            count = candidates.len(),
            requested = max_count,
            "Word generation returned candidates"
        );

        Ok(candidates)
    }
}
