use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::log_llm_operation;

/// Boundary between the generation pipeline and the model provider.
///
/// Returns `None` on any failure: missing key, network error, quota,
/// malformed provider response. Callers treat `None` uniformly as
/// "model unavailable" and never see the underlying cause.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn call(&self, prompt: &str) -> Option<String>;
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "topK")]
    top_k: i32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            model: model.unwrap_or_else(|| "gemini-2.0-flash".to_string()),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_content(&self, prompt: &str) -> Result<String> {
        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.9,
                max_output_tokens: 4096,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        info!(
            model = %self.model,
            base_url = %self.base_url,
            prompt_length = prompt.len(),
            "Making Gemini request"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                status = %status,
                error = %error_text,
                "Gemini API request failed"
            );
            return Err(anyhow::anyhow!("Gemini API request failed: {}", error_text));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        if gemini_response.candidates.is_empty() {
            return Err(anyhow::anyhow!("No candidates in Gemini response"));
        }

        if gemini_response.candidates[0].content.parts.is_empty() {
            return Err(anyhow::anyhow!("No parts in Gemini response"));
        }

        let response_content = gemini_response.candidates[0].content.parts[0].text.clone();
        Ok(response_content)
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn call(&self, prompt: &str) -> Option<String> {
        if self.api_key.is_empty() {
            log_llm_operation!(warn, "generate_content", "API key is not configured");
            return None;
        }

        log_llm_operation!(start, "generate_content", prompt_length = prompt.len());

        match self.generate_content(prompt).await {
            Ok(text) => {
                log_llm_operation!(success, "generate_content", response_length = text.len());
                Some(text)
            }
            Err(e) => {
                log_llm_operation!(error, "generate_content", error = &e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url_and_model() {
        let client = GeminiClient::new("key".to_string(), None, None);
        assert_eq!(client.model_name(), "gemini-2.0-flash");
        assert!(client.base_url.contains("generativelanguage.googleapis.com"));
    }

    #[tokio::test]
    async fn test_missing_api_key_returns_none() {
        let client = GeminiClient::new(String::new(), None, None);
        assert!(client.call("prompt").await.is_none());
    }

    #[test]
    fn test_request_serializes_with_camel_case_config() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.9,
                max_output_tokens: 4096,
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("generationConfig"));
        assert!(json.contains("maxOutputTokens"));
        assert!(json.contains("topK"));
    }
}
