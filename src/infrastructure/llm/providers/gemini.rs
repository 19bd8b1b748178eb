//! Gemini Provider - Google generative language API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::infrastructure::llm::{LLMMessage, LLMResponse, LLMError, LLMResult, LLM, LLMUsage};

/// Gemini API endpoint
const API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Information about a Gemini model returned from the API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiModelInfo {
    /// Full resource name (e.g. "models/gemini-2.0-flash")
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl GeminiModelInfo {
    /// "models/gemini-2.0-flash" -> "gemini-2.0-flash"
    pub fn model_id(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    /// Id followed by the display name, when the API gives one
    pub fn label(&self) -> String {
        if self.display_name.is_empty() {
            self.model_id().to_string()
        } else {
            format!("{} ({})", self.model_id(), self.display_name)
        }
    }

    pub fn supports_generation(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

/// Gemini provider
pub struct GeminiProvider {
    api_key: String,
    client: Client,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: Option<&str>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            model: model.unwrap_or("gemini-2.0-flash").to_string(),
            base_url: API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// List models usable for text generation, sorted by name
    pub async fn list_models(&self) -> LLMResult<Vec<GeminiModelInfo>> {
        let mut all_models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client
                .get(format!("{}/v1beta/models", self.base_url))
                .header("x-goog-api-key", &self.api_key);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| LLMError::NetworkError(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(LLMError::ApiError(format!("status: {}, body: {}", status, body)));
            }

            let page: ListModelsResponse = response
                .json()
                .await
                .map_err(|e| LLMError::ParseError(e.to_string()))?;
            all_models.extend(page.models);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        let mut models: Vec<_> = all_models
            .into_iter()
            .filter(|m| m.supports_generation())
            .collect();
        models.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(models)
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<GeminiModelInfo>,
    next_page_token: Option<String>,
}

/// API request structure
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// API response structure
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

/// One single-part content per message
fn to_gemini_contents(messages: Vec<LLMMessage>) -> Vec<Content> {
    messages
        .into_iter()
        .map(|msg| Content {
            role: Some(msg.role),
            parts: vec![Part { text: msg.content }],
        })
        .collect()
}

#[async_trait]
impl LLM for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn chat(
        &self,
        messages: Vec<LLMMessage>,
        model: Option<&str>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> LLMResult<LLMResponse> {
        if self.api_key.is_empty() {
            return Err(LLMError::MissingApiKey);
        }

        let model = model.unwrap_or(&self.model);
        let contents = to_gemini_contents(messages);

        let generation_config = if temperature.is_some() || max_tokens.is_some() {
            Some(GenerationConfig {
                temperature,
                max_output_tokens: max_tokens,
            })
        } else {
            None
        };

        let request = GenerateRequest {
            contents,
            generation_config,
        };

        let response = self.client
            .post(self.generate_url(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        if response.status() == 429 {
            return Err(LLMError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::ApiError(format!("status: {}, body: {}", status, body)));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let candidate = generated.candidates
            .into_iter()
            .next()
            .ok_or(LLMError::EmptyResponse)?;

        let content: String = candidate.content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LLMError::EmptyResponse);
        }

        let usage = generated.usage_metadata.map(|u| LLMUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(LLMResponse {
            content,
            model: model.to_string(),
            usage,
            finish_reason: candidate.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_prompt_is_single_user_content() {
        let request = GenerateRequest {
            contents: to_gemini_contents(vec![LLMMessage::user("人設\n推薦機油")]),
            generation_config: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "contents": [{ "role": "user", "parts": [{ "text": "人設\n推薦機油" }] }] })
        );
    }

    #[tokio::test]
    async fn test_chat_joins_parts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "key-1")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "推薦機油" }] }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "candidates": [{
                        "content": { "role": "model", "parts": [{ "text": "建議使用" }, { "text": " 5W-30" }] },
                        "finishReason": "STOP"
                    }],
                    "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15 }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = GeminiProvider::new("key-1", Some("gemini-test")).with_base_url(server.url());
        let response = provider
            .chat(vec![LLMMessage::user("推薦機油")], None, None, None)
            .await
            .unwrap();

        assert_eq!(response.content, "建議使用 5W-30");
        assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(response.usage.and_then(|u| u.total_tokens), Some(15));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(429)
            .create_async()
            .await;

        let provider = GeminiProvider::new("key-1", None).with_base_url(server.url());
        let result = provider.chat(vec![LLMMessage::user("hi")], None, None, None).await;
        assert!(matches!(result, Err(LLMError::RateLimited)));
    }

    #[tokio::test]
    async fn test_chat_without_candidates_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;

        let provider = GeminiProvider::new("key-1", None).with_base_url(server.url());
        let result = provider.chat(vec![LLMMessage::user("hi")], None, None, None).await;
        assert!(matches!(result, Err(LLMError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let provider = GeminiProvider::new("", None);
        let result = provider.chat(vec![LLMMessage::user("hi")], None, None, None).await;
        assert!(matches!(result, Err(LLMError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_list_models_pages_and_filters() {
        let mut server = mockito::Server::new_async().await;
        let _first = server
            .mock("GET", "/v1beta/models")
            .match_query(Matcher::Exact(String::new()))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "models": [
                        { "name": "models/gemini-2.0-flash", "displayName": "Gemini 2.0 Flash", "supportedGenerationMethods": ["generateContent"] },
                        { "name": "models/text-embedding-004", "supportedGenerationMethods": ["embedContent"] }
                    ],
                    "nextPageToken": "page-2"
                })
                .to_string(),
            )
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/v1beta/models")
            .match_query(Matcher::UrlEncoded("pageToken".into(), "page-2".into()))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "models": [
                        { "name": "models/gemini-1.5-pro", "supportedGenerationMethods": ["generateContent", "countTokens"] }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = GeminiProvider::new("key-1", None).with_base_url(server.url());
        let models = provider.list_models().await.unwrap();
        let ids: Vec<&str> = models.iter().map(|m| m.model_id()).collect();
        assert_eq!(ids, vec!["gemini-1.5-pro", "gemini-2.0-flash"]);

        let labels: Vec<String> = models.iter().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["gemini-1.5-pro".to_string(), "gemini-2.0-flash (Gemini 2.0 Flash)".to_string()]);
    }
}
