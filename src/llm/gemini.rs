use crate::config::GeminiConfig;
use crate::llm::models::{
    ApiErrorEnvelope, BatchEmbedRequest, BatchEmbedResponse, EmbedContentRequest,
    GenerateContentRequest, GenerateContentResponse, RequestContent, RequestPart,
};
use crate::llm::Generator;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Client for the Gemini `generativelanguage` REST API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("pantry-chef/", env!("CARGO_PKG_VERSION"))),
        );

        let mut api_key = header::HeaderValue::from_str(&config.api_key)
            .map_err(|e| Error::Config(format!("Invalid GEMINI_API_KEY: {e}")))?;
        api_key.set_sensitive(true);
        headers.insert("x-goog-api-key", api_key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Configured generation model
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// POST a JSON body to `{base}/v1beta/{path}`; failures are wrapped with `kind`
    async fn post<B, T>(&self, path: &str, body: &B, kind: fn(String) -> Error) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/v1beta/{}", self.config.api_base_url, path);
        debug!("Gemini API request: POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| kind(format!("Gemini API request failed: {e}")))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            let message = serde_json::from_str::<ApiErrorEnvelope>(&error_body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(error_body);
            error!("Gemini API error: {} - {}", status, message);

            return Err(kind(match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    format!("Gemini API quota exceeded: {message}")
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    format!("Gemini authentication failed: {message}")
                }
                _ => format!("Gemini API error: {status}: {message}"),
            }));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| kind(format!("Failed to parse Gemini API response: {e}")))
    }

    /// Generate text for `prompt`, surfacing every failure as an error
    pub async fn try_generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent::user_text(prompt)],
        };
        let path = format!("models/{}:generateContent", self.config.model);

        let response: GenerateContentResponse =
            self.post(&path, &request, Error::Generation).await?;

        response.text().ok_or_else(|| {
            Error::Generation(format!("Empty response: {}", response.empty_reason()))
        })
    }

    /// Embed `texts` with `model` in a single batch call
    pub async fn embed_batch(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model_ref = format!("models/{model}");
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: model_ref.clone(),
                    content: RequestContent {
                        role: None,
                        parts: vec![RequestPart {
                            text: text.as_str(),
                        }],
                    },
                })
                .collect(),
        };
        let path = format!("{model_ref}:batchEmbedContents");

        let response: BatchEmbedResponse = self.post(&path, &request, Error::Embedding).await?;

        if response.embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl Generator for GeminiClient {
    fn model_name(&self) -> &str {
        self.model()
    }

    async fn generate(&self, prompt: &str) -> String {
        match self.try_generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Generation failed, returning error text: {}", e.log_safe());
                super::describe_generation_error(&e)
            }
        }
    }
}
