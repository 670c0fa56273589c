use serde::{Deserialize, Serialize};

/// Body of `models/{model}:generateContent`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestPart<'a> {
    pub text: &'a str,
}

impl<'a> RequestContent<'a> {
    pub fn user_text(text: &'a str) -> Self {
        Self {
            role: Some("user"),
            parts: vec![RequestPart { text }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<ResponseContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it produced any
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Why no text came back (safety block, finish reason), for error messages
    pub fn empty_reason(&self) -> String {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return format!("prompt blocked ({reason})");
        }

        match self.candidates.first() {
            None => "no candidates returned".to_string(),
            Some(candidate) => format!(
                "candidate had no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

/// Body of `models/{model}:batchEmbedContents`
#[derive(Debug, Clone, Serialize)]
pub struct BatchEmbedRequest<'a> {
    pub requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedContentRequest<'a> {
    pub model: String,
    pub content: RequestContent<'a>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchEmbedResponse {
    #[serde(default)]
    pub embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentEmbedding {
    #[serde(default)]
    pub values: Vec<f32>,
}

/// Error envelope returned by the API on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_joins_parts() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Try the "}, {"text": "pancakes."}], "role": "model"},
                "finishReason": "STOP"
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("Try the pancakes."));
    }

    #[test]
    fn test_blocked_prompt_has_no_text() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert!(response.text().is_none());
        assert_eq!(response.empty_reason(), "prompt blocked (SAFETY)");
    }

    #[test]
    fn test_error_envelope_keeps_message() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.error.message, "Resource has been exhausted");
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest {
            contents: vec![RequestContent::user_text("hello")],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }
}
