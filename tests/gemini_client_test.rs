use mockito::Matcher;
use pantry_chef::config::GeminiConfig;
use pantry_chef::llm::{GeminiClient, Generator};
use pantry_chef::store::{Embedder, GeminiEmbedder};
use pantry_chef::Error;
use serde_json::json;

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";
const EMBED_PATH: &str = "/v1beta/models/text-embedding-004:batchEmbedContents";

fn config(base_url: String) -> GeminiConfig {
    GeminiConfig {
        api_key: "test-key".to_string(),
        model: "gemini-1.5-flash".to_string(),
        api_base_url: base_url,
        timeout_seconds: 5,
    }
}

#[tokio::test]
async fn test_generate_returns_candidate_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::Json(json!({
            "contents": [{"role": "user", "parts": [{"text": "What can I cook?"}]}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Make a frittata."}]},
                    "finishReason": "STOP"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = GeminiClient::new(config(server.url())).unwrap();
    assert_eq!(client.model_name(), "gemini-1.5-flash");
    assert_eq!(client.generate("What can I cook?").await, "Make a frittata.");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_quota_error_is_described_not_raised() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": {
                    "code": 429,
                    "message": "Resource has been exhausted",
                    "status": "RESOURCE_EXHAUSTED"
                }
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let client = GeminiClient::new(config(server.url())).unwrap();

    assert_eq!(
        client.generate("prompt").await,
        "Error generating content: Gemini API quota exceeded: Resource has been exhausted"
    );
    assert!(matches!(
        client.try_generate("prompt").await,
        Err(Error::Generation(_))
    ));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_auth_failure_is_described() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", GENERATE_PATH)
        .with_status(403)
        .with_body(r#"{"error": {"code": 403, "message": "API key not valid"}}"#)
        .create_async()
        .await;

    let client = GeminiClient::new(config(server.url())).unwrap();
    assert_eq!(
        client.generate("prompt").await,
        "Error generating content: Gemini authentication failed: API key not valid"
    );
}

#[tokio::test]
async fn test_blocked_prompt_is_described() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
        .create_async()
        .await;

    let client = GeminiClient::new(config(server.url())).unwrap();
    assert_eq!(
        client.generate("prompt").await,
        "Error generating content: Empty response: prompt blocked (SAFETY)"
    );
}

#[tokio::test]
async fn test_malformed_response_is_described() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = GeminiClient::new(config(server.url())).unwrap();
    let text = client.generate("prompt").await;
    assert!(text.starts_with("Error generating content: Failed to parse Gemini API response"));
}

#[tokio::test]
async fn test_unreachable_service_is_described() {
    let client = GeminiClient::new(config("http://127.0.0.1:1".to_string())).unwrap();
    let text = client.generate("prompt").await;
    assert!(text.starts_with("Error generating content: Gemini API request failed"));
}

#[tokio::test]
async fn test_embed_batch_returns_vectors_in_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", EMBED_PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::Json(json!({
            "requests": [
                {"model": "models/text-embedding-004", "content": {"parts": [{"text": "eggs"}]}},
                {"model": "models/text-embedding-004", "content": {"parts": [{"text": "flour"}]}}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "embeddings": [
                    {"values": [1.0, 0.0, 0.0]},
                    {"values": [0.0, 1.0, 0.0]}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = GeminiClient::new(config(server.url())).unwrap();
    let embedder = GeminiEmbedder::new(client, "text-embedding-004".to_string());

    let vectors = embedder
        .embed(&["eggs".to_string(), "flour".to_string()])
        .await
        .unwrap();
    assert_eq!(embedder.model_name(), "text-embedding-004");
    assert_eq!(vectors, vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_embed_batch_rejects_short_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", EMBED_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"embeddings": [{"values": [1.0]}]}"#)
        .create_async()
        .await;

    let client = GeminiClient::new(config(server.url())).unwrap();
    let result = client
        .embed_batch("text-embedding-004", &["a".to_string(), "b".to_string()])
        .await;

    match result {
        Err(Error::Embedding(msg)) => assert_eq!(msg, "Expected 2 embeddings, got 1"),
        other => panic!("expected embedding error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_embed_batch_skips_empty_input() {
    let client = GeminiClient::new(config("http://127.0.0.1:1".to_string())).unwrap();
    let vectors = client.embed_batch("text-embedding-004", &[]).await.unwrap();
    assert!(vectors.is_empty());
}
