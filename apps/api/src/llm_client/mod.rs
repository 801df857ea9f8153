/// LLM Client — the single point of entry for chat-completion calls.
///
/// ARCHITECTURAL RULE: handlers talk to the provider only through `ChatProvider`.
///
/// Model and sampling parameters are hardcoded; do not make them configurable.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// The model used for every chat completion.
pub const MODEL: &str = "llama-3.3-70b-versatile";
pub const TEMPERATURE: f32 = 0.5;
pub const MAX_TOKENS: u32 = 500;
pub const TOP_P: f32 = 1.0;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Any other caller-supplied fields, forwarded to the provider as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: &'static str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub stream: bool,
    /// Always serialized; `null` means no explicit stop sequence.
    pub stop: Option<Vec<String>>,
}

impl CompletionRequest {
    /// Wraps `messages` in the fixed generation configuration.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: MODEL,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
            stream: false,
            stop: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if the provider returned one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// The completion backend. Carried in `AppState` as `Arc<dyn ChatProvider>`.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Groq's OpenAI-compatible chat-completions API. One attempt per call, no retries.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl GroqClient {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            api_url,
        })
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let completion: CompletionResponse = serde_json::from_str(&body)?;
        debug!("LLM call succeeded: choices={}", completion.choices.len());

        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_carries_fixed_generation_config() {
        let request = CompletionRequest::new(vec![ChatMessage::system("sys")]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama-3.3-70b-versatile");
        assert_eq!(value["temperature"], 0.5);
        assert_eq!(value["max_tokens"], 500);
        assert_eq!(value["top_p"], 1.0);
        assert_eq!(value["stream"], false);
        assert!(value["stop"].is_null());
        assert_eq!(value["messages"][0], json!({ "role": "system", "content": "sys" }));
    }

    #[test]
    fn test_first_content_reads_first_choice() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "TypeScript and Python" } },
                { "message": { "content": "ignored" } }
            ]
        }))
        .unwrap();
        assert_eq!(response.first_content(), Some("TypeScript and Python"));
    }

    #[test]
    fn test_first_content_missing_pieces() {
        let empty: CompletionResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.first_content(), None);

        let null_content: CompletionResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "content": null } }] }))
                .unwrap();
        assert_eq!(null_content.first_content(), None);
    }

    #[test]
    fn test_role_rejects_unknown_values() {
        assert!(serde_json::from_value::<Role>(json!("tool")).is_err());
        assert_eq!(
            serde_json::from_value::<Role>(json!("assistant")).unwrap(),
            Role::Assistant
        );
    }

    mod groq {
        use std::time::Duration;

        use axum::{
            http::{header, HeaderMap, StatusCode},
            routing::post,
            Json, Router,
        };
        use serde_json::{json, Value};

        use super::super::*;

        /// Serves `app` on an ephemeral local port and returns its completions URL.
        async fn serve(app: Router) -> String {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
            format!("http://{addr}/openai/v1/chat/completions")
        }

        fn client(url: String, timeout: Duration) -> GroqClient {
            GroqClient::new("gsk_test".to_string(), url, timeout).unwrap()
        }

        fn request() -> CompletionRequest {
            CompletionRequest::new(vec![ChatMessage::system("sys")])
        }

        #[tokio::test]
        async fn test_sends_bearer_key_and_body() {
            let app = Router::new().route(
                "/openai/v1/chat/completions",
                post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                    let auth = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let content = format!("{auth}|{}", body["model"].as_str().unwrap_or_default());
                    Json(json!({ "choices": [{ "message": { "content": content } }] }))
                }),
            );
            let url = serve(app).await;

            let completion = client(url, Duration::from_secs(5))
                .complete(&request())
                .await
                .unwrap();

            assert_eq!(
                completion.first_content(),
                Some("Bearer gsk_test|llama-3.3-70b-versatile")
            );
        }

        #[tokio::test]
        async fn test_error_body_message_is_extracted() {
            let app = Router::new().route(
                "/openai/v1/chat/completions",
                post(|| async {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "error": { "message": "Invalid API Key" } })),
                    )
                }),
            );
            let url = serve(app).await;

            let err = client(url, Duration::from_secs(5))
                .complete(&request())
                .await
                .unwrap_err();

            match err {
                LlmError::Api { status, message } => {
                    assert_eq!(status, 401);
                    assert_eq!(message, "Invalid API Key");
                }
                other => panic!("expected API error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_unstructured_error_body_kept_raw() {
            let app = Router::new().route(
                "/openai/v1/chat/completions",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "upstream overloaded") }),
            );
            let url = serve(app).await;

            let err = client(url, Duration::from_secs(5))
                .complete(&request())
                .await
                .unwrap_err();

            assert!(
                matches!(err, LlmError::Api { status: 503, ref message } if message == "upstream overloaded"),
                "got {err:?}"
            );
        }

        #[tokio::test]
        async fn test_undecodable_success_body_is_parse_error() {
            let app = Router::new().route(
                "/openai/v1/chat/completions",
                post(|| async { "definitely not json" }),
            );
            let url = serve(app).await;

            let err = client(url, Duration::from_secs(5))
                .complete(&request())
                .await
                .unwrap_err();

            assert!(matches!(err, LlmError::Parse(_)), "got {err:?}");
        }

        #[tokio::test]
        async fn test_slow_provider_times_out() {
            let app = Router::new().route(
                "/openai/v1/chat/completions",
                post(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Json(json!({ "choices": [] }))
                }),
            );
            let url = serve(app).await;

            let err = client(url, Duration::from_millis(200))
                .complete(&request())
                .await
                .unwrap_err();

            match err {
                LlmError::Http(e) => assert!(e.is_timeout(), "got {e:?}"),
                other => panic!("expected HTTP timeout, got {other:?}"),
            }
        }
    }
}
