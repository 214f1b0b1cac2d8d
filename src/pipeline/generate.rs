//! Text generation client for the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::error::GenerationError;

/// Produces raw Manim source text for a prompt.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    /// Every request is bounded by `config.generation_timeout`.
    pub fn new(config: &Config) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.generation_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ScriptGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = response_text(&payload);
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        tracing::debug!(model = %self.model, chars = text.len(), "Received model response");
        Ok(text)
    }
}

fn response_text(payload: &GenerateContentResponse) -> String {
    payload
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode, Uri},
        response::IntoResponse,
        Json, Router,
    };
    use serde_json::Value;

    #[derive(Debug, Clone)]
    struct SeenRequest {
        path: String,
        api_key: Option<String>,
        body: Value,
    }

    #[derive(Clone)]
    struct FakeGemini {
        status: StatusCode,
        reply: Value,
        delay: Duration,
        seen: Arc<Mutex<Vec<SeenRequest>>>,
    }

    async fn answer(
        State(fake): State<FakeGemini>,
        uri: Uri,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> impl IntoResponse {
        fake.seen.lock().unwrap().push(SeenRequest {
            path: uri.path().to_string(),
            api_key: headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
        });
        tokio::time::sleep(fake.delay).await;
        (fake.status, Json(fake.reply.clone()))
    }

    /// Serves `reply` with `status` on an ephemeral port and returns a client
    /// configured against it.
    async fn client_for(
        status: StatusCode,
        reply: Value,
        delay: Duration,
        timeout: Duration,
    ) -> (GeminiClient, Arc<Mutex<Vec<SeenRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let fake = FakeGemini {
            status,
            reply,
            delay,
            seen: seen.clone(),
        };
        let app = Router::new().fallback(answer).with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut config = Config::default();
        config.api_key = "secret-key".to_string();
        config.gemini_base_url = format!("http://{addr}/v1beta");
        config.generation_timeout = timeout;
        (GeminiClient::new(&config).unwrap(), seen)
    }

    async fn client_replying(
        status: StatusCode,
        reply: Value,
    ) -> (GeminiClient, Arc<Mutex<Vec<SeenRequest>>>) {
        client_for(status, reply, Duration::ZERO, Duration::from_secs(5)).await
    }

    #[tokio::test]
    async fn successful_call_returns_text_and_sends_key() {
        let (client, seen) = client_replying(
            StatusCode::OK,
            json!({
                "candidates": [{ "content": { "parts": [{ "text": "class A(Scene):" }] } }]
            }),
        )
        .await;

        let text = client.generate("draw a circle").await.unwrap();
        assert_eq!(text, "class A(Scene):");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "/v1beta/models/gemini-2.0-flash:generateContent");
        assert_eq!(seen[0].api_key.as_deref(), Some("secret-key"));
        assert_eq!(
            seen[0].body["contents"][0]["parts"][0]["text"],
            Value::from("draw a circle")
        );
    }

    #[tokio::test]
    async fn error_status_maps_to_api_error() {
        let (client, _) = client_replying(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": { "status": "RESOURCE_EXHAUSTED" } }),
        )
        .await;

        match client.generate("draw a circle").await.unwrap_err() {
            GenerationError::Api { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("RESOURCE_EXHAUSTED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_or_blank_text_is_empty_response() {
        for reply in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "  \n" }] } }] }),
        ] {
            let (client, _) = client_replying(StatusCode::OK, reply).await;
            let err = client.generate("draw a circle").await.unwrap_err();
            assert!(matches!(err, GenerationError::EmptyResponse), "{err:?}");
        }
    }

    #[tokio::test]
    async fn stalled_model_call_times_out() {
        let (client, _) = client_for(
            StatusCode::OK,
            json!({ "candidates": [] }),
            Duration::from_secs(3),
            Duration::from_millis(300),
        )
        .await;

        let err = client.generate("draw a circle").await.unwrap_err();
        match err {
            GenerationError::Request(err) => assert!(err.is_timeout(), "{err:?}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let payload: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "class A" }, { "text": "(Scene):" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response_text(&payload), "class A(Scene):");
    }

    #[test]
    fn blocked_response_has_no_text() {
        let payload: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert_eq!(response_text(&payload), "");
    }
}
