//! OpenAI-compatible chat-completions client.
//!
//! Works against any `/chat/completions` endpoint (OpenAI, vLLM, Ollama's
//! OpenAI shim). Status codes are mapped onto the pipeline's error taxonomy
//! so the retry driver can tell a rate limit from a bad request.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use slidecraft_core::{Prompt, SlidecraftError, TextGenerator};

use crate::config::LlmSettings;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionsClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(settings: &LlmSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", settings.api_base.trim_end_matches('/')),
            model: settings.model.clone(),
            temperature: settings.temperature,
            api_key: settings.api_key(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &Prompt) -> slidecraft_core::Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(
            task = prompt.task.as_str(),
            slide = ?prompt.slide_number,
            "POST {}",
            self.endpoint
        );
        let resp = request
            .send()
            .await
            .map_err(|e| SlidecraftError::TransientProvider(format!("request failed: {}", e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| SlidecraftError::TransientProvider(format!("reading body failed: {}", e)))?;

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }
        extract_content(&text)
    }
}

/// Rate limits and server errors are retried with backoff. Anything else
/// is a configuration problem the retry budget cannot fix.
pub fn classify_status(status: StatusCode, body: &str) -> SlidecraftError {
    let detail = format!("{} {}", status.as_u16(), truncate(body, 200));
    if status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
    {
        SlidecraftError::TransientProvider(detail)
    } else {
        SlidecraftError::Validation(format!("provider rejected request: {}", detail))
    }
}

/// Pull the first choice's text out of a completion body.
pub fn extract_content(body: &str) -> slidecraft_core::Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)?;
    match parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
    {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(SlidecraftError::TransientProvider(
            "completion had no content".to_string(),
        )),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_and_5xx_are_transient() {
        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = classify_status(status, "busy");
            assert!(err.is_recoverable(), "{} should be retried", status);
            assert!(err.needs_backoff());
        }
    }

    #[test]
    fn client_errors_are_fatal() {
        let err = classify_status(StatusCode::UNAUTHORIZED, r#"{"error":"bad key"}"#);
        assert!(matches!(err, SlidecraftError::Validation(_)));
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn extracts_first_choice() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"ideas\":[]}"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), r#"{"ideas":[]}"#);
    }

    #[test]
    fn empty_or_missing_content_is_transient() {
        let empty = r#"{"choices":[{"message":{"role":"assistant","content":"  "}}]}"#;
        assert!(matches!(
            extract_content(empty),
            Err(SlidecraftError::TransientProvider(_))
        ));
        assert!(matches!(
            extract_content(r#"{"choices":[]}"#),
            Err(SlidecraftError::TransientProvider(_))
        ));
        assert!(matches!(
            extract_content("not json"),
            Err(SlidecraftError::Serialization(_))
        ));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let settings = LlmSettings {
            api_base: "http://localhost:11434/v1/".to_string(),
            ..LlmSettings::default()
        };
        let client = ChatCompletionsClient::new(&settings).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(client.name(), "gpt-4o-mini");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ação", 2), "aç");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
