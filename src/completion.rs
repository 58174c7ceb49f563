use crate::cache::{CacheKey, ReplyCache};
use crate::config::ApiKey;
use crate::conversation::Turn;
use crate::error::CompletionError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const OPENROUTER_CHAT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const APP_TITLE: &str = "Multi-Model Chatbot";
pub const TEMPERATURE: f64 = 0.7;

/// Fully prepared HTTP POST, independent of any HTTP library.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl OutboundRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Whatever came back over the wire, successful status or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request did not yield a complete response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportFailure(pub String);

/// Sends a prepared request and waits for the reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<HttpReply, TransportFailure>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn send(&self, request: &OutboundRequest) -> Result<HttpReply, TransportFailure> {
        (**self).send(request).await
    }
}

/// reqwest-backed transport. No timeout is configured: a hung gateway hangs the caller.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ChatTransport for ReqwestTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<HttpReply, TransportFailure> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| TransportFailure(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportFailure(format!("failed to read response body: {}", e)))?;

        Ok(HttpReply {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Turns a (model id, transcript) pair into a single reply string.
///
/// Successful replies are memoized by content hash, so repeating the exact
/// same pair does not touch the network while any transcript change does.
pub struct CompletionClient {
    api_key: ApiKey,
    transport: Box<dyn ChatTransport>,
    cache: ReplyCache,
}

impl CompletionClient {
    pub fn new(api_key: &ApiKey, transport: Box<dyn ChatTransport>, cache: ReplyCache) -> Self {
        Self {
            api_key: api_key.clone(),
            transport,
            cache,
        }
    }

    /// Client talking to OpenRouter over reqwest
    pub fn openrouter(api_key: &ApiKey, cache_capacity: usize) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::new(api_key, Box::new(transport), ReplyCache::new(cache_capacity)))
    }

    pub fn build_request(&self, model_id: &str, turns: &[Turn]) -> OutboundRequest {
        let payload = ChatRequest {
            model: model_id,
            messages: turns,
            temperature: TEMPERATURE,
        };

        OutboundRequest {
            url: OPENROUTER_CHAT_URL.to_string(),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", self.api_key.expose())),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("X-Title".to_string(), APP_TITLE.to_string()),
            ],
            body: serde_json::to_string(&payload).unwrap_or_default(),
        }
    }

    /// Like [`complete`](Self::complete), but keeps the failure typed.
    pub async fn try_complete(
        &mut self,
        model_id: &str,
        turns: &[Turn],
    ) -> Result<String, CompletionError> {
        let key = CacheKey::new(model_id, turns);
        if let Some(reply) = self.cache.get(&key) {
            tracing::debug!(model = model_id, key = key.as_str(), "reply served from cache");
            return Ok(reply);
        }

        let request = self.build_request(model_id, turns);
        tracing::info!(model = model_id, turns = turns.len(), "requesting completion");

        let reply = self
            .transport
            .send(&request)
            .await
            .map_err(|failure| CompletionError::NoResponse {
                url: request.url.clone(),
                details: failure.to_string(),
            })?;

        if !reply.is_success() {
            return Err(CompletionError::Status {
                status: reply.status,
                reason: reply.reason,
                url: request.url,
                body: reply.body,
            });
        }

        let content = parse_reply(&reply.body)?;
        self.cache.insert(key, content.clone());
        Ok(content)
    }

    /// Returns the reply text, or the error text in its place. Never fails.
    pub async fn complete(&mut self, model_id: &str, turns: &[Turn]) -> String {
        match self.try_complete(model_id, turns).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(model = model_id, error = ?err, "completion failed");
                err.to_string()
            }
        }
    }
}

fn parse_reply(body: &str) -> Result<String, CompletionError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|_| CompletionError::ResponseFormat)?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(CompletionError::ResponseFormat)
}
