//! Ollama HTTP API client

use crate::gateway::GatewayError;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Configuration for Ollama client
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL for Ollama API (default: http://localhost:11434)
    pub base_url: String,
    /// Vision model to use (default: qwen2.5vl:7b)
    pub model: String,
    /// Timeout in seconds (default: 300)
    pub timeout_secs: u64,
    /// How long Ollama keeps the model loaded after a request, e.g. "5m" or "0"
    pub keep_alive: Option<String>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5vl:7b".to_string(),
            timeout_secs: 300,
            keep_alive: None,
        }
    }
}

impl OllamaConfig {
    /// Create config from environment variables, falling back to defaults
    ///
    /// Reads `OLLAMA_URL`, `DOCSCAN_MODEL`, `OLLAMA_TIMEOUT_SECS` and `OLLAMA_KEEP_ALIVE`.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var("DOCSCAN_MODEL") {
            config.model = model;
        }
        if let Ok(timeout) = std::env::var("OLLAMA_TIMEOUT_SECS") {
            config.timeout_secs = timeout
                .parse()
                .with_context(|| format!("OLLAMA_TIMEOUT_SECS is not a number: {}", timeout))?;
        }
        if let Ok(keep_alive) = std::env::var("OLLAMA_KEEP_ALIVE") {
            config.keep_alive = Some(keep_alive);
        }
        Ok(config)
    }
}

/// Ollama API client
pub struct OllamaClient {
    config: OllamaConfig,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: OllamaConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status, body });
        }
        Ok(response)
    }

    /// Send a chat request to Ollama
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        let response = self.post("/api/chat", request).await?;
        Ok(response.json().await?)
    }

    /// Fetch model details; fails if the model is not installed
    pub async fn show(&self, model: &str) -> Result<ShowResponse, GatewayError> {
        let response = self.post("/api/show", &ModelRequest::new(model)).await?;
        Ok(response.json().await?)
    }

    /// Unload a model, freeing the memory it holds
    pub async fn unload(&self, model: &str) -> Result<(), GatewayError> {
        let request = ModelRequest {
            keep_alive: Some(serde_json::Value::from(0)),
            ..ModelRequest::new(model)
        };
        self.post("/api/generate", &request).await?;
        Ok(())
    }
}

/// Chat request to Ollama
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerationOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

/// A chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    /// Base64-encoded images attached to the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// Sampling options understood by Ollama
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl GenerationOptions {
    /// Greedy decoding capped at `max_new_tokens`
    pub fn greedy(max_new_tokens: u32) -> Self {
        Self {
            num_predict: Some(max_new_tokens),
            temperature: Some(0.0),
            top_k: Some(1),
            seed: Some(0),
        }
    }
}

/// Chat response from Ollama
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    pub message: ChatMessage,
    pub done: bool,
}

/// Body for endpoints that only name a model
#[derive(Debug, Clone, Serialize)]
struct ModelRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<serde_json::Value>,
}

impl ModelRequest {
    fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            keep_alive: None,
        }
    }
}

/// Subset of `/api/show` we read
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowResponse {
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_config_default() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "qwen2.5vl:7b");
        assert_eq!(config.timeout_secs, 300);
        assert!(config.keep_alive.is_none());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = OllamaClient::new(OllamaConfig {
            base_url: "http://gpu-box:11434/".to_string(),
            ..OllamaConfig::default()
        })
        .unwrap();
        assert_eq!(client.url("/api/chat"), "http://gpu-box:11434/api/chat");
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "qwen2.5vl:7b".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
                images: Some(vec!["aGVsbG8=".to_string()]),
            }],
            stream: Some(false),
            options: Some(GenerationOptions::greedy(512)),
            keep_alive: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "qwen2.5vl:7b");
        assert_eq!(json["messages"][0]["images"][0], "aGVsbG8=");
        assert_eq!(json["options"]["num_predict"], 512);
        assert_eq!(json["options"]["temperature"], 0.0);
        assert_eq!(json["options"]["top_k"], 1);
        assert!(json.get("keep_alive").is_none());
    }

    #[test]
    fn test_chat_response_without_images() {
        let json = r#"{"model":"m","message":{"role":"assistant","content":"ID FRONT"},"done":true}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.message.content, "ID FRONT");
        assert!(response.message.images.is_none());
    }

    #[test]
    fn test_unload_request_shape() {
        let request = ModelRequest {
            keep_alive: Some(serde_json::Value::from(0)),
            ..ModelRequest::new("qwen2.5vl:7b")
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"model": "qwen2.5vl:7b", "keep_alive": 0}));
    }
}
