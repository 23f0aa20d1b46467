//! Vision model integration for image analysis

use crate::gateway::{GatewayError, VisionGateway};
use crate::ollama::{ChatMessage, ChatRequest, GenerationOptions, OllamaClient, OllamaConfig};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use core_pipeline::PreparedImage;

/// Ollama-backed vision model
pub struct VisionModel {
    client: OllamaClient,
    model_name: String,
}

impl VisionModel {
    /// Create a vision model without checking that it exists
    pub fn new(client: OllamaClient, model_name: String) -> Self {
        Self { client, model_name }
    }

    /// Connect to Ollama and make sure the configured model is installed
    ///
    /// Meant to run once at startup; callers should not serve traffic if
    /// this fails.
    pub async fn connect(config: OllamaConfig) -> Result<Self, GatewayError> {
        let model_name = config.model.clone();
        let client = OllamaClient::new(config)?;

        let details = client
            .show(&model_name)
            .await
            .map_err(|e| GatewayError::ModelUnavailable {
                model: model_name.clone(),
                reason: e.to_string(),
            })?;

        if !details.capabilities.is_empty() && !details.capabilities.iter().any(|c| c == "vision") {
            tracing::warn!(
                model = %model_name,
                capabilities = ?details.capabilities,
                "Model does not report vision capability"
            );
        }
        tracing::info!(model = %model_name, "Vision model ready");

        Ok(Self::new(client, model_name))
    }

    fn chat_request(&self, image_b64: String, prompt: &str, max_new_tokens: u32) -> ChatRequest {
        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
                images: Some(vec![image_b64]),
            }],
            stream: Some(false),
            options: Some(GenerationOptions::greedy(max_new_tokens)),
            keep_alive: self.client.config().keep_alive.clone(),
        }
    }
}

#[async_trait]
impl VisionGateway for VisionModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(
        &self,
        image: &PreparedImage,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<String, GatewayError> {
        let image_b64 = general_purpose::STANDARD.encode(image.jpeg()?);
        let request = self.chat_request(image_b64, prompt, max_new_tokens);

        let response = self.client.chat(&request).await?;
        Ok(response.message.content)
    }

    async fn clear_cache(&self) -> Result<(), GatewayError> {
        self.client.unload(&self.model_name).await?;
        tracing::info!(model = %self.model_name, "Unloaded model to free memory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(keep_alive: Option<&str>) -> VisionModel {
        let config = OllamaConfig {
            keep_alive: keep_alive.map(str::to_string),
            ..OllamaConfig::default()
        };
        VisionModel::new(OllamaClient::new(config).unwrap(), "qwen2.5vl:7b".to_string())
    }

    #[test]
    fn test_chat_request_attaches_image_and_caps_tokens() {
        let request = model(None).chat_request("aW1n".to_string(), "What is this?", 50);
        assert_eq!(request.model, "qwen2.5vl:7b");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, "What is this?");
        assert_eq!(request.messages[0].images, Some(vec!["aW1n".to_string()]));
        assert_eq!(request.options, Some(GenerationOptions::greedy(50)));
        assert_eq!(request.stream, Some(false));
    }

    #[test]
    fn test_chat_request_passes_keep_alive() {
        let request = model(Some("0")).chat_request(String::new(), "p", 1);
        assert_eq!(request.keep_alive.as_deref(), Some("0"));
    }

    #[test]
    fn test_model_name() {
        assert_eq!(model(None).model_name(), "qwen2.5vl:7b");
    }
}
