//! Extraction orchestration
//!
//! classify (only when no prompt was given) -> pick prompt -> generate ->
//! format -> store. Every gateway call made for one extraction happens
//! under a single lock, so at most one inference runs at a time.

use crate::classifier::DocumentClassifier;
use crate::gateway::{GatewayError, VisionGateway};
use core_pipeline::prompts::EXTRACT_MAX_TOKENS;
use core_pipeline::{
    format_text, ExtractedResult, ExtractionId, PreparedImage, ResultRecord, ResultStore,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The extraction call to the model failed
    #[error("{source}")]
    Generation {
        id: ExtractionId,
        prompt_used: String,
        #[source]
        source: GatewayError,
    },
}

/// Runs extractions against one shared model
pub struct Extractor {
    gateway: Arc<dyn VisionGateway>,
    classifier: DocumentClassifier,
    store: Arc<ResultStore>,
    inference: Mutex<()>,
    release_after_call: bool,
}

impl Extractor {
    pub fn new(gateway: Arc<dyn VisionGateway>, store: Arc<ResultStore>) -> Self {
        Self {
            gateway,
            classifier: DocumentClassifier::new(),
            store,
            inference: Mutex::new(()),
            release_after_call: false,
        }
    }

    /// Free model memory after every extraction, not only after failures
    pub fn release_after_call(mut self, release: bool) -> Self {
        self.release_after_call = release;
        self
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    pub fn model_name(&self) -> &str {
        self.gateway.model_name()
    }

    /// Extract text from `image`
    ///
    /// A blank or missing `user_prompt` triggers classification first. The
    /// chosen prompt is stored as soon as it is known, so a failed
    /// generation still leaves `{prompt_used}` behind for download.
    pub async fn extract(
        &self,
        image: &PreparedImage,
        user_prompt: Option<&str>,
    ) -> Result<ExtractedResult, ExtractError> {
        let id = ExtractionId::new();
        let started = Instant::now();
        let _inference = self.inference.lock().await;

        let (prompt, category) = match user_prompt.filter(|p| !p.trim().is_empty()) {
            Some(prompt) => (prompt.to_string(), None),
            None => {
                let classification = self.classifier.classify(self.gateway.as_ref(), image).await;
                (
                    classification.prompt().to_string(),
                    Some(classification.category()),
                )
            }
        };
        self.store.put(id, ResultRecord::attempted(prompt.clone()));

        let raw = match self
            .gateway
            .generate(image, &prompt, EXTRACT_MAX_TOKENS)
            .await
        {
            Ok(raw) => raw,
            Err(source) => {
                tracing::error!(%id, error = %source, "Extraction failed");
                self.release_memory().await;
                return Err(ExtractError::Generation {
                    id,
                    prompt_used: prompt,
                    source,
                });
            }
        };
        if self.release_after_call {
            self.release_memory().await;
        }

        let formatted = format_text(&raw);
        let result = ExtractedResult {
            id,
            raw_text: raw.trim().to_string(),
            html: formatted.html,
            structured_data: formatted.structured,
            document_type: formatted.layout.as_str().to_string(),
            prompt_used: prompt,
            category,
            image_sha256: image.content_hash(),
        };
        self.store.put(id, ResultRecord::from(&result));

        tracing::info!(
            %id,
            category = ?result.category,
            document_type = %result.document_type,
            prompt_len = result.prompt_used.len(),
            output_len = result.raw_text.len(),
            fields = result.structured_data.len(),
            elapsed_ms = %started.elapsed().as_millis(),
            "Extraction complete"
        );
        Ok(result)
    }

    /// Release model memory, waiting for any running inference to finish
    pub async fn clear_cache(&self) -> Result<(), GatewayError> {
        let _inference = self.inference.lock().await;
        self.gateway.clear_cache().await
    }

    async fn release_memory(&self) {
        if let Err(e) = self.gateway.clear_cache().await {
            tracing::warn!(error = %e, "Failed to release model memory");
        }
    }
}
