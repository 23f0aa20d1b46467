//! Document classification
//!
//! Asks the model what kind of document it is looking at and maps the
//! free-text answer onto a [`DocumentCategory`]. Classification is
//! best-effort: a failed call yields [`Classification::Fallback`] instead of
//! an error, and extraction carries on with a generic prompt.

use crate::gateway::VisionGateway;
use core_pipeline::prompts::{self, CLASSIFY_MAX_TOKENS, CLASSIFY_PROMPT, FALLBACK_PROMPT};
use core_pipeline::{DocumentCategory, PreparedImage};

/// Outcome of classifying one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The model answered; `answer` is the lower-cased, trimmed reply
    Detected {
        category: DocumentCategory,
        answer: String,
    },
    /// The classification call failed
    Fallback { reason: String },
}

impl Classification {
    /// Category to report; a fallback counts as `Unknown`
    pub fn category(&self) -> DocumentCategory {
        match self {
            Classification::Detected { category, .. } => *category,
            Classification::Fallback { .. } => DocumentCategory::Unknown,
        }
    }

    /// Extraction prompt to use after this classification
    pub fn prompt(&self) -> &'static str {
        match self {
            Classification::Detected { category, .. } => prompts::prompt_for(*category),
            Classification::Fallback { .. } => FALLBACK_PROMPT,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentClassifier;

impl DocumentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub async fn classify(
        &self,
        gateway: &dyn VisionGateway,
        image: &PreparedImage,
    ) -> Classification {
        match gateway
            .generate(image, CLASSIFY_PROMPT, CLASSIFY_MAX_TOKENS)
            .await
        {
            Ok(reply) => {
                let answer = reply.trim().to_lowercase();
                let category = DocumentCategory::from_answer(&answer);
                tracing::debug!(%category, answer = %answer, "Classified document");
                Classification::Detected { category, answer }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Document analysis failed, using default prompt");
                Classification::Fallback {
                    reason: e.to_string(),
                }
            }
        }
    }
}
