//! LLM Bridge for Ollama integration
//!
//! Provides the model side of docscan: the [`VisionGateway`] seam, its
//! Ollama implementation, document classification, and the extraction
//! orchestrator that ties them to the core pipeline.
//!
//! Copyright (c) 2025 Michael A Wright

pub mod classifier;
pub mod extractor;
pub mod gateway;
pub mod mock;
pub mod ollama;
pub mod vision;

pub use classifier::{Classification, DocumentClassifier};
pub use extractor::{ExtractError, Extractor};
pub use gateway::{GatewayError, VisionGateway};
pub use ollama::{OllamaClient, OllamaConfig};
pub use vision::VisionModel;
