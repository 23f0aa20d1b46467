//! In-memory gateway for tests

use crate::gateway::{GatewayError, VisionGateway};
use async_trait::async_trait;
use core_pipeline::PreparedImage;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// One recorded `generate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub max_new_tokens: u32,
}

/// Gateway that replays scripted replies in order
///
/// Each `generate` call pops the next reply. When the script runs out, the
/// call fails.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
    cache_clears: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failing reply
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    fn push(&self, reply: Result<String, String>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn cache_clears(&self) -> usize {
        self.cache_clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionGateway for ScriptedGateway {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        _image: &PreparedImage,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                prompt: prompt.to_string(),
                max_new_tokens,
            });

        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(GatewayError::Other(message)),
            None => Err(GatewayError::Other("no scripted reply left".to_string())),
        }
    }

    async fn clear_cache(&self) -> Result<(), GatewayError> {
        self.cache_clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
