//! Server configuration

use clap::Parser;
use core_pipeline::store::DEFAULT_CAPACITY;
use llm_bridge::OllamaConfig;
use std::path::PathBuf;

/// Default upload limit (20 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Parser)]
#[command(name = "docscan-server")]
#[command(about = "Extract text from uploaded images with a vision-language model", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "DOCSCAN_BIND", default_value = "127.0.0.1:8000")]
    pub bind: String,

    /// Base URL of the Ollama server
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Vision model to load
    #[arg(long, env = "DOCSCAN_MODEL", default_value = "qwen2.5vl:7b")]
    pub model: String,

    /// Timeout for a single model call, in seconds
    #[arg(long, env = "OLLAMA_TIMEOUT_SECS", default_value_t = 300)]
    pub timeout_secs: u64,

    /// Keep-alive passed to Ollama with each request (e.g. "5m", "0")
    #[arg(long, env = "OLLAMA_KEEP_ALIVE")]
    pub keep_alive: Option<String>,

    /// Directory holding the built frontend
    #[arg(long, env = "DOCSCAN_STATIC_DIR", default_value = "crates/yew_frontend/dist")]
    pub static_dir: PathBuf,

    /// Largest accepted upload, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Number of extraction results kept for download
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub result_capacity: usize,

    /// Unload the model after every extraction
    #[arg(long)]
    pub release_after_call: bool,
}

impl ServerConfig {
    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.ollama_url.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
            keep_alive: self.keep_alive.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "docscan-server",
            "--bind",
            "0.0.0.0:9000",
            "--model",
            "llava:13b",
            "--timeout-secs",
            "60",
            "--keep-alive",
            "0",
            "--result-capacity",
            "8",
            "--release-after-call",
        ])
        .unwrap();

        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.result_capacity, 8);
        assert!(config.release_after_call);

        let ollama = config.ollama_config();
        assert_eq!(ollama.model, "llava:13b");
        assert_eq!(ollama.timeout_secs, 60);
        assert_eq!(ollama.keep_alive.as_deref(), Some("0"));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let result = ServerConfig::try_parse_from(["docscan-server", "--timeout-secs", "soon"]);
        assert!(result.is_err());
    }
}
