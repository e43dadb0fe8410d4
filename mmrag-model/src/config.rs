//! Configuration types for the vision judge.

use serde::{Deserialize, Serialize};

/// Default chat completions base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Base URL of a local Ollama server's OpenAI-compatible endpoint.
pub const OLLAMA_API_BASE: &str = "http://localhost:11434/v1";

/// Configuration for a judge model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// API key sent as a bearer token. Empty means no `Authorization` header.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Sampling temperature, low for consistent grading.
    pub temperature: f32,
    /// Maximum tokens for the judge's answer.
    pub max_tokens: u32,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o".to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
            temperature: 0.0,
            max_tokens: 512,
            timeout_secs: 120,
        }
    }
}

impl JudgeConfig {
    /// Create a new config with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: model.into(), ..Default::default() }
    }

    /// GPT-4o on the OpenAI API.
    pub fn gpt4o(api_key: impl Into<String>) -> Self {
        Self::new(api_key, "gpt-4o")
    }

    /// LLaVA served by a local Ollama instance.
    pub fn llava_ollama() -> Self {
        Self::new("", "llava").with_base_url(OLLAMA_API_BASE)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// URL of the chat completions endpoint.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = JudgeConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_presets() {
        let config = JudgeConfig::gpt4o("sk-test");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key, "sk-test");

        let config = JudgeConfig::llava_ollama();
        assert_eq!(config.model, "llava");
        assert!(config.api_key.is_empty());
        assert_eq!(config.chat_completions_url(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_partial_toml_like_input_keeps_defaults() {
        let config: JudgeConfig = serde_json::from_str(r#"{"model": "llava:13b"}"#).unwrap();
        assert_eq!(config.model, "llava:13b");
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.max_tokens, 512);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = JudgeConfig::default().with_base_url("http://127.0.0.1:8080/v1/");
        assert_eq!(config.chat_completions_url(), "http://127.0.0.1:8080/v1/chat/completions");
    }
}
