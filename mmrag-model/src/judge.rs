//! Vision judge client.

use async_trait::async_trait;
use mmrag_eval::{
    EvaluationRequest, EvaluationResponses, Evaluator, EvaluatorError, JudgeResponse, Metric,
};
use mmrag_telemetry::{Instrument, debug, judge_call_span};
use reqwest::Client;
use std::time::Duration;

use crate::config::JudgeConfig;
use crate::convert::{ChatCompletionRequest, ChatCompletionResponse, strip_code_fence};
use crate::prompt::build_messages;
use crate::retry::{RetryConfig, retry_judge_call};

/// Judge backed by a vision-language model behind an OpenAI-compatible
/// chat completions API.
///
/// Each requested metric is graded by its own request; the answers are
/// returned as [`JudgeResponse::Text`] for the row evaluator to parse.
///
/// # Example
///
/// ```rust,ignore
/// use mmrag_model::{JudgeConfig, VisionJudge};
///
/// let judge = VisionJudge::new(JudgeConfig::gpt4o(
///     std::env::var("OPENAI_API_KEY").unwrap()
/// ))?;
/// ```
pub struct VisionJudge {
    client: Client,
    config: JudgeConfig,
    retry_config: RetryConfig,
}

impl VisionJudge {
    /// Create a new judge.
    pub fn new(config: JudgeConfig) -> Result<Self, EvaluatorError> {
        if config.model.trim().is_empty() {
            return Err(EvaluatorError::Config("model name must not be empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EvaluatorError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config, retry_config: RetryConfig::default() })
    }

    /// GPT-4o on the OpenAI API.
    pub fn gpt4o(api_key: impl Into<String>) -> Result<Self, EvaluatorError> {
        Self::new(JudgeConfig::gpt4o(api_key))
    }

    /// LLaVA on a local Ollama server.
    pub fn llava_ollama() -> Result<Self, EvaluatorError> {
        Self::new(JudgeConfig::llava_ollama())
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    fn build_request(&self, metric: Metric, request: &EvaluationRequest<'_>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: build_messages(metric, request),
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        }
    }

    /// Grade a single metric and return the judge's raw answer.
    async fn grade_metric(
        &self,
        metric: Metric,
        request: &EvaluationRequest<'_>,
    ) -> Result<String, EvaluatorError> {
        let api_url = self.config.chat_completions_url();
        let chat_request = self.build_request(metric, request);

        let response = retry_judge_call(&self.retry_config, || {
            let mut builder = self.client.post(&api_url).json(&chat_request);
            if !self.config.api_key.is_empty() {
                builder = builder.bearer_auth(&self.config.api_key);
            }
            async move {
                let response = builder.send().await.map_err(|e| {
                    EvaluatorError::Request(format!("judge API request failed: {}", e))
                })?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(EvaluatorError::Status { status: status.as_u16(), body });
                }

                response.json::<ChatCompletionResponse>().await.map_err(|e| {
                    EvaluatorError::Request(format!("failed to decode judge response: {}", e))
                })
            }
        })
        .await?;

        let text = response.first_text().ok_or(EvaluatorError::EmptyResponse)?;
        Ok(strip_code_fence(text).to_string())
    }
}

#[async_trait]
impl Evaluator for VisionJudge {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn evaluate(
        &self,
        request: &EvaluationRequest<'_>,
    ) -> Result<EvaluationResponses, EvaluatorError> {
        let mut responses = EvaluationResponses::with_capacity(request.metrics.len());
        for metric in request.metrics {
            let text = self
                .grade_metric(*metric, request)
                .instrument(judge_call_span(&self.config.model, metric.name()))
                .await?;
            debug!(metric = %metric, response = %text, "judge answered");
            responses.insert(*metric, JudgeResponse::text(text));
        }
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::MessageContent;
    use mmrag_eval::Example;

    #[test]
    fn test_rejects_empty_model() {
        let err = VisionJudge::new(JudgeConfig::new("key", " ")).err();
        assert!(matches!(err, Some(EvaluatorError::Config(_))));
    }

    #[test]
    fn test_build_request_uses_config() {
        let judge = VisionJudge::new(
            JudgeConfig::gpt4o("key").with_temperature(0.2).with_max_tokens(128),
        )
        .unwrap();
        let example = Example::new("q", "g", "r").with_image("aW1n");
        let metrics = [Metric::ImageContextRelevancy];
        let request = EvaluationRequest::new(&metrics, &example);

        let chat = judge.build_request(Metric::ImageContextRelevancy, &request);
        assert_eq!(chat.model, "gpt-4o");
        assert_eq!(chat.temperature, Some(0.2));
        assert_eq!(chat.max_tokens, Some(128));
        assert_eq!(chat.messages.len(), 2);
        assert!(matches!(chat.messages[1].content, MessageContent::Parts(ref parts) if parts.len() == 3));
    }

    #[test]
    fn test_name_is_model() {
        let judge = VisionJudge::llava_ollama().unwrap();
        assert_eq!(judge.name(), "llava");
        assert_eq!(judge.retry_config(), &RetryConfig::default());
    }
}
