//! Retry policy for judge requests
//!
//! Only transient failures are retried: rate limiting, gateway and server
//! errors, and transport failures such as timeouts or refused connections.
//! Everything else reaches the row immediately.

use mmrag_eval::EvaluatorError;
use std::{future::Future, time::Duration};

/// Statuses a judge endpoint returns while overloaded or restarting
pub const TRANSIENT_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

const TRANSIENT_MESSAGES: [&str; 7] = [
    "RATE LIMIT",
    "TOO MANY REQUESTS",
    "UNAVAILABLE",
    "TIMEOUT",
    "TIMED OUT",
    "CONNECTION RESET",
    "CONNECTION REFUSED",
];

/// Backoff settings for judge requests
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    pub enabled: bool,
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Growth factor between consecutive delays, values below 1 act as 1
    pub backoff_multiplier: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Send every judge request exactly once
    #[must_use]
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Pause before retry number `retry` (1-based), capped at `max_delay`
    pub fn delay_before(&self, retry: u32) -> Duration {
        let multiplier = f64::from(self.backoff_multiplier.max(1.0));
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let seconds = self.initial_delay.as_secs_f64() * multiplier.powi(exponent);
        let cap = self.max_delay.as_secs_f64();
        if !seconds.is_finite() || seconds >= cap {
            return self.max_delay;
        }
        Duration::from_secs_f64(seconds)
    }
}

/// Whether another attempt at the judge call could succeed
#[must_use]
pub fn is_transient(error: &EvaluatorError) -> bool {
    match error {
        EvaluatorError::Status { status, .. } => TRANSIENT_STATUSES.contains(status),
        EvaluatorError::Request(message) => {
            let normalized = message.to_ascii_uppercase();
            TRANSIENT_MESSAGES.iter().any(|needle| normalized.contains(needle))
        }
        _ => false,
    }
}

/// Run `call`, retrying transient failures per `retry_config`
pub async fn retry_judge_call<T, Call, Fut>(
    retry_config: &RetryConfig,
    mut call: Call,
) -> Result<T, EvaluatorError>
where
    Call: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EvaluatorError>>,
{
    if !retry_config.enabled {
        return call().await;
    }

    let mut retry: u32 = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(error) if retry < retry_config.max_retries && is_transient(&error) => {
                retry += 1;
                let delay = retry_config.delay_before(retry);
                mmrag_telemetry::warn!(
                    retry,
                    max_retries = retry_config.max_retries,
                    delay_ms = delay.as_millis(),
                    error = %error,
                    "Judge request failed with a transient error; retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
