use std::env;
use std::future::Future;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

use super::prompt::PitchRequest;
use super::PitchOutcome;

/// Outbound text-generation capability; failures are folded into the outcome.
pub trait PitchGenerator: Send + Sync {
    fn generate(&self, request: &PitchRequest) -> impl Future<Output = PitchOutcome> + Send;
}

/// Settings for the completion API call.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchConfig {
    pub enabled: bool,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// Environment variable holding the API credential, read on every call.
    pub api_key_env: String,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo-instruct".to_string(),
            max_tokens: 80,
            timeout: Duration::from_secs(30),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PitchError {
    #[error("{0} is not set")]
    MissingCredential(String),
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("completion response has no choices[0].text")]
    Malformed,
    #[error("completion response text is empty")]
    Empty,
}

/// Completion API client issuing one request per pitch, without retries.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    config: PitchConfig,
    http: reqwest::Client,
}

impl CompletionClient {
    pub fn new(config: PitchConfig) -> Result<Self, PitchError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &PitchConfig {
        &self.config
    }

    async fn complete(&self, prompt: &str) -> Result<String, PitchError> {
        let api_key = env::var(&self.config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| PitchError::MissingCredential(self.config.api_key_env.clone()))?;

        let payload = json!({
            "model": self.config.model,
            "prompt": prompt,
            "max_tokens": self.config.max_tokens,
        });

        let response = self
            .http
            .post(format!(
                "{}/completions",
                self.config.api_base.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PitchError::Status { status, body });
        }

        let body: Value = response.json().await?;
        let text = body["choices"][0]["text"]
            .as_str()
            .ok_or(PitchError::Malformed)?
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(PitchError::Empty);
        }
        Ok(text)
    }
}

impl PitchGenerator for CompletionClient {
    async fn generate(&self, request: &PitchRequest) -> PitchOutcome {
        if !self.config.enabled {
            return PitchOutcome::Disabled;
        }

        match self.complete(&request.prompt()).await {
            Ok(text) => {
                debug!(chars = text.len(), "sales pitch generated");
                PitchOutcome::Generated(text)
            }
            Err(err) => {
                warn!(error = %err, "sales pitch unavailable");
                PitchOutcome::Unavailable(err.to_string())
            }
        }
    }
}
