// ABOUTME: LanguageModel - a client paired with the settings used to call it.
// ABOUTME: Provides the single prompt-in, text-out operation agents rely on.

use std::fmt;
use std::sync::Arc;

use super::{LlmClient, Message, Request};
use crate::error::LlmError;

/// Settings applied to every request made through a [`LanguageModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Provider model name (e.g. "gpt-4o-mini", "claude-3-haiku-20240307").
    pub model: String,

    /// Maximum tokens to generate. Providers apply their own default when unset.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f64>,

    /// Optional system prompt sent with every request.
    pub system_prompt: Option<String>,
}

impl ModelConfig {
    /// Create a config for the given model name.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: None,
            temperature: None,
            system_prompt: None,
        }
    }
}

/// A language model handle: a shared client plus its request settings.
///
/// Cloning is cheap; clones share the underlying client.
#[derive(Clone)]
pub struct LanguageModel {
    client: Arc<dyn LlmClient>,
    config: ModelConfig,
}

impl LanguageModel {
    /// Create a handle for `model` served by `client`.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            config: ModelConfig::new(model),
        }
    }

    /// Create a handle from a full config.
    pub fn with_config(client: Arc<dyn LlmClient>, config: ModelConfig) -> Self {
        Self { client, config }
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Set the system prompt.
    pub fn system_prompt(mut self, system: impl Into<String>) -> Self {
        self.config.system_prompt = Some(system.into());
        self
    }

    /// The request settings.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Build the request sent for `prompt`.
    pub fn request(&self, prompt: &str) -> Request {
        let mut request = Request::new(&self.config.model).message(Message::user(prompt));
        if let Some(system) = &self.config.system_prompt {
            request = request.system(system);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            request = request.max_tokens(max_tokens);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.temperature(temperature);
        }
        request
    }

    /// Send `prompt` as a single user message and return the generated text.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.client.create_message(&self.request(prompt)).await?;
        if response.is_truncated() {
            tracing::debug!(model = %self.config.model, "response truncated at max_tokens");
        }
        Ok(response.text)
    }
}

impl fmt::Debug for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageModel")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Response;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingClient {
        requests: Mutex<Vec<Request>>,
    }

    #[async_trait]
    impl LlmClient for RecordingClient {
        async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
            self.requests.lock().unwrap().push(req.clone());
            Ok(Response::from_text(&req.model, "generated"))
        }
    }

    #[test]
    fn test_request_carries_config() {
        let client = Arc::new(RecordingClient {
            requests: Mutex::new(Vec::new()),
        });
        let model = LanguageModel::new(client, "gpt-4o-mini")
            .max_tokens(2000)
            .temperature(0.7)
            .system_prompt("Be concise");

        let req = model.request("Hello");
        assert_eq!(req.model, "gpt-4o-mini");
        assert_eq!(req.max_tokens, Some(2000));
        assert_eq!(req.temperature, Some(0.7));
        assert_eq!(req.system.as_deref(), Some("Be concise"));
        assert_eq!(req.messages, vec![Message::user("Hello")]);
    }

    #[tokio::test]
    async fn test_generate_returns_text() {
        let client = Arc::new(RecordingClient {
            requests: Mutex::new(Vec::new()),
        });
        let model = LanguageModel::new(client.clone(), "m");

        let text = model.generate("prompt").await.unwrap();
        assert_eq!(text, "generated");

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].last_user_text(), Some("prompt"));
        assert!(requests[0].system.is_none());
    }
}
