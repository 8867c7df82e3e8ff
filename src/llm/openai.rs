// ABOUTME: OpenAI chat-completions client implementation.
// ABOUTME: Also serves OpenAI-compatible endpoints (Ollama, Groq, Azure, ...).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{LlmClient, Message, Request, Response, StopReason, Usage};
use crate::error::LlmError;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for the OpenAI API.
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default base URL of a local Ollama server.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
/// Default model for Ollama.
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3.2";
/// Default base URL of a local LM Studio server.
pub const LM_STUDIO_BASE_URL: &str = "http://localhost:1234/v1";
/// Default model for Groq.
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";
/// Default model for Together AI.
pub const TOGETHER_DEFAULT_MODEL: &str = "meta-llama/Llama-3-70b-chat-hf";
/// Default model for DeepSeek.
pub const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";
/// Default model for Fireworks AI.
pub const FIREWORKS_DEFAULT_MODEL: &str = "accounts/fireworks/models/llama-v3p1-70b-instruct";
/// Azure API version used when none is given.
pub const AZURE_DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// OpenAI API request format.
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// OpenAI message format.
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<OpenAIChoice>,
    pub usage: Option<OpenAIUsage>,
}

/// OpenAI response choice.
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
    pub finish_reason: Option<String>,
}

/// OpenAI usage stats.
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
pub struct OpenAIError {
    pub error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

impl From<&Message> for OpenAIMessage {
    fn from(msg: &Message) -> Self {
        OpenAIMessage {
            role: msg.role.as_str().to_string(),
            content: Some(msg.content.clone()),
        }
    }
}

impl From<&Request> for OpenAIRequest {
    fn from(req: &Request) -> Self {
        let mut messages = Vec::with_capacity(req.messages.len() + 1);

        if let Some(ref system) = req.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
            });
        }
        messages.extend(req.messages.iter().map(OpenAIMessage::from));

        OpenAIRequest {
            model: req.model.clone(),
            messages,
            max_tokens: req.max_tokens,
            temperature: req.temperature,
        }
    }
}

fn parse_stop_reason(s: Option<&str>) -> StopReason {
    match s {
        Some("length") => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    }
}

impl TryFrom<OpenAIResponse> for Response {
    type Error = LlmError;

    fn try_from(resp: OpenAIResponse) -> Result<Self, Self::Error> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;

        let usage = resp
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Response {
            id: resp.id,
            text: choice.message.content.unwrap_or_default(),
            stop_reason: parse_stop_reason(choice.finish_reason.as_deref()),
            model: resp.model,
            usage,
        })
    }
}

/// Client for the OpenAI API and OpenAI-compatible servers.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    endpoint: String,
    api_key: Option<String>,
    headers: Vec<(String, String)>,
    http: reqwest::Client,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::compatible(OPENAI_BASE_URL, Some(api_key.into()))
    }

    /// Create a new OpenAI client from the OPENAI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            LlmError::Configuration("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Create a client for any OpenAI-compatible server.
    ///
    /// `base_url` is the API root (e.g. "http://localhost:11434/v1");
    /// `/chat/completions` is appended. The API key is optional for
    /// local servers.
    pub fn compatible(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            headers: Vec::new(),
            http: reqwest::Client::new(),
        }
    }

    /// Client for a local Ollama server.
    pub fn ollama() -> Self {
        Self::compatible(OLLAMA_BASE_URL, None)
    }

    /// Client for a local LM Studio server.
    pub fn lm_studio() -> Self {
        Self::compatible(LM_STUDIO_BASE_URL, None)
    }

    /// Client for Groq.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::compatible("https://api.groq.com/openai/v1", Some(api_key.into()))
    }

    /// Client for Together AI.
    pub fn together(api_key: impl Into<String>) -> Self {
        Self::compatible("https://api.together.xyz/v1", Some(api_key.into()))
    }

    /// Client for DeepSeek.
    pub fn deepseek(api_key: impl Into<String>) -> Self {
        Self::compatible("https://api.deepseek.com/v1", Some(api_key.into()))
    }

    /// Client for Fireworks AI.
    pub fn fireworks(api_key: impl Into<String>) -> Self {
        Self::compatible("https://api.fireworks.ai/inference/v1", Some(api_key.into()))
    }

    /// Client for an Azure OpenAI deployment.
    ///
    /// Azure authenticates with an `api-key` header and selects the API
    /// version through a query parameter.
    pub fn azure(
        endpoint: &str,
        deployment: &str,
        api_key: impl Into<String>,
        api_version: Option<&str>,
    ) -> Result<Self, LlmError> {
        if endpoint.is_empty() {
            return Err(LlmError::Configuration("azure endpoint is required".into()));
        }
        if deployment.is_empty() {
            return Err(LlmError::Configuration(
                "azure deployment name is required".into(),
            ));
        }
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::Configuration("azure api key is required".into()));
        }

        let base = format!(
            "{}/openai/deployments/{}",
            endpoint.trim_end_matches('/'),
            deployment
        );
        let mut client = Self::compatible(&base, None).header("api-key", api_key);
        client.endpoint = format!(
            "{}?api-version={}",
            client.endpoint,
            api_version.unwrap_or(AZURE_DEFAULT_API_VERSION)
        );
        Ok(client)
    }

    /// Add a custom header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The chat-completions URL this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let openai_req = OpenAIRequest::from(req);

        let mut builder = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&openai_req);

        if let Some(ref api_key) = self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            let message = match serde_json::from_str::<OpenAIError>(&body) {
                Ok(error) => error.error.message,
                Err(_) => body,
            };
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let openai_resp: OpenAIResponse = response.json().await?;
        Response::try_from(openai_resp)
    }
}

#[cfg(test)]
mod openai_test {
    use super::*;

    #[test]
    fn test_client_from_env_missing() {
        // SAFETY: This test runs in isolation and only affects this process
        unsafe {
            std::env::remove_var("OPENAI_API_KEY");
        }
        let result = OpenAIClient::from_env();
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_request_serialization() {
        let req = Request::new("gpt-4o")
            .message(Message::user("Hello"))
            .system("Be helpful")
            .max_tokens(100);

        let openai_req = OpenAIRequest::from(&req);
        assert_eq!(openai_req.model, "gpt-4o");
        assert_eq!(openai_req.messages.len(), 2); // system + user
        assert_eq!(openai_req.messages[0].role, "system");
        assert_eq!(openai_req.messages[1].role, "user");
        assert_eq!(openai_req.messages[1].content.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_compatible_endpoints() {
        assert_eq!(
            OpenAIClient::new("k").endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            OpenAIClient::ollama().endpoint(),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(
            OpenAIClient::fireworks("k").endpoint(),
            "https://api.fireworks.ai/inference/v1/chat/completions"
        );
        assert_eq!(
            OpenAIClient::compatible("http://host:8000/v1/", None).endpoint(),
            "http://host:8000/v1/chat/completions"
        );
    }

    #[test]
    fn test_azure_endpoint() {
        let client =
            OpenAIClient::azure("https://res.openai.azure.com", "gpt4", "secret", None).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://res.openai.azure.com/openai/deployments/gpt4/chat/completions?api-version=2024-02-15-preview"
        );
        assert!(client.headers.contains(&("api-key".into(), "secret".into())));
    }

    #[test]
    fn test_azure_requires_fields() {
        assert!(OpenAIClient::azure("", "d", "k", None).is_err());
        assert!(OpenAIClient::azure("https://e", "", "k", None).is_err());
        assert!(OpenAIClient::azure("https://e", "d", "", None).is_err());
    }

    #[test]
    fn test_response_conversion() {
        let json = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hi there"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
        }"#;

        let resp: OpenAIResponse = serde_json::from_str(json).unwrap();
        let response = Response::try_from(resp).unwrap();
        assert_eq!(response.text, "Hi there");
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.usage.input_tokens, 3);
        assert_eq!(response.usage.output_tokens, 2);
    }

    #[test]
    fn test_response_without_choices() {
        let json = r#"{"id": "x", "model": "m", "choices": []}"#;
        let resp: OpenAIResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            Response::try_from(resp),
            Err(LlmError::EmptyResponse)
        ));
    }
}
