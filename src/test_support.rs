// ABOUTME: Scripted LLM client shared by the unit tests.
// ABOUTME: Records every prompt and answers through a caller-supplied closure.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::LlmError;
use crate::llm::{LanguageModel, LlmClient, Request, Response};

type Script = dyn Fn(&str) -> Result<String, LlmError> + Send + Sync;

pub(crate) struct ScriptedClient {
    script: Box<Script>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub(crate) fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Box::new(script),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Always answers `reply`.
    pub(crate) fn replying(reply: &str) -> Arc<Self> {
        let reply = reply.to_string();
        Self::new(move |_| Ok(reply.clone()))
    }

    /// Answers with the prompt itself.
    pub(crate) fn echo() -> Arc<Self> {
        Self::new(|prompt| Ok(prompt.to_string()))
    }

    /// Always fails with a server error.
    pub(crate) fn failing() -> Arc<Self> {
        Self::new(|_| {
            Err(LlmError::Api {
                status: 500,
                message: "boom".into(),
            })
        })
    }

    pub(crate) fn model(self: &Arc<Self>) -> LanguageModel {
        LanguageModel::new(self.clone(), "scripted")
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let prompt = req.last_user_text().unwrap_or_default().to_string();
        self.prompts.lock().unwrap().push(prompt.clone());
        let text = (self.script)(&prompt)?;
        Ok(Response::from_text(&req.model, text))
    }
}
