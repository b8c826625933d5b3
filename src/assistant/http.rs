use super::{AssistantConfig, AssistantError, AssistantRequest, PlanningAssistant};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Blocking client for an OpenAI-compatible chat completions endpoint.
pub struct HttpAssistant {
    client: Client,
    config: AssistantConfig,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpAssistant {
    pub fn new(config: AssistantConfig) -> Result<Self, AssistantError> {
        if config.api_key.is_none() {
            return Err(AssistantError::NotConfigured(format!(
                "set {} to enable the planning assistant",
                AssistantConfig::KEY_VAR
            )));
        }
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AssistantError::ExternalService(format!("failed to build client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, AssistantError> {
        Self::new(AssistantConfig::from_env())
    }
}

impl PlanningAssistant for HttpAssistant {
    fn suggest(&self, request: &AssistantRequest) -> Result<String, AssistantError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
        });

        let mut builder = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!(endpoint = %self.config.endpoint, model = %self.config.model, "calling planning assistant");
        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                AssistantError::Timeout(self.config.timeout())
            } else {
                AssistantError::ExternalService(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(AssistantError::ExternalService(format!(
                "service returned {status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| AssistantError::ExternalService(format!("unreadable response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| AssistantError::ExternalService("response contained no text".into()))
    }
}
