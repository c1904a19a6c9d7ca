use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::Message;
use crate::providers::http_errors::{classify_request_error, classify_status};
use crate::providers::ModelError;

const DEFAULT_BASE_URL: &str = "https://api.groq.com";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

fn completions_url(base_url: Option<&str>) -> String {
    format!(
        "{}/openai/v1/chat/completions",
        base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/')
    )
}

fn to_chat_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|msg| ChatMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        })
        .collect()
}

pub async fn chat(
    client: &Client,
    cfg: &Config,
    messages: &[Message],
) -> Result<String, ModelError> {
    let api_key = cfg
        .groq_api_key
        .as_deref()
        .ok_or_else(|| ModelError::Auth("GROQ_API_KEY is not set".to_string()))?;

    let api_url = completions_url(cfg.model_base_url.as_deref());
    let body = ChatCompletionRequest {
        model: cfg.model.clone(),
        temperature: cfg.temperature,
        messages: to_chat_messages(messages),
    };
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        message_count = messages.len(),
        "sending groq chat request"
    );

    let response = client
        .post(&api_url)
        .bearer_auth(api_key)
        .timeout(Duration::from_secs(cfg.model_timeout_secs))
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(api_url = %api_url, model = %cfg.model, error = %err, "groq request failed");
            classify_request_error(err, &api_url, cfg.model_timeout_secs)
        })?;

    let status = response.status();
    if !status.is_success() {
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            status = %status,
            response_body_len = response_body.len(),
            "groq returned non-success status"
        );
        return Err(classify_status(status, &response_body, &api_url));
    }

    let parsed: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|err| ModelError::Other(format!("failed to parse groq response: {err}")))?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ModelError::Other(
            "groq response contained no choices".to_string(),
        ));
    }

    debug!(model = %cfg.model, response_len = text.len(), "received groq chat response");
    Ok(text)
}
