use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::{Message, MessageRole};
use crate::providers::http_errors::{classify_request_error, classify_status};
use crate::providers::ModelError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

fn generate_url(base_url: Option<&str>, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/'),
        model
    )
}

/// Gemini has no system role in `contents`; the system message becomes the
/// request-level `systemInstruction` and assistant turns use role `model`.
fn to_request(cfg: &Config, messages: &[Message]) -> GenerateContentRequest {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for msg in messages {
        match msg.role {
            MessageRole::System => system_parts.push(Part {
                text: msg.content.clone(),
            }),
            MessageRole::User => contents.push(Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: msg.content.clone(),
                }],
            }),
            MessageRole::Assistant => contents.push(Content {
                role: Some("model".to_string()),
                parts: vec![Part {
                    text: msg.content.clone(),
                }],
            }),
        }
    }

    GenerateContentRequest {
        contents,
        system_instruction: if system_parts.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: system_parts,
            })
        },
        generation_config: GenerationConfig {
            temperature: cfg.temperature,
        },
    }
}

pub async fn chat(
    client: &Client,
    cfg: &Config,
    messages: &[Message],
) -> Result<String, ModelError> {
    let api_key = cfg
        .gemini_api_key
        .as_deref()
        .ok_or_else(|| ModelError::Auth("GEMINI_API_KEY is not set".to_string()))?;

    let api_url = generate_url(cfg.model_base_url.as_deref(), &cfg.model);
    let body = to_request(cfg, messages);
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        message_count = messages.len(),
        "sending gemini chat request"
    );

    let response = client
        .post(&api_url)
        .header("x-goog-api-key", api_key)
        .timeout(Duration::from_secs(cfg.model_timeout_secs))
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(api_url = %api_url, model = %cfg.model, error = %err, "gemini request failed");
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
            "gemini returned non-success status"
        );
        return Err(classify_status(status, &response_body, &api_url));
    }

    let parsed: GenerateContentResponse = response
        .json()
        .await
        .map_err(|err| ModelError::Other(format!("failed to parse gemini response: {err}")))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ModelError::Other(
            "gemini response contained no candidate text".to_string(),
        ));
    }

    debug!(model = %cfg.model, response_len = text.len(), "received gemini chat response");
    Ok(text)
}
