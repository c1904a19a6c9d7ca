use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Config;
use crate::providers::{self, ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

pub async fn chat(
    client: &Client,
    cfg: &Config,
    messages: &[Message],
) -> Result<String, ModelError> {
    let provider = cfg.model_provider.to_ascii_lowercase();

    match provider.as_str() {
        "gemini" => {
            debug!(
                provider = "gemini",
                model = %cfg.model,
                message_count = messages.len(),
                "dispatching model chat request"
            );
            providers::gemini::chat(client, cfg, messages).await
        }
        "groq" => {
            debug!(
                provider = "groq",
                model = %cfg.model,
                message_count = messages.len(),
                "dispatching model chat request"
            );
            providers::groq::chat(client, cfg, messages).await
        }
        other => {
            warn!(provider = %other, "unsupported model provider configured");
            Err(ModelError::Other(format!(
                "unsupported MODEL_PROVIDER '{other}'; supported providers: gemini, groq"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Message, MessageRole, chat};
    use crate::config::Config;
    use crate::providers::ModelError;

    #[test]
    fn constructors_tag_roles() {
        assert_eq!(Message::system("s").role, MessageRole::System);
        assert_eq!(Message::user("u").role, MessageRole::User);
        assert_eq!(Message::assistant("a").role, MessageRole::Assistant);
        assert_eq!(Message::user("u").content, "u");
    }

    #[tokio::test]
    async fn unsupported_provider_is_rejected() {
        let client = reqwest::Client::new();
        let mut cfg = Config::for_tests();
        cfg.model_provider = "invalid".to_string();

        let err = chat(&client, &cfg, &[Message::user("hi")])
            .await
            .expect_err("dispatch should fail");
        assert!(matches!(err, ModelError::Other(_)));
        assert!(err.to_string().contains("unsupported MODEL_PROVIDER"));
    }
}
