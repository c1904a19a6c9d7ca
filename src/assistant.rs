//! Session state and the question/answer turn loop.
//!
//! A turn moves through compose (ensure the memoized content bundle,
//! assemble the prompt) and model invocation, and always ends by appending
//! exactly one assistant message: either the trimmed model reply or a
//! canned fallback picked by error kind. Turns never fail outward.

use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::content::{self, ContentBundle};
use crate::model::{self, Message};
use crate::prompt;
use crate::providers::ModelError;

pub const WELCOME: &str =
    "Hi! Ask me anything about Datacrumbs courses, bootcamps, and programs.";

pub const QUOTA_FALLBACK: &str = "The assistant is answering a lot of questions \
right now. Please try again in a few minutes, or visit https://datacrumbs.org.";

pub const AUTH_FALLBACK: &str = "The assistant is not available at the moment. \
Please visit https://datacrumbs.org or write to hello@datacrumbs.org.";

pub const TIMEOUT_FALLBACK: &str = "That answer took too long to generate. \
Please ask again, or visit https://datacrumbs.org.";

pub const GENERIC_FALLBACK: &str = "Sorry, I could not come up with an answer \
right now. Please try again shortly, or visit https://datacrumbs.org.";

const TRUNCATION_MARKER: char = '…';

/// Per-session state: the append-only conversation, the memoized site
/// content, and the one-time greeting flag.
#[derive(Debug, Default)]
struct Session {
    conversation: Vec<Message>,
    content: Option<SiteContext>,
    greeted: bool,
}

/// The content bundle plus the system message body derived from it,
/// computed once per session.
#[derive(Debug, Clone)]
struct SiteContext {
    system_text: String,
    bundle: ContentBundle,
}

pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ModelError>> + 'a>>;

/// Seam for the remote model call, so tests can substitute stub backends.
pub trait ChatBackend {
    fn chat<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        messages: &'a [Message],
    ) -> ChatFuture<'a>;
}

/// Production backend: dispatch through the configured provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderBackend;

impl ChatBackend for ProviderBackend {
    fn chat<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        messages: &'a [Message],
    ) -> ChatFuture<'a> {
        Box::pin(async move { model::chat(client, cfg, messages).await })
    }
}

pub struct Assistant<'a, B = ProviderBackend> {
    client: &'a Client,
    cfg: &'a Config,
    backend: B,
    session: Session,
}

impl<'a> Assistant<'a, ProviderBackend> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self::with_backend(client, cfg, ProviderBackend)
    }
}

impl<'a, B> Assistant<'a, B> {
    pub fn with_backend(client: &'a Client, cfg: &'a Config, backend: B) -> Self {
        Self {
            client,
            cfg,
            backend,
            session: Session::default(),
        }
    }

    /// The renderable exchange: user and assistant messages only.
    pub fn transcript(&self) -> &[Message] {
        &self.session.conversation
    }

    /// Welcome line, produced once per session.
    pub fn greeting(&mut self) -> Option<&'static str> {
        if self.session.greeted {
            None
        } else {
            self.session.greeted = true;
            Some(WELCOME)
        }
    }

    /// Drop the conversation, the greeting flag, and the memoized content.
    pub fn reset(&mut self) {
        self.session = Session::default();
    }
}

impl<'a, B> Assistant<'a, B>
where
    B: ChatBackend,
{
    /// Run one question/answer cycle.
    ///
    /// Returns `None` for an empty question (no turn executed). Otherwise
    /// the conversation grows by one user and one assistant message and the
    /// assistant's display text is returned; failures surface as canned
    /// fallback replies, never as errors.
    pub async fn run_turn(&mut self, question: &str) -> Option<String> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        let system_text = self.ensure_content().await;
        let messages = prompt::assemble(&system_text, &self.session.conversation, question);
        debug!(
            question_len = question.len(),
            message_count = messages.len(),
            "invoking model for turn"
        );

        let answer = match self.backend.chat(self.client, self.cfg, &messages).await {
            Ok(raw) => {
                let answer = trim_answer(&raw, self.cfg.max_answer_chars);
                info!(answer_len = answer.len(), "turn answered");
                answer
            }
            Err(err) => {
                warn!(error = %err, "model invocation failed, using fallback reply");
                fallback_reply(&err).to_string()
            }
        };

        self.session.conversation.push(Message::user(question));
        self.session.conversation.push(Message::assistant(answer.clone()));
        Some(answer)
    }

    /// Memoized site context: fetched and chunked on the first turn, reused
    /// for every later one, cleared only by [`Assistant::reset`].
    async fn ensure_content(&mut self) -> String {
        if let Some(context) = &self.session.content {
            debug!(cache_key_len = context.bundle.cache_key.len(), "reusing cached content bundle");
            return context.system_text.clone();
        }

        let bundle = content::acquire(self.client, self.cfg).await;
        let context_text = bundle.context_text(self.cfg.prompt_context_cap);
        let system_text = prompt::system_text(&self.cfg.system_prompt, &context_text);
        self.session.content = Some(SiteContext {
            system_text: system_text.clone(),
            bundle,
        });
        system_text
    }
}

/// Pick the canned user-facing reply for a model failure. Raw error text
/// stays in the logs and never reaches the user.
fn fallback_reply(err: &ModelError) -> &'static str {
    match err {
        ModelError::Quota(_) => QUOTA_FALLBACK,
        ModelError::Auth(_) => AUTH_FALLBACK,
        ModelError::Timeout(_) => TIMEOUT_FALLBACK,
        ModelError::Other(_) => GENERIC_FALLBACK,
    }
}

/// Trim whitespace and cap the reply at `max_chars`, marking truncation.
fn trim_answer(raw: &str, max_chars: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut = crate::chunk::truncate_chars(trimmed, max_chars).trim_end();
    format!("{cut}{TRUNCATION_MARKER}")
}
