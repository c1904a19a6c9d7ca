//! Fetches the configured site pages and turns them into chunked plain text.
//!
//! Every page is attempted exactly once; a failed fetch is skipped with a
//! warning and never aborts the batch. When no page yields any text the
//! bundle falls back to a built-in description of the site, so the prompt
//! context is never empty.

use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::{Html, Node};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::chunk::{self, Chunk, truncate_chars};
use crate::config::Config;

pub(crate) const FALLBACK_CONTENT: &str = "Datacrumbs is an educational platform \
offering bootcamps, courses, and mentorship in data science, data analytics, \
and artificial intelligence. Programs cover Python, SQL, machine learning, and \
business intelligence, with live classes and career support. Visit \
https://datacrumbs.org for program details, schedules, and enrollment.";

const FALLBACK_SOURCE: &str = "builtin:fallback";

/// Raw page text straight from one fetch, dropped after chunking.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub raw_text: String,
    pub fetched_at: DateTime<Utc>,
}

/// Chunked site text cached for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct ContentBundle {
    pub cache_key: String,
    pub chunks: Vec<Chunk>,
    pub from_fallback: bool,
}

impl ContentBundle {
    /// Join chunk texts into a single context block, capped at `cap` chars.
    pub fn context_text(&self, cap: usize) -> String {
        let mut out = String::new();
        for chunk in &self.chunks {
            if chunk.text.is_empty() {
                continue;
            }
            let candidate_len =
                out.chars().count() + if out.is_empty() { 0 } else { 2 } + chunk.text.chars().count();
            if !out.is_empty() {
                if candidate_len > cap {
                    break;
                }
                out.push_str("\n\n");
            }
            out.push_str(&chunk.text);
        }
        truncate_chars(&out, cap).to_string()
    }
}

/// Stable key for the memoized bundle, derived from the ordered URL set.
pub(crate) fn cache_key(urls: &[String]) -> String {
    urls.join("\n")
}

/// Fetch every configured page once and chunk whatever survived.
pub async fn acquire(client: &Client, cfg: &Config) -> ContentBundle {
    let mut chunks = Vec::new();

    for url in &cfg.source_urls {
        match fetch_page(client, url, cfg.fetch_timeout_secs, cfg.page_text_cap).await {
            Ok(page) => {
                debug!(
                    url = %page.url,
                    text_len = page.raw_text.len(),
                    "fetched source page"
                );
                if !page.raw_text.is_empty() {
                    chunks.extend(chunk::split(
                        &page.url,
                        &page.raw_text,
                        cfg.chunk_size,
                        cfg.chunk_overlap,
                    ));
                }
            }
            Err(err) => {
                warn!(url = %url, error = %err, "skipping source page after failed fetch");
            }
        }
    }

    let from_fallback = chunks.iter().all(|chunk| chunk.text.trim().is_empty());
    if from_fallback {
        warn!("no source page yielded text, using built-in fallback content");
        chunks = chunk::split(
            FALLBACK_SOURCE,
            FALLBACK_CONTENT,
            cfg.chunk_size,
            cfg.chunk_overlap,
        );
    }

    info!(
        source_count = cfg.source_urls.len(),
        chunk_count = chunks.len(),
        from_fallback,
        "content bundle ready"
    );

    ContentBundle {
        cache_key: cache_key(&cfg.source_urls),
        chunks,
        from_fallback,
    }
}

async fn fetch_page(
    client: &Client,
    url: &str,
    timeout_secs: u64,
    text_cap: usize,
) -> anyhow::Result<FetchedPage> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(timeout_secs))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("'{url}' returned status {status}");
    }

    let html = response.text().await?;
    let text = extract_text(&html);

    Ok(FetchedPage {
        url: url.to_string(),
        raw_text: truncate_chars(&text, text_cap).to_string(),
        fetched_at: Utc::now(),
    })
}

/// Extract visible text from an HTML document.
///
/// Walks the parsed tree depth-first, skipping subtrees that never render
/// (`script`, `style`, `noscript`, `template`, `head`), then collapses runs
/// of whitespace and drops blank lines.
pub(crate) fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut raw = String::new();
    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Element(element) => {
                let name = element.name();
                if matches!(name, "script" | "style" | "noscript" | "template" | "head") {
                    continue;
                }
                let children: Vec<_> = node.children().collect();
                for child in children.into_iter().rev() {
                    stack.push(child);
                }
            }
            Node::Text(text) => {
                raw.push_str(&text.text);
                raw.push('\n');
            }
            _ => {
                let children: Vec<_> = node.children().collect();
                for child in children.into_iter().rev() {
                    stack.push(child);
                }
            }
        }
    }

    collapse_whitespace(&raw)
}

fn collapse_whitespace(raw: &str) -> String {
    let lines: Vec<String> = raw
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n")
}
