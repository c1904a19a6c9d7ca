use std::env;

const DEFAULT_MODEL_PROVIDER: &str = "gemini";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_SYSTEM_PROMPT: &str = "You are the Datacrumbs assistant. \
Answer questions about Datacrumbs courses, bootcamps, and programs using only \
the website content provided below. Keep every answer short and to the point, \
at most three brief paragraphs.";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_ANSWER_CHARS: usize = 500;
const DEFAULT_SOURCE_URLS: &str = "https://datacrumbs.org";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_TEXT_CAP: usize = 4000;
const DEFAULT_CHUNK_SIZE: usize = 1000;
const DEFAULT_CHUNK_OVERLAP: usize = 100;
const DEFAULT_PROMPT_CONTEXT_CAP: usize = 6000;

#[derive(Debug, Clone)]
pub struct Config {
    pub model_provider: String,
    pub model: String,
    pub model_base_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub system_prompt: String,
    pub model_timeout_secs: u64,
    pub temperature: f32,
    pub max_answer_chars: usize,
    pub source_urls: Vec<String>,
    pub fetch_timeout_secs: u64,
    pub page_text_cap: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub prompt_context_cap: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let chunk_size = parse_chunk_size(get_var("CHUNK_SIZE").as_deref());
        let chunk_overlap = parse_chunk_overlap(get_var("CHUNK_OVERLAP").as_deref(), chunk_size);

        Self {
            model_provider: get_var("MODEL_PROVIDER")
                .unwrap_or_else(|| DEFAULT_MODEL_PROVIDER.to_string()),
            model: get_var("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            model_base_url: non_empty(get_var("MODEL_BASE_URL")),
            gemini_api_key: non_empty(get_var("GEMINI_API_KEY")),
            groq_api_key: non_empty(get_var("GROQ_API_KEY")),
            system_prompt: get_var("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            model_timeout_secs: parse_positive_u64(
                get_var("MODEL_TIMEOUT_SECS").as_deref(),
                DEFAULT_MODEL_TIMEOUT_SECS,
            ),
            temperature: parse_temperature(get_var("TEMPERATURE").as_deref()),
            max_answer_chars: parse_positive_usize(
                get_var("MAX_ANSWER_CHARS").as_deref(),
                DEFAULT_MAX_ANSWER_CHARS,
            ),
            source_urls: parse_source_urls(get_var("SOURCE_URLS").as_deref()),
            fetch_timeout_secs: parse_positive_u64(
                get_var("FETCH_TIMEOUT_SECS").as_deref(),
                DEFAULT_FETCH_TIMEOUT_SECS,
            ),
            page_text_cap: parse_positive_usize(
                get_var("PAGE_TEXT_CAP").as_deref(),
                DEFAULT_PAGE_TEXT_CAP,
            ),
            chunk_size,
            chunk_overlap,
            prompt_context_cap: parse_positive_usize(
                get_var("PROMPT_CONTEXT_CAP").as_deref(),
                DEFAULT_PROMPT_CONTEXT_CAP,
            ),
        }
    }
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for unit tests, independent of the process env.
    pub(crate) fn for_tests() -> Self {
        Self::from_env_with(|_| None)
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_positive_usize(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_temperature(raw: Option<&str>) -> f32 {
    raw.and_then(|value| value.trim().parse::<f32>().ok())
        .filter(|value| (0.0..=2.0).contains(value))
        .unwrap_or(DEFAULT_TEMPERATURE)
}

fn parse_chunk_size(raw: Option<&str>) -> usize {
    parse_positive_usize(raw, DEFAULT_CHUNK_SIZE)
}

/// Overlap must stay strictly below the chunk size; anything else falls back
/// to the default, clamped so small chunk sizes remain valid.
fn parse_chunk_overlap(raw: Option<&str>, chunk_size: usize) -> usize {
    let fallback = DEFAULT_CHUNK_OVERLAP.min(chunk_size.saturating_sub(1));
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value < chunk_size)
        .unwrap_or(fallback)
}

fn parse_source_urls(raw: Option<&str>) -> Vec<String> {
    let urls: Vec<String> = raw
        .unwrap_or(DEFAULT_SOURCE_URLS)
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        vec![DEFAULT_SOURCE_URLS.to_string()]
    } else {
        urls
    }
}
