use reqwest::StatusCode;
use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::providers::ModelError;

const BODY_SNIPPET_CHARS: usize = 200;

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

/// Classify a transport-level failure from `reqwest` into a [`ModelError`].
pub(crate) fn classify_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> ModelError {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return ModelError::Timeout(timeout_secs);
    }

    if err.is_connect() {
        return ModelError::Other(format!(
            "failed to connect to model API at '{api_url}': {err}"
        ));
    }

    ModelError::Other(format!("failed to call model API at '{api_url}': {err}"))
}

/// Classify a non-success HTTP status into a [`ModelError`].
///
/// 401/403 are authentication problems, 429 is quota/rate limiting;
/// everything else lands in the generic bucket with a short body snippet.
pub(crate) fn classify_status(status: StatusCode, body: &str, api_url: &str) -> ModelError {
    let snippet = crate::chunk::truncate_chars(body.trim(), BODY_SNIPPET_CHARS);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ModelError::Auth(format!(
            "status {status} from '{api_url}': {snippet}"
        )),
        StatusCode::TOO_MANY_REQUESTS => ModelError::Quota(format!(
            "status {status} from '{api_url}': {snippet}"
        )),
        _ => ModelError::Other(format!(
            "status {status} from '{api_url}': {snippet}"
        )),
    }
}
