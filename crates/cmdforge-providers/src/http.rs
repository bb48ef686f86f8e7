//! HTTP transport shared by every vendor module, and the error taxonomy
//! mapping: transport failures and rate limits are retryable,
//! authentication failures are fatal, and a response body that doesn't
//! decode is treated as our own parsing bug, not the vendor's.

use cmdforge_core::error::AppError;
use cmdforge_core::error::ErrorKind;
use cmdforge_core::error::Severity;

const MAX_ERROR_BODY_CHARS: usize = 500;

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

pub async fn post_json(
    client: &reqwest::Client,
    url: &str,
    headers: Vec<(&'static str, String)>,
    body: serde_json::Value,
) -> Result<serde_json::Value, AppError> {
    let mut request = client.post(url).json(&body);
    for (name, value) in headers {
        request = request.header(name, value);
    }

    let response = request.send().await.map_err(|e| {
        AppError::new(
            ErrorKind::Network,
            "cmdforge-providers",
            "post_json",
            format!("transport error calling {url}: {e}"),
        )
    })?;

    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(AppError::new(
            ErrorKind::Network,
            "cmdforge-providers",
            "post_json",
            format!("{url} rate limited the request"),
        )
        .with_context("http_status", status.as_str()));
    }

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(AppError::new(
            ErrorKind::Authentication,
            "cmdforge-providers",
            "post_json",
            format!("{url} rejected our credentials"),
        )
        .with_severity(Severity::Critical));
    }

    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        return Err(AppError::new(
            ErrorKind::Provider,
            "cmdforge-providers",
            "post_json",
            format!("{url} returned HTTP {status}"),
        )
        .with_context("body", truncate(&body_text, MAX_ERROR_BODY_CHARS)));
    }

    response.json::<serde_json::Value>().await.map_err(|e| {
        AppError::new(
            ErrorKind::Validation,
            "cmdforge-providers",
            "post_json",
            format!("could not decode response from {url} as JSON: {e}"),
        )
    })
}

/// Raised when a 2xx response is missing the field we need to extract the
/// assistant's text, which is a shape mismatch rather than a transport or
/// vendor-side failure.
pub fn missing_field(provider: &str, field: &str) -> AppError {
    AppError::new(
        ErrorKind::Validation,
        "cmdforge-providers",
        "extract_reply",
        format!("{provider} response is missing expected field `{field}`"),
    )
}
