// src/sources/mod.rs
pub mod commodity;
pub mod crypto;
pub mod equity;
pub mod jobs;
pub mod news;
pub mod types;

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Shared outbound HTTP client: bounded connect and total timeouts apply to
/// every provider call.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("market-pulse/0.1")
        .connect_timeout(Duration::from_secs(4))
        .timeout(timeout)
        .build()
        .expect("reqwest client")
}

/// Map a transport error to the reason recorded in `Unavailable`.
pub(crate) fn request_failure_reason(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timeout".to_string()
    } else if err.is_connect() {
        format!("connect error: {err}")
    } else if let Some(status) = err.status() {
        format!("http status {status}")
    } else {
        format!("request error: {err}")
    }
}

/// Clean provider text for panels and prompts: decode HTML entities, drop
/// tags, fold curly quotes to ASCII, collapse whitespace runs. Capped at
/// 1500 chars.
pub fn normalize_text(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    let untagged = TAG_RE.replace_all(&decoded, "");
    let folded = untagged
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    let collapsed = WS_RE.replace_all(&folded, " ");
    let trimmed = collapsed.trim();
    if trimmed.chars().count() > 1500 {
        trimmed.chars().take(1500).collect()
    } else {
        trimmed.to_string()
    }
}

/// Percent change of `latest` vs `previous`. `None` when the previous close
/// is zero or either value is not a real number; malformed provider data
/// degrades the field, it never aborts the point.
pub fn percent_change(previous: f64, latest: f64) -> Option<f64> {
    if !previous.is_finite() || !latest.is_finite() || previous == 0.0 {
        return None;
    }
    Some((latest - previous) / previous * 100.0)
}
