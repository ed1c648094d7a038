use std::time::{Duration, Instant};

use encoding_rs::Encoding;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::info;

const USER_AGENT: &str = concat!("faculty_scraper/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// GET a listing page and return its decoded HTML. Non-2xx is an error.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let start = Instant::now();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })?;
    let body = decode_html(&bytes, content_type.as_deref());
    info!(
        url,
        bytes = body.len(),
        latency_ms = start.elapsed().as_millis() as u64,
        "fetched page"
    );
    Ok(body)
}

/// Decode page bytes. The document's own `<meta>` charset wins, then the
/// Content-Type header, then a byte-level guess. A BOM overrides all three.
fn decode_html(body: &[u8], content_type: Option<&str>) -> String {
    let declared = sniff_meta_charset(body)
        .or_else(|| content_type.and_then(charset_param))
        .and_then(|label| Encoding::for_label(label.as_bytes()));

    let encoding = declared.unwrap_or_else(|| {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(body, true);
        detector.guess(None, true)
    });
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Look for `charset=` inside `<meta>` tags of the first 1024 bytes.
fn sniff_meta_charset(body: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&body[..body.len().min(1024)]).to_ascii_lowercase();
    head.split("<meta").skip(1).find_map(|tag| {
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];
        let rest = &tag[tag.find("charset=")? + "charset=".len()..];
        let label: String = rest
            .trim_start_matches(['"', '\''])
            .chars()
            .take_while(|c| !matches!(c, '"' | '\'' | ';' | ' ' | '/' | '>'))
            .collect();
        (!label.is_empty()).then_some(label)
    })
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

// ── Tests ──
