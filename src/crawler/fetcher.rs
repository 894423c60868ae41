//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured identity
//! - GET requests with the Referer header
//! - Error classification: HTTP status vs. connectivity vs. broken responses

use crate::config::IdentityConfig;
use crate::url::same_site;
use reqwest::header::{CONTENT_TYPE, REFERER};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Successful response whose Content-Type is not HTML
    NotHtml {
        status_code: u16,
        content_type: String,
    },

    /// Non-2xx response; the page is unreachable but the site is fine
    HttpStatus { status_code: u16 },

    /// Host unresolvable, connection refused or timed out
    Connectivity { error: String },

    /// Any other failure (body decoding, redirect loop, ...)
    Broken { error: String },
}

impl FetchResult {
    /// Returns true for failures that doom the whole site
    pub fn is_connectivity_failure(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }
}

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with the crawler identity
///
/// Redirects are followed only while they stay on the site of the requested
/// URL. An off-site hop stops the chain and its 3xx response is returned as is.
///
/// # Example
///
/// ```no_run
/// use lemmaseek::config::IdentityConfig;
/// use lemmaseek::crawler::build_http_client;
///
/// let identity = IdentityConfig {
///     user_agent: "LemmaseekBot/1.0".to_string(),
///     referrer: Some("https://www.google.com".to_string()),
/// };
///
/// let client = build_http_client(&identity, 30).unwrap();
/// ```
pub fn build_http_client(
    identity: &IdentityConfig,
    timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(timeout_secs);

    Client::builder()
        .user_agent(identity.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .redirect(same_site_redirects())
        .build()
}

fn same_site_redirects() -> Policy {
    Policy::custom(|attempt| {
        let on_site = attempt
            .previous()
            .first()
            .map(|origin| same_site(attempt.url(), origin))
            .unwrap_or(false);

        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if on_site {
            attempt.follow()
        } else {
            attempt.stop()
        }
    })
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML or no Content-Type | `Success` |
/// | 2xx with another Content-Type | `NotHtml` |
/// | Any other status | `HttpStatus` |
/// | Timeout, DNS or connect failure | `Connectivity` |
/// | Anything else | `Broken` |
pub async fn fetch_url(client: &Client, url: &Url, referrer: Option<&str>) -> FetchResult {
    let mut request = client.get(url.clone());
    if let Some(referrer) = referrer {
        request = request.header(REFERER, referrer);
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpStatus {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_lowercase());

    if let Some(content_type) = content_type {
        if !is_html(&content_type) {
            return FetchResult::NotHtml {
                status_code: status.as_u16(),
                content_type,
            };
        }
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => classify_error(e),
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::Connectivity {
            error: format!("Request timeout: {}", e),
        }
    } else if e.is_connect() {
        FetchResult::Connectivity {
            error: format!("Connection failed: {}", e),
        }
    } else {
        FetchResult::Broken {
            error: e.to_string(),
        }
    }
}
