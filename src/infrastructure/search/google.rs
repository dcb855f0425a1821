// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::time_range::TimeRange;
use crate::domain::search::engine::{SearchEngine, SearchError, SearchHit};
use crate::utils::retry_policy::{RetryDecision, RetryPolicy};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Fixed User-Agent pool; one entry is picked at random per attempt
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/119.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Edge/119.0.0.0",
];

const DEFAULT_ENDPOINT: &str = "https://www.google.com/search";
const RESULTS_PER_QUERY: u32 = 100;

/// Upstream HTTP/HTTPS proxy as host + port
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

/// Google search engine configuration
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Search endpoint; overridable for tests
    pub endpoint: String,
    pub proxy: Option<ProxyConfig>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            proxy: None,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Google search engine implementation scraping the HTML result page.
///
/// Issues exactly one GET per attempt with a rotating User-Agent and
/// browser-like headers, classifies failures for the retry state machine,
/// and parses `div.g` result blocks into title/link pairs.
pub struct GoogleSearchEngine {
    client: reqwest::Client,
    config: GoogleConfig,
    block_selector: Selector,
    title_selector: Selector,
    link_selector: Selector,
}

impl GoogleSearchEngine {
    pub fn new(config: GoogleConfig) -> Result<Self, SearchError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(proxy) = &config.proxy {
            let proxy_url = format!("http://{}:{}", proxy.host, proxy.port);
            builder = builder.proxy(
                reqwest::Proxy::all(&proxy_url)
                    .map_err(|e| SearchError::Transport(format!("invalid proxy {proxy_url}: {e}")))?,
            );
        }

        let client = builder
            .build()
            .map_err(|e| SearchError::Transport(format!("failed to build HTTP client: {e}")))?;

        // Pre-compile selectors; the patterns are static and known-good
        let block_selector = Selector::parse("div.g").expect("result block selector");
        let title_selector = Selector::parse("h3").expect("title selector");
        let link_selector = Selector::parse("a[href]").expect("link selector");

        Ok(Self {
            client,
            config,
            block_selector,
            title_selector,
            link_selector,
        })
    }

    /// Build the search URL for one (site, time range) pair:
    /// `site:<domain>` query, recency filter token, up to 100 results
    pub fn build_search_url(&self, site: &str, time_range: TimeRange) -> String {
        let params = vec![
            ("q", format!("site:{site}")),
            ("tbs", time_range.filter_token().to_string()),
            ("num", RESULTS_PER_QUERY.to_string()),
        ];
        format!(
            "{}?{}",
            self.config.endpoint,
            serde_urlencoded::to_string(&params).unwrap_or_default()
        )
    }

    fn pick_user_agent() -> &'static str {
        USER_AGENTS[rand::random_range(0..USER_AGENTS.len())]
    }

    /// One HTTP attempt: request, status classification, body parse
    async fn attempt(&self, url: &str, site: &str) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", Self::pick_user_agent())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("DNT", "1")
            .header("Connection", "keep-alive")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(classify_transport)?;
        self.parse_results(&body, site)
    }

    /// Parse the result page into title/link pairs.
    ///
    /// Blocks missing a title or an absolute link are skipped and counted;
    /// a rate-limit interstitial is classified as `RateLimited`.
    pub fn parse_results(&self, html: &str, site: &str) -> Result<Vec<SearchHit>, SearchError> {
        if html.contains("captcha") || html.contains("unusual traffic") {
            return Err(SearchError::RateLimited);
        }

        let document = Html::parse_document(html);
        let mut hits = Vec::new();
        let mut skipped = 0usize;

        for block in document.select(&self.block_selector) {
            let title = block.select(&self.title_selector).next().map(|element| {
                let text: String = element.text().collect();
                html_escape::decode_html_entities(&text).trim().to_string()
            });
            let href = block
                .select(&self.link_selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .map(str::to_string);

            match (title, href) {
                (Some(title), Some(link)) if !title.is_empty() && is_absolute_http(&link) => {
                    hits.push(SearchHit { title, url: link });
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("skipped {skipped} malformed result blocks for {site}");
        }
        Ok(hits)
    }
}

fn is_absolute_http(link: &str) -> bool {
    Url::parse(link)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Map a reqwest error onto the retry taxonomy.
///
/// Secure-transport failures are non-retryable; everything else at the
/// transport level is treated as transient.
fn classify_transport(error: reqwest::Error) -> SearchError {
    let mut text = error.to_string().to_lowercase();
    if let Some(source) = std::error::Error::source(&error) {
        text.push(' ');
        text.push_str(&source.to_string().to_lowercase());
    }

    let tls_markers = ["tls", "ssl", "certificate", "handshake"];
    if tls_markers.iter().any(|marker| text.contains(marker)) {
        SearchError::Tls(error.to_string())
    } else if error.is_timeout() {
        SearchError::Transport(format!("timeout: {error}"))
    } else {
        SearchError::Transport(error.to_string())
    }
}

#[async_trait]
impl SearchEngine for GoogleSearchEngine {
    /// Run the retry loop for one (site, time range) pair.
    ///
    /// Rate limits and transient transport failures retry with exponential
    /// backoff under the configured budget; other HTTP statuses and secure
    /// transport failures abandon the pair immediately.
    async fn search(
        &self,
        site: &str,
        time_range: TimeRange,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let url = self.build_search_url(site, time_range);
        let mut state = self.config.retry.start();

        loop {
            info!(
                "Monitoring {site} for {time_range} timeframe, attempt {}/{}",
                state.attempt(),
                self.config.retry.max_retries
            );

            let error = match self.attempt(&url, site).await {
                Ok(hits) => {
                    info!("Found {} results for {site}", hits.len());
                    return Ok(hits);
                }
                Err(error) => error,
            };

            match self.config.retry.decide(&state, error.is_retryable()) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        "Transient failure for {site} ({error}), waiting {}s before retry",
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                    state.advance();
                }
                RetryDecision::Abandon => {
                    warn!(
                        "Giving up on {site} ({time_range}) after {} attempt(s): {error}",
                        state.attempt()
                    );
                    return Err(error);
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "google"
    }
}
