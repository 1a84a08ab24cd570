//! Per-cycle collection driver shared by the server scheduler and the CLI
//! one-shot commands.
//!
//! This is the never-throws boundary of the pipeline: strategy errors are
//! caught and logged here so one broken source never blocks the others or
//! aborts a cycle. Whether an empty batch replaces cached data is the
//! caller's decision — the driver just reports what each source produced.

use std::time::Duration;

use suqdb_core::{AppConfig, Deal, SourceConfig, Strategy};

use crate::browser;
use crate::error::ScrapeError;
use crate::normalize::{normalize_batch, SourceContext};
use crate::query_api;
use crate::static_page;

/// Scraper knobs lifted out of [`AppConfig`] so this crate never depends on
/// the full application configuration.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub browser_wait_timeout_secs: u64,
    pub browser_max_scroll_px: u64,
}

impl ScrapeSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            request_timeout_secs: config.scraper_request_timeout_secs,
            user_agent: config.scraper_user_agent.clone(),
            browser_wait_timeout_secs: config.browser_wait_timeout_secs,
            browser_max_scroll_px: config.browser_max_scroll_px,
        }
    }
}

/// The complete, normalized output of one source in one cycle.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source: String,
    pub deals: Vec<Deal>,
}

/// Builds the shared HTTP client used by the static and query-API
/// strategies.
///
/// # Errors
///
/// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
/// cannot be constructed (e.g., invalid TLS config).
pub fn build_http_client(settings: &ScrapeSettings) -> Result<reqwest::Client, ScrapeError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(&settings.user_agent)
        .build()?;
    Ok(client)
}

/// Runs one source through its configured strategy and normalizes the
/// result.
///
/// # Errors
///
/// Propagates the strategy's [`ScrapeError`]; callers that must not fail
/// use [`collect_all`], which absorbs errors at the source boundary.
pub async fn extract_source(
    client: &reqwest::Client,
    source: &SourceConfig,
    settings: &ScrapeSettings,
) -> Result<Vec<Deal>, ScrapeError> {
    let selectors = source.selectors.clone().unwrap_or_default();

    let candidates = match &source.strategy {
        Strategy::Static { .. } => {
            static_page::fetch_static_candidates(client, source, &selectors).await?
        }
        Strategy::Browser => {
            browser::fetch_rendered_candidates(source, &selectors, settings).await?
        }
        Strategy::Api {
            category_id,
            page_size,
        } => query_api::fetch_api_candidates(client, source, category_id, *page_size).await?,
    };

    let ctx = SourceContext::for_source(source);
    Ok(normalize_batch(candidates, &ctx))
}

/// Runs every source independently and returns the batches that succeeded.
///
/// A failed source is logged and omitted; its previous data (wherever it
/// lives) stays untouched. Zero-deal successes are included — the
/// distinction between "no data" and "failure" matters to the cache.
pub async fn collect_all(
    client: &reqwest::Client,
    sources: &[SourceConfig],
    settings: &ScrapeSettings,
) -> Vec<SourceBatch> {
    let mut batches = Vec::with_capacity(sources.len());

    for source in sources {
        match extract_source(client, source, settings).await {
            Ok(deals) => {
                if deals.is_empty() {
                    tracing::info!(source = %source.name, "extraction matched no candidates");
                } else {
                    tracing::info!(source = %source.name, count = deals.len(), "source extracted");
                }
                batches.push(SourceBatch {
                    source: source.name.clone(),
                    deals,
                });
            }
            Err(e) => {
                tracing::error!(
                    source = %source.name,
                    error = %e,
                    "source extraction failed; continuing with remaining sources"
                );
            }
        }
    }

    batches
}
