//! Static-markup extraction strategy.
//!
//! One HTTP GET with a browser identity, parse the server-rendered DOM,
//! and walk the ordered selector fallback lists. Sources that mirror their
//! offers on a catalog aggregator can declare a `fallback_url`, consulted
//! only when the primary page yields no candidates.

use reqwest::header;
use scraper::Html;

use suqdb_core::{SelectorSet, SourceConfig, Strategy};

use crate::candidate::RawCandidate;
use crate::error::ScrapeError;
use crate::selectors::{first_attr, first_text, parse_price, select_containers};

/// Fetches and extracts candidates for a `static`-strategy source.
///
/// # Errors
///
/// Returns [`ScrapeError`] on network failure, a non-2xx status from the
/// primary URL, or an invalid configured selector. A failing `fallback_url`
/// is logged and degrades to the primary result instead of erroring — the
/// fallback is opportunistic by definition.
pub async fn fetch_static_candidates(
    client: &reqwest::Client,
    source: &SourceConfig,
    selectors: &SelectorSet,
) -> Result<Vec<RawCandidate>, ScrapeError> {
    let candidates = fetch_and_parse(client, &source.url, selectors).await?;
    if !candidates.is_empty() {
        return Ok(candidates);
    }

    let Strategy::Static {
        fallback_url: Some(fallback_url),
    } = &source.strategy
    else {
        return Ok(candidates);
    };

    tracing::info!(
        source = %source.name,
        fallback_url,
        "primary page yielded no candidates; trying fallback"
    );
    match fetch_and_parse(client, fallback_url, selectors).await {
        Ok(fallback_candidates) => Ok(fallback_candidates),
        Err(e) => {
            tracing::warn!(source = %source.name, error = %e, "fallback fetch failed");
            Ok(Vec::new())
        }
    }
}

async fn fetch_and_parse(
    client: &reqwest::Client,
    url: &str,
    selectors: &SelectorSet,
) -> Result<Vec<RawCandidate>, ScrapeError> {
    let response = client
        .get(url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml")
        .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .send()
        .await?;
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ScrapeError::NotFound {
            url: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(ScrapeError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    parse_candidates(&body, selectors)
}

/// Extracts candidates from an HTML document using the selector fallback
/// lists. Containers with no title or no positive price are skipped.
///
/// Split out from the fetch path so it can be exercised directly against
/// fixture markup.
///
/// # Errors
///
/// Returns [`ScrapeError::Selector`] if a configured selector does not
/// parse.
pub fn parse_candidates(
    html: &str,
    selectors: &SelectorSet,
) -> Result<Vec<RawCandidate>, ScrapeError> {
    let document = Html::parse_document(html);
    let containers = select_containers(&document, &selectors.containers)?;

    let mut candidates = Vec::new();
    for container in containers {
        let Some(title) = first_text(container, &selectors.title)? else {
            continue;
        };
        let discounted_price = first_text(container, &selectors.price)?
            .as_deref()
            .and_then(parse_price)
            .unwrap_or(0.0);
        if discounted_price <= 0.0 {
            continue;
        }
        let original_price = first_text(container, &selectors.original_price)?
            .as_deref()
            .and_then(parse_price);
        let image = first_attr(container, &selectors.image, "src")?;

        candidates.push(RawCandidate {
            title,
            discounted_price,
            original_price,
            image,
            ..RawCandidate::default()
        });
    }

    Ok(candidates)
}

#[cfg(test)]
#[path = "static_page_test.rs"]
mod tests;
