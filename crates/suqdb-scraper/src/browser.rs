//! Rendered-interaction extraction strategy.
//!
//! Some storefronts render their deal grids entirely client-side and only
//! populate them after scrolling. This strategy drives an isolated headless
//! Chrome session over CDP: navigate, wait (bounded) for the page to settle
//! and for a product container to appear, scroll in fixed increments to
//! trigger lazy loading, then evaluate the same ordered-selector-fallback
//! extraction inside the live document.
//!
//! Every wait is bounded and falls through on expiry; the scroll loop is
//! capped by cumulative distance, not content completeness. The browser
//! session is released on every exit path.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::Deserialize;
use tokio::time::{sleep, timeout, Instant};

use suqdb_core::{SelectorSet, SourceConfig};

use crate::candidate::RawCandidate;
use crate::collect::ScrapeSettings;
use crate::error::ScrapeError;

/// Fixed scroll increment, matching a typical product-card height.
const SCROLL_STEP_PX: u64 = 400;
/// Pause between scroll steps, giving lazy loaders time to fire.
const SCROLL_PAUSE_MS: u64 = 200;
/// Poll interval while waiting for a product container to appear.
const SELECTOR_POLL_MS: u64 = 250;

/// Shape returned by the in-page extraction script.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderedCandidate {
    title: String,
    discounted_price: f64,
    original_price: f64,
    image: String,
}

/// Fetches and extracts candidates for a `browser`-strategy source.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the browser cannot be launched, navigation
/// fails outright, or the extraction script cannot be evaluated. Wait
/// timeouts are not errors — extraction proceeds against whatever has
/// rendered.
pub async fn fetch_rendered_candidates(
    source: &SourceConfig,
    selectors: &SelectorSet,
    settings: &ScrapeSettings,
) -> Result<Vec<RawCandidate>, ScrapeError> {
    let config = BrowserConfig::builder()
        .no_sandbox()
        .window_size(1280, 800)
        .arg(format!("--user-agent={}", settings.user_agent))
        .build()
        .map_err(ScrapeError::BrowserConfig)?;

    let (mut browser, mut handler) = Browser::launch(config).await?;
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let result = extract_from_page(&browser, source, selectors, settings).await;

    // Release the session whatever happened above.
    if let Err(e) = browser.close().await {
        tracing::debug!(source = %source.name, error = %e, "browser close failed");
    }
    let _ = browser.wait().await;
    handler_task.abort();

    result
}

async fn extract_from_page(
    browser: &Browser,
    source: &SourceConfig,
    selectors: &SelectorSet,
    settings: &ScrapeSettings,
) -> Result<Vec<RawCandidate>, ScrapeError> {
    let wait = Duration::from_secs(settings.browser_wait_timeout_secs);

    let page = browser.new_page(source.url.as_str()).await?;

    // Bounded wait for the load to settle; a slow page is extracted as-is.
    match timeout(wait, page.wait_for_navigation()).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            tracing::debug!(source = %source.name, "navigation wait timed out; proceeding");
        }
    }

    wait_for_containers(&page, &selectors.containers, wait, &source.name).await?;
    scroll_to_load(&page, settings.browser_max_scroll_px).await?;

    let evaluated = page.evaluate(extraction_script(selectors)).await?;
    let rendered: Vec<RenderedCandidate> =
        evaluated
            .into_value()
            .map_err(|e| ScrapeError::Evaluation {
                reason: e.to_string(),
            })?;

    Ok(rendered
        .into_iter()
        .filter(|c| c.discounted_price > 0.0)
        .map(|c| RawCandidate {
            title: c.title,
            discounted_price: c.discounted_price,
            original_price: (c.original_price > 0.0).then_some(c.original_price),
            image: (!c.image.is_empty()).then_some(c.image),
            ..RawCandidate::default()
        })
        .collect())
}

/// Polls until any container selector matches, up to `wait`. Falling
/// through on timeout is deliberate — extraction may still find content
/// that rendered under a selector later in the fallback list.
async fn wait_for_containers(
    page: &Page,
    containers: &[String],
    wait: Duration,
    source_name: &str,
) -> Result<(), ScrapeError> {
    let selector_json =
        serde_json::to_string(containers).map_err(|e| ScrapeError::Evaluation {
            reason: e.to_string(),
        })?;
    let probe = format!(
        "(() => {{ const sels = {selector_json}; \
         return sels.some((s) => document.querySelectorAll(s).length > 0); }})()"
    );

    let deadline = Instant::now() + wait;
    loop {
        let found: bool = page.evaluate(probe.clone()).await?.into_value().unwrap_or(false);
        if found {
            return Ok(());
        }
        if Instant::now() >= deadline {
            tracing::debug!(source = %source_name, "no product selector appeared; proceeding anyway");
            return Ok(());
        }
        sleep(Duration::from_millis(SELECTOR_POLL_MS)).await;
    }
}

/// Scrolls in fixed increments until the page bottom or the cumulative
/// pixel cap, whichever comes first. Always terminates.
async fn scroll_to_load(page: &Page, max_scroll_px: u64) -> Result<(), ScrapeError> {
    let mut scrolled: u64 = 0;
    while scrolled < max_scroll_px {
        page.evaluate(format!("window.scrollBy(0, {SCROLL_STEP_PX})"))
            .await?;
        scrolled += SCROLL_STEP_PX;

        let height: u64 = page
            .evaluate("document.body.scrollHeight")
            .await?
            .into_value()
            .unwrap_or(max_scroll_px);
        if scrolled >= height {
            break;
        }
        sleep(Duration::from_millis(SCROLL_PAUSE_MS)).await;
    }
    Ok(())
}

/// Builds the in-page extraction script: the same ordered-selector-fallback
/// technique as the static strategy, evaluated against the rendered DOM,
/// returning an array of candidate objects.
fn extraction_script(selectors: &SelectorSet) -> String {
    // Selector lists are embedded as JSON; Vec<String> serialization is
    // infallible.
    let containers = serde_json::to_string(&selectors.containers).unwrap_or_else(|_| "[]".into());
    let titles = serde_json::to_string(&selectors.title).unwrap_or_else(|_| "[]".into());
    let prices = serde_json::to_string(&selectors.price).unwrap_or_else(|_| "[]".into());
    let originals =
        serde_json::to_string(&selectors.original_price).unwrap_or_else(|_| "[]".into());
    let images = serde_json::to_string(&selectors.image).unwrap_or_else(|_| "[]".into());

    format!(
        r#"(() => {{
  const containerSelectors = {containers};
  const titleSelectors = {titles};
  const priceSelectors = {prices};
  const originalSelectors = {originals};
  const imageSelectors = {images};

  let nodes = [];
  for (const sel of containerSelectors) {{
    nodes = Array.from(document.querySelectorAll(sel));
    if (nodes.length > 0) break;
  }}

  const firstText = (el, sels) => {{
    for (const sel of sels) {{
      const node = el.querySelector(sel);
      const text = node && node.textContent ? node.textContent.trim() : '';
      if (text) return text;
    }}
    return '';
  }};
  const firstImage = (el, sels) => {{
    for (const sel of sels) {{
      const node = el.querySelector(sel);
      if (node && node.src) return node.src;
    }}
    return '';
  }};
  const parsePrice = (text) => {{
    const value = parseFloat(text.replace(/[^0-9.]/g, ''));
    return Number.isFinite(value) ? value : 0;
  }};

  const items = [];
  for (const el of nodes) {{
    const title = firstText(el, titleSelectors);
    if (!title) continue;
    const discountedPrice = parsePrice(firstText(el, priceSelectors));
    if (discountedPrice <= 0) continue;
    const originalPrice = parsePrice(firstText(el, originalSelectors)) || discountedPrice;
    items.push({{
      title: title,
      discountedPrice: discountedPrice,
      originalPrice: originalPrice,
      image: firstImage(el, imageSelectors),
    }});
  }}
  return items;
}})()"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_script_embeds_all_selector_lists() {
        let selectors = SelectorSet::default();
        let script = extraction_script(&selectors);
        for selector in selectors
            .containers
            .iter()
            .chain(&selectors.title)
            .chain(&selectors.price)
            .chain(&selectors.original_price)
        {
            assert!(
                script.contains(selector.as_str()),
                "script should embed selector {selector}"
            );
        }
    }

    #[test]
    fn extraction_script_skips_priceless_items() {
        let script = extraction_script(&SelectorSet::default());
        assert!(script.contains("if (discountedPrice <= 0) continue;"));
    }

    #[test]
    fn extraction_script_escapes_quoted_selectors_as_json() {
        let selectors = SelectorSet {
            containers: vec!["[data-product=\"card\"]".to_string()],
            ..SelectorSet::default()
        };
        let script = extraction_script(&selectors);
        // JSON-escaped, so the embedded quote cannot break the script.
        assert!(script.contains(r#"[data-product=\"card\"]"#));
    }

    #[test]
    fn rendered_candidate_deserializes_from_camel_case() {
        let json = r#"{"title":"TV 55\"","discountedPrice":99.9,"originalPrice":129.9,"image":""}"#;
        let candidate: RenderedCandidate = serde_json::from_str(json).expect("deserialize");
        assert!((candidate.discounted_price - 99.9).abs() < f64::EPSILON);
        assert!(candidate.image.is_empty());
    }
}
