//! Scrape-cycle orchestrator.
//!
//! Runs one collection cycle at server startup and then on the configured
//! cron schedule. Cycles never overlap: a guard flag makes a trigger that
//! fires mid-cycle a logged no-op instead of a second concurrent cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use suqdb_core::{AppConfig, DealsCache, SourceConfig};
use suqdb_scraper::{build_http_client, collect_all, ScrapeSettings};

/// Builds and starts the cycle scheduler, kicking off the initial cycle.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down the job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    cache: Arc<DealsCache>,
    sources: Arc<Vec<SourceConfig>>,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    let settings = Arc::new(ScrapeSettings::from_config(&config));
    let running = Arc::new(AtomicBool::new(false));

    // Initial cycle at process start, off the startup path.
    {
        let cache = Arc::clone(&cache);
        let sources = Arc::clone(&sources);
        let settings = Arc::clone(&settings);
        let running = Arc::clone(&running);
        tokio::spawn(async move {
            tracing::info!("running initial scrape cycle");
            run_cycle_guarded(&cache, &sources, &settings, &running).await;
        });
    }

    let job = Job::new_async(config.scrape_schedule.as_str(), move |_uuid, _lock| {
        let cache = Arc::clone(&cache);
        let sources = Arc::clone(&sources);
        let settings = Arc::clone(&settings);
        let running = Arc::clone(&running);

        Box::pin(async move {
            tracing::info!("scheduled scrape cycle triggered");
            run_cycle_guarded(&cache, &sources, &settings, &running).await;
        })
    })?;
    scheduler.add(job).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Runs a cycle unless one is already in flight. There is no mid-cycle
/// cancellation; an overlapping trigger simply waits for its next slot.
async fn run_cycle_guarded(
    cache: &DealsCache,
    sources: &[SourceConfig],
    settings: &ScrapeSettings,
    running: &AtomicBool,
) {
    if running.swap(true, Ordering::SeqCst) {
        tracing::warn!("previous scrape cycle still running; skipping this trigger");
        return;
    }

    run_cycle(cache, sources, settings).await;

    running.store(false, Ordering::SeqCst);
}

/// One full cycle: every source extracted independently, successful
/// non-empty batches written to the cache.
///
/// A failed or empty source never touches its partition — stale-but-present
/// data beats erased data until the next successful cycle.
async fn run_cycle(cache: &DealsCache, sources: &[SourceConfig], settings: &ScrapeSettings) {
    let client = match build_http_client(settings) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build HTTP client; skipping cycle");
            return;
        }
    };

    let batches = collect_all(&client, sources, settings).await;

    for batch in batches {
        if batch.deals.is_empty() {
            tracing::info!(
                source = %batch.source,
                "zero-result batch; keeping previous partition"
            );
            continue;
        }
        cache.set(&batch.source, batch.deals);
    }

    tracing::info!(
        total = cache.all_deals().len(),
        "scrape cycle complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use suqdb_core::Strategy;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OFFERS_PAGE: &str = r#"
        <html><body>
          <div class="product-item">
            <span class="product-name">Fresh Norwegian Salmon 1kg</span>
            <span class="special-price">5.900</span>
            <span class="old-price">8.500</span>
          </div>
        </body></html>
    "#;

    fn test_settings() -> ScrapeSettings {
        ScrapeSettings {
            request_timeout_secs: 5,
            user_agent: "suqdb-test/0.1".to_string(),
            browser_wait_timeout_secs: 1,
            browser_max_scroll_px: 400,
        }
    }

    fn static_source(name: &str, store: &str, url: String) -> SourceConfig {
        SourceConfig {
            name: name.to_string(),
            store: store.to_string(),
            url,
            strategy: Strategy::Static { fallback_url: None },
            selectors: None,
        }
    }

    #[tokio::test]
    async fn cycle_populates_cache_from_successful_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/offers"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OFFERS_PAGE))
            .mount(&server)
            .await;

        let cache = DealsCache::new();
        let sources = vec![static_source(
            "aljazira",
            "Al Jazira",
            format!("{}/offers", server.uri()),
        )];

        run_cycle(&cache, &sources, &test_settings()).await;

        let deals = cache.get("aljazira");
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].title, "Fresh Norwegian Salmon 1kg");
        assert_eq!(deals[0].discount, 31);
    }

    #[tokio::test]
    async fn failed_source_keeps_previous_partition_while_others_update() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/good/offers"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OFFERS_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken/offers"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let cache = DealsCache::new();
        // Cycle N-1 data for the source that is about to break.
        run_cycle(
            &cache,
            &[static_source(
                "hypermax",
                "HyperMax",
                format!("{}/good/offers", server.uri()),
            )],
            &test_settings(),
        )
        .await;
        assert_eq!(cache.get("hypermax").len(), 1);

        // Cycle N: hypermax now 503s; aljazira succeeds.
        let sources = vec![
            static_source("hypermax", "HyperMax", format!("{}/broken/offers", server.uri())),
            static_source("aljazira", "Al Jazira", format!("{}/good/offers", server.uri())),
        ];
        run_cycle(&cache, &sources, &test_settings()).await;

        assert_eq!(
            cache.get("hypermax").len(),
            1,
            "failed source keeps cycle N-1 data"
        );
        assert_eq!(cache.get("aljazira").len(), 1, "healthy source updated");
    }

    #[tokio::test]
    async fn zero_result_batch_does_not_clear_partition() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/offers"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OFFERS_PAGE))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        // Second cycle: page renders but matches no selectors.
        Mock::given(method("GET"))
            .and(path("/offers"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><div class=\"hero\"></div></body></html>"),
            )
            .mount(&server)
            .await;

        let cache = DealsCache::new();
        let sources = vec![static_source(
            "aljazira",
            "Al Jazira",
            format!("{}/offers", server.uri()),
        )];

        run_cycle(&cache, &sources, &test_settings()).await;
        assert_eq!(cache.get("aljazira").len(), 1);

        run_cycle(&cache, &sources, &test_settings()).await;
        assert_eq!(
            cache.get("aljazira").len(),
            1,
            "empty extraction must not erase the previous batch"
        );
    }

    #[tokio::test]
    async fn guard_skips_overlapping_trigger() {
        let cache = DealsCache::new();
        let running = AtomicBool::new(true); // a cycle is "in flight"

        run_cycle_guarded(&cache, &[], &test_settings(), &running).await;

        // The skipped trigger must not have reset the guard owned by the
        // in-flight cycle.
        assert!(running.load(Ordering::SeqCst));
    }
}
