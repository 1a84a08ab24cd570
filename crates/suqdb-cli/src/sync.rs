//! Scrape-to-Postgres entry point.
//!
//! Credentials are validated before any scraping starts: a missing
//! `DATABASE_URL` is a fatal configuration error, not something to
//! discover after minutes of browser work.

use chrono::Utc;

use suqdb_core::AppConfig;

use crate::scrape::collect_batches;

pub(crate) async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let database_url = config.require_database_url()?.to_string();

    let batches = collect_batches(config, None).await?;
    let deals: Vec<_> = batches.into_iter().flat_map(|b| b.deals).collect();
    tracing::info!(count = deals.len(), "scrape complete; reconciling store");

    let pool_config = suqdb_db::PoolConfig::from_app_config(config);
    let pool = suqdb_db::connect_pool(&database_url, pool_config).await?;
    suqdb_db::run_migrations(&pool).await?;

    let today = Utc::now().date_naive();
    let summary = suqdb_db::sync_deals(&pool, &deals, today).await?;

    if summary.skipped {
        println!("no active deals scraped; persistent store left untouched");
    } else {
        println!(
            "synchronized {} deals ({} stale removed, {} expired removed)",
            summary.upserted, summary.stale_deleted, summary.expired_deleted
        );
    }
    Ok(())
}
