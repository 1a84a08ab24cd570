//! One-shot extraction for debugging adapters and selectors.

use anyhow::Context;

use suqdb_core::AppConfig;
use suqdb_scraper::{build_http_client, collect_all, ScrapeSettings, SourceBatch};

/// Runs the configured adapters once and prints a per-source summary, or
/// the full normalized deals as JSON with `--json`.
pub(crate) async fn run(
    config: &AppConfig,
    source_filter: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let batches = collect_batches(config, source_filter).await?;

    if json {
        let deals: Vec<_> = batches.iter().flat_map(|b| b.deals.iter()).collect();
        println!("{}", serde_json::to_string_pretty(&deals)?);
        return Ok(());
    }

    let mut total = 0;
    for batch in &batches {
        println!("{}: {} deals", batch.source, batch.deals.len());
        total += batch.deals.len();
    }
    println!("total: {total} deals");
    Ok(())
}

/// Loads the sources, applies the optional filter, and runs a full
/// collection pass. Shared by the sync and export entry points.
pub(crate) async fn collect_batches(
    config: &AppConfig,
    source_filter: Option<&str>,
) -> anyhow::Result<Vec<SourceBatch>> {
    let sources_file = suqdb_core::load_sources(&config.sources_path)
        .with_context(|| format!("loading sources from {}", config.sources_path.display()))?;

    let sources: Vec<_> = match source_filter {
        Some(name) => {
            let filtered: Vec<_> = sources_file
                .sources
                .into_iter()
                .filter(|s| s.name.eq_ignore_ascii_case(name))
                .collect();
            if filtered.is_empty() {
                anyhow::bail!("source '{name}' not found in sources file");
            }
            filtered
        }
        None => sources_file.sources,
    };

    let settings = ScrapeSettings::from_config(config);
    let client = build_http_client(&settings)?;
    Ok(collect_all(&client, &sources, &settings).await)
}
