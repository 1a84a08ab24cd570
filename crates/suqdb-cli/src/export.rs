//! Scrape-to-Gist entry point.
//!
//! The export sink is one opaque JSON document — the same envelope the
//! read API serves — overwritten in full on every run. Consumers poll the
//! raw Gist URL instead of this process, which keeps the pipeline usable
//! from a bare scheduled job with no server at all.

use chrono::{DateTime, Utc};
use serde::Serialize;

use suqdb_core::{AppConfig, Deal};

use crate::scrape::collect_batches;

const GIST_API_BASE: &str = "https://api.github.com";
/// File name inside the Gist that consumers fetch.
const EXPORT_FILE: &str = "deals.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportPayload<'a> {
    success: bool,
    last_updated: DateTime<Utc>,
    count: usize,
    deals: &'a [Deal],
}

pub(crate) async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let (token, gist_id) = config.require_gist_credentials()?;
    let token = token.to_string();
    let gist_id = gist_id.to_string();

    let batches = collect_batches(config, None).await?;
    let deals: Vec<_> = batches.into_iter().flat_map(|b| b.deals).collect();

    if deals.is_empty() {
        println!("no deals scraped; export target left untouched");
        return Ok(());
    }

    upload_to_gist(config, &token, &gist_id, GIST_API_BASE, &deals).await?;
    println!("exported {} deals to gist {gist_id}", deals.len());
    Ok(())
}

async fn upload_to_gist(
    config: &AppConfig,
    token: &str,
    gist_id: &str,
    api_base: &str,
    deals: &[Deal],
) -> anyhow::Result<()> {
    let payload = ExportPayload {
        success: true,
        last_updated: Utc::now(),
        count: deals.len(),
        deals,
    };
    let body = serde_json::json!({
        "files": {
            EXPORT_FILE: { "content": serde_json::to_string_pretty(&payload)? }
        }
    });

    let client = reqwest::Client::builder()
        .user_agent(&config.scraper_user_agent)
        .build()?;
    let response = client
        .patch(format!("{api_base}/gists/{gist_id}"))
        .header(reqwest::header::AUTHORIZATION, format!("token {token}"))
        .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("gist update failed with status {status}");
    }
    Ok(())
}
