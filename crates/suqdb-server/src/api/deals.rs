//! Deal listing endpoints, serving reads straight from the aggregation
//! cache.
//!
//! A degraded upstream (failed sources, empty cache) surfaces only as a
//! smaller `deals` array and a stale `lastUpdated` stamp — never as an
//! HTTP error.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use suqdb_core::Deal;

use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct DealsFilter {
    store: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DealsResponse {
    success: bool,
    last_updated: Option<DateTime<Utc>>,
    count: usize,
    deals: Vec<Deal>,
}

#[derive(Debug, Serialize)]
pub(super) struct StoresResponse {
    success: bool,
    stores: Vec<String>,
}

/// `GET /api/deals?store=&category=`
pub(super) async fn list_deals(
    State(state): State<AppState>,
    Query(filter): Query<DealsFilter>,
) -> impl IntoResponse {
    let mut deals = state.cache.all_deals();

    if let Some(store) = filter.store.as_deref().map(str::to_lowercase) {
        deals.retain(|d| matches_store(d, &store));
    }
    if let Some(category) = filter.category.as_deref().map(str::to_lowercase) {
        deals.retain(|d| d.category.as_str().to_lowercase().contains(&category));
    }

    Json(DealsResponse {
        success: true,
        last_updated: state.cache.last_updated(),
        count: deals.len(),
        deals,
    })
}

/// `GET /api/deals/stores`
pub(super) async fn list_stores(State(state): State<AppState>) -> impl IntoResponse {
    Json(StoresResponse {
        success: true,
        stores: state.cache.stores(),
    })
}

/// A store query matches either the adapter name exactly or the display
/// name as a substring, both case-insensitively.
fn matches_store(deal: &Deal, store_query_lower: &str) -> bool {
    deal.source == store_query_lower || deal.store.to_lowercase().contains(store_query_lower)
}
