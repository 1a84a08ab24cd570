//! Normalization from raw candidates to [`suqdb_core::Deal`].
//!
//! This is where defensive price/discount derivation, id assignment, store
//! canonicalization, and categorization happen; extraction strategies only
//! collect signals.

use suqdb_core::{categorize, normalize_store_name, Deal, SourceConfig};

use crate::candidate::RawCandidate;

/// All configured sources sell into the same market.
pub const DEFAULT_LOCATION: &str = "Bahrain";

/// Per-source context the normalizer stamps onto every deal.
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
    /// Adapter name (`Deal::source`).
    pub source: &'a str,
    /// Default store display name for candidates that carry none.
    pub store: &'a str,
    pub location: &'a str,
}

impl<'a> SourceContext<'a> {
    #[must_use]
    pub fn for_source(source: &'a SourceConfig) -> Self {
        Self {
            source: &source.name,
            store: &source.store,
            location: DEFAULT_LOCATION,
        }
    }
}

/// Normalizes one extraction batch, dropping invalid candidates.
///
/// The sequence index feeds slug-based ids, so ids are stable for a given
/// title within one run and unique within the batch.
#[must_use]
pub fn normalize_batch(candidates: Vec<RawCandidate>, ctx: &SourceContext<'_>) -> Vec<Deal> {
    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(index, candidate)| normalize_candidate(candidate, ctx, index))
        .collect()
}

fn normalize_candidate(
    candidate: RawCandidate,
    ctx: &SourceContext<'_>,
    index: usize,
) -> Option<Deal> {
    let title = candidate.title.trim().to_string();
    if title.is_empty() {
        return None;
    }
    // No valid deal without a positive offer price.
    if candidate.discounted_price <= 0.0 {
        return None;
    }

    let discounted_price = candidate.discounted_price;
    let original_price = candidate
        .original_price
        .filter(|p| *p > 0.0)
        .unwrap_or(discounted_price);

    let discount = candidate
        .discount_percent
        .filter(|d| *d > 0)
        .unwrap_or_else(|| derive_discount(original_price, discounted_price));

    let store = normalize_store_name(candidate.store.as_deref().unwrap_or(ctx.store));
    let category = categorize(&candidate.category_labels, &title);

    let id = match candidate.native_id.as_deref().map(str::trim) {
        Some(native) if !native.is_empty() => format!("{}-{native}", ctx.source),
        _ => format!("{}-{}", slug(&format!("{store} {title}")), index + 1),
    };

    Some(Deal {
        id,
        title,
        original_price,
        discounted_price,
        discount,
        store,
        category,
        location: ctx.location.to_string(),
        image: candidate.image.unwrap_or_default(),
        expiry_date: candidate.expiry_date,
        stock: "Available".to_string(),
        is_yellow_sticker: candidate.yellow_sticker,
        source: ctx.source.to_string(),
    })
}

/// Discount percentage from the two prices: `round((orig-disc)/orig*100)`,
/// half-up, clamped to 0 when the prices show no discount.
pub(crate) fn derive_discount(original: f64, discounted: f64) -> i32 {
    if original > discounted && original > 0.0 {
        let percent = ((original - discounted) / original) * 100.0;
        percent.round() as i32
    } else {
        0
    }
}

/// Lower-cased, whitespace collapsed to single hyphens.
fn slug(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
