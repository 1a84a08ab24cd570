//! Adapter output contract.
//!
//! ## Observed signals across the configured storefronts
//!
//! Sources disagree wildly on what they expose, so everything beyond a
//! title and a discounted-price signal is optional:
//!
//! - Server-rendered grids (Magento 2) carry a special price and sometimes
//!   an old price; no SKU, no category labels.
//! - Rendered pages expose the same fields only after lazy loading, and
//!   some aggregator cards embed the retailer name in the card itself
//!   (`store`).
//! - The storefront GraphQL API returns SKUs, category labels, and a
//!   source-computed discount percentage, but may report prices as `0`
//!   to anonymous callers. Zero prices mean "unknown", never "free" —
//!   the normalizer drops such candidates rather than inventing a 100%
//!   discount.

use chrono::NaiveDate;

/// One unvalidated product offer as emitted by an extraction strategy.
///
/// Validation and canonicalization happen in [`crate::normalize`]; a
/// candidate missing a title or a positive discounted price never becomes
/// a `Deal`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCandidate {
    pub title: String,
    /// Current offer price. `0.0` means the source did not reveal a usable
    /// price; the candidate will be dropped.
    pub discounted_price: f64,
    /// Pre-discount price, when the source exposes one. Defaults to the
    /// discounted price during normalization.
    pub original_price: Option<f64>,
    /// Discount percentage as reported by the source itself, when it
    /// computes one.
    pub discount_percent: Option<i32>,
    pub image: Option<String>,
    /// Source-native identifier (e.g. SKU). When present it anchors the
    /// deal id across cycles.
    pub native_id: Option<String>,
    /// Retailer name carried inside the listing itself (aggregator feeds);
    /// overrides the source's default store name.
    pub store: Option<String>,
    /// Structured category labels from the source, consulted before title
    /// keywords.
    pub category_labels: Vec<String>,
    pub expiry_date: Option<NaiveDate>,
    pub yellow_sticker: bool,
}
