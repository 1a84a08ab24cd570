use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// A discounted product offer from one source, normalized for caching,
/// persistence, and the read API.
///
/// Serialized with camelCase keys — this struct is the wire shape returned
/// by the deals endpoint and written to the export sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    /// Stable within a source: the source's native identifier when it has
    /// one, otherwise a slug of store + title plus the batch sequence index.
    pub id: String,
    pub title: String,
    /// Price before discount, in BHD.
    ///
    /// Boundary note: an `f64` at scrape time for convenience; persistence
    /// converts to `NUMERIC(10,3)` in the DB layer (the dinar carries three
    /// decimal places), so values are rounded at write time.
    pub original_price: f64,
    /// Current offer price, in BHD. Always strictly positive — candidates
    /// without a positive price are dropped during normalization.
    ///
    /// Boundary note: converted to `NUMERIC(10,3)` when persisted.
    pub discounted_price: f64,
    /// Discount percentage, either reported by the source or derived from
    /// the two prices. `0` when no discount is observable.
    pub discount: i32,
    /// Canonical retailer display name (e.g. `"Lulu Hypermarket"`).
    pub store: String,
    pub category: Category,
    pub location: String,
    /// Product image URL; empty string when the source provides none.
    pub image: String,
    /// Last day the offer is valid. `None` means no known expiry and is
    /// never treated as expired.
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub stock: String,
    /// Time-limited clearance ("yellow sticker") flag.
    pub is_yellow_sticker: bool,
    /// Name of the adapter that produced this record; used as the cache
    /// partition key and for scoping re-synchronization.
    pub source: String,
}

impl Deal {
    /// Returns `true` if the deal carries an expiry date strictly before
    /// `today`. Deals without an expiry date never expire.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|d| d < today)
    }
}
