//! Reconciles a freshly scraped batch against the persistent store.
//!
//! The store must converge to "currently true": upsert what the sources
//! offer now, delete what they no longer offer, and delete anything past
//! its expiry date — without ever interpreting a failed scrape as "nothing
//! is offered anymore".

use chrono::NaiveDate;
use sqlx::PgPool;

use suqdb_core::Deal;

use crate::deals::{delete_deals_not_in, delete_expired_deals, upsert_deal};
use crate::DbError;

/// Outcome of one synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub upserted: usize,
    pub stale_deleted: u64,
    pub expired_deleted: u64,
    /// `true` when the batch had no active deals and the store was left
    /// untouched.
    pub skipped: bool,
}

/// Makes the store match `batch` as of `today`.
///
/// 1. Deals already expired are excluded from the write.
/// 2. An empty surviving batch skips everything — all sources failing must
///    never be read as "everything is now stale".
/// 3. Surviving deals are upserted by id; any upsert error aborts before
///    the delete steps, so the store is never thinned out without a
///    confirmed replacement set.
/// 4. Stored rows absent from the surviving id set are deleted, then, as an
///    independent pass, rows whose expiry date has passed. Delete failures
///    are logged and do not roll back the committed upserts.
///
/// # Errors
///
/// Returns [`DbError`] only for upsert failures; see above for delete
/// failure semantics.
pub async fn sync_deals(
    pool: &PgPool,
    batch: &[Deal],
    today: NaiveDate,
) -> Result<SyncSummary, DbError> {
    let active: Vec<&Deal> = batch.iter().filter(|d| !d.is_expired(today)).collect();
    let excluded = batch.len() - active.len();
    if excluded > 0 {
        tracing::info!(excluded, "excluding already-expired deals from sync");
    }

    if active.is_empty() {
        tracing::warn!("no active deals in batch; leaving persistent store untouched");
        return Ok(SyncSummary {
            skipped: true,
            ..SyncSummary::default()
        });
    }

    for deal in &active {
        upsert_deal(pool, deal).await?;
    }

    let fresh_ids: Vec<String> = active.iter().map(|d| d.id.clone()).collect();
    let stale_deleted = match delete_deals_not_in(pool, &fresh_ids).await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(error = %e, "stale-deal removal failed; upserts remain committed");
            0
        }
    };

    let expired_deleted = match delete_expired_deals(pool, today).await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(error = %e, "expired-deal removal failed; upserts remain committed");
            0
        }
    };

    Ok(SyncSummary {
        upserted: active.len(),
        stale_deleted,
        expired_deleted,
        skipped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use suqdb_core::Category;

    fn make_deal(id: &str) -> Deal {
        Deal {
            id: id.to_string(),
            title: format!("Deal {id}"),
            original_price: 8.5,
            discounted_price: 5.9,
            discount: 31,
            store: "Lulu Hypermarket".to_string(),
            category: Category::Seafood,
            location: "Bahrain".to_string(),
            image: String::new(),
            expiry_date: None,
            stock: "Available".to_string(),
            is_yellow_sticker: false,
            source: "lulu".to_string(),
        }
    }

    fn make_expiring_deal(id: &str, expiry: NaiveDate) -> Deal {
        Deal {
            expiry_date: Some(expiry),
            ..make_deal(id)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    async fn stored_ids(pool: &PgPool) -> Vec<String> {
        crate::deals::list_deals(pool)
            .await
            .expect("list deals")
            .into_iter()
            .map(|r| r.id)
            .collect()
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn upserts_fresh_batch(pool: PgPool) {
        let batch = vec![make_deal("a"), make_deal("b")];
        let summary = sync_deals(&pool, &batch, date(2026, 8, 5)).await.expect("sync");

        assert_eq!(summary.upserted, 2);
        assert!(!summary.skipped);
        assert_eq!(stored_ids(&pool).await, vec!["a", "b"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn upsert_preserves_field_values(pool: PgPool) {
        let batch = vec![make_deal("a")];
        sync_deals(&pool, &batch, date(2026, 8, 5)).await.expect("sync");

        let rows = crate::deals::list_deals(&pool).await.expect("list");
        let row = &rows[0];
        assert_eq!(row.title, "Deal a");
        assert_eq!(row.discount, 31);
        assert_eq!(row.category, "Seafood");
        assert_eq!(row.store, "Lulu Hypermarket");
        assert_eq!(row.source.as_deref(), Some("lulu"));
        // NUMERIC(10,3) round-trips the scraped price exactly.
        assert_eq!(
            row.discounted_price,
            Some(rust_decimal::Decimal::new(5900, 3))
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn sync_is_idempotent(pool: PgPool) {
        let batch = vec![make_deal("a"), make_deal("b")];

        let first = sync_deals(&pool, &batch, date(2026, 8, 5)).await.expect("sync");
        let second = sync_deals(&pool, &batch, date(2026, 8, 5)).await.expect("sync");

        assert_eq!(first.upserted, 2);
        assert_eq!(second.upserted, 2);
        assert_eq!(second.stale_deleted, 0, "identical batch deletes nothing");
        assert_eq!(stored_ids(&pool).await, vec!["a", "b"]);
        assert_eq!(crate::deals::count_deals(&pool).await.expect("count"), 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn removes_deals_missing_from_fresh_batch(pool: PgPool) {
        let initial = vec![make_deal("a"), make_deal("b"), make_deal("c")];
        sync_deals(&pool, &initial, date(2026, 8, 5)).await.expect("sync");

        let fresh = vec![make_deal("a"), make_deal("b")];
        let summary = sync_deals(&pool, &fresh, date(2026, 8, 5)).await.expect("sync");

        assert_eq!(summary.stale_deleted, 1);
        assert_eq!(stored_ids(&pool).await, vec!["a", "b"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn expired_deal_in_fresh_batch_is_not_written(pool: PgPool) {
        let today = date(2026, 8, 5);
        let batch = vec![
            make_deal("fresh"),
            make_expiring_deal("stale", date(2026, 8, 4)),
        ];
        let summary = sync_deals(&pool, &batch, today).await.expect("sync");

        assert_eq!(summary.upserted, 1);
        assert_eq!(stored_ids(&pool).await, vec!["fresh"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn already_stored_deal_is_removed_once_expired(pool: PgPool) {
        // Day 1: the deal is current and gets stored.
        let batch = vec![
            make_deal("keeper"),
            make_expiring_deal("short-lived", date(2026, 8, 4)),
        ];
        sync_deals(&pool, &batch, date(2026, 8, 1)).await.expect("sync");
        assert_eq!(stored_ids(&pool).await, vec!["keeper", "short-lived"]);

        // Day 5: the same batch is scraped again, but the expiry has
        // passed; the second pass removes the stored copy too.
        let summary = sync_deals(&pool, &batch, date(2026, 8, 5)).await.expect("sync");

        assert_eq!(summary.upserted, 1);
        assert_eq!(stored_ids(&pool).await, vec!["keeper"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn deal_expiring_today_is_still_current(pool: PgPool) {
        let today = date(2026, 8, 5);
        let batch = vec![make_expiring_deal("today", today)];
        let summary = sync_deals(&pool, &batch, today).await.expect("sync");

        assert_eq!(summary.upserted, 1);
        assert_eq!(stored_ids(&pool).await, vec!["today"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn empty_batch_leaves_store_untouched(pool: PgPool) {
        let initial = vec![make_deal("a"), make_deal("b")];
        sync_deals(&pool, &initial, date(2026, 8, 5)).await.expect("sync");

        // All sources failed: the batch is empty. Nothing may be deleted.
        let summary = sync_deals(&pool, &[], date(2026, 8, 6)).await.expect("sync");

        assert!(summary.skipped);
        assert_eq!(summary.upserted, 0);
        assert_eq!(summary.stale_deleted, 0);
        assert_eq!(summary.expired_deleted, 0);
        assert_eq!(stored_ids(&pool).await, vec!["a", "b"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn all_expired_batch_counts_as_empty(pool: PgPool) {
        let initial = vec![make_deal("a")];
        sync_deals(&pool, &initial, date(2026, 8, 5)).await.expect("sync");

        let batch = vec![make_expiring_deal("old", date(2026, 1, 1))];
        let summary = sync_deals(&pool, &batch, date(2026, 8, 5)).await.expect("sync");

        assert!(summary.skipped, "a fully expired batch must not trigger deletes");
        assert_eq!(stored_ids(&pool).await, vec!["a"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn updates_changed_fields_in_place(pool: PgPool) {
        sync_deals(&pool, &[make_deal("a")], date(2026, 8, 5)).await.expect("sync");

        let mut updated = make_deal("a");
        updated.discounted_price = 4.5;
        updated.discount = 47;
        updated.stock = "Low".to_string();
        sync_deals(&pool, &[updated], date(2026, 8, 5)).await.expect("sync");

        let rows = crate::deals::list_deals(&pool).await.expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].discount, 47);
        assert_eq!(rows[0].stock, "Low");
        assert_eq!(
            rows[0].discounted_price,
            Some(rust_decimal::Decimal::new(4500, 3))
        );
    }
}
