//! Database operations for the `deals` table.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `deals` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DealRow {
    pub id: String,
    pub title: String,
    /// Scrape-time `f64` prices land here as fixed-scale `NUMERIC(10,3)`;
    /// the cast happens in the upsert statement.
    pub original_price: Option<Decimal>,
    pub discounted_price: Option<Decimal>,
    pub discount: i32,
    pub store: String,
    pub category: String,
    pub location: String,
    pub image: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub stock: String,
    pub is_yellow_sticker: bool,
    pub source: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Upserts one deal by id, overwriting every field and stamping
/// `updated_at`.
///
/// The statement is atomic per record (single `INSERT ... ON CONFLICT`),
/// so a concurrent reader never observes a partially written row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_deal(pool: &PgPool, deal: &suqdb_core::Deal) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO deals \
             (id, title, original_price, discounted_price, discount, store, \
              category, location, image, expiry_date, stock, is_yellow_sticker, source) \
         VALUES ($1, $2, $3::numeric(10,3), $4::numeric(10,3), $5, $6, \
                 $7, $8, $9, $10, $11, $12, $13) \
         ON CONFLICT (id) DO UPDATE SET \
             title             = EXCLUDED.title, \
             original_price    = EXCLUDED.original_price, \
             discounted_price  = EXCLUDED.discounted_price, \
             discount          = EXCLUDED.discount, \
             store             = EXCLUDED.store, \
             category          = EXCLUDED.category, \
             location          = EXCLUDED.location, \
             image             = EXCLUDED.image, \
             expiry_date       = EXCLUDED.expiry_date, \
             stock             = EXCLUDED.stock, \
             is_yellow_sticker = EXCLUDED.is_yellow_sticker, \
             source            = EXCLUDED.source, \
             updated_at        = NOW()",
    )
    .bind(&deal.id)
    .bind(&deal.title)
    .bind(deal.original_price)
    .bind(deal.discounted_price)
    .bind(deal.discount)
    .bind(&deal.store)
    .bind(deal.category.as_str())
    .bind(&deal.location)
    .bind(&deal.image)
    .bind(deal.expiry_date)
    .bind(&deal.stock)
    .bind(deal.is_yellow_sticker)
    .bind(&deal.source)
    .execute(pool)
    .await?;

    Ok(())
}

/// Deletes every stored deal whose id is not in `fresh_ids`. This is the
/// staleness removal step — products no longer offered by any source.
///
/// Returns the number of rows deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_deals_not_in(pool: &PgPool, fresh_ids: &[String]) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM deals WHERE NOT (id = ANY($1))")
        .bind(fresh_ids)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Deletes every stored deal whose expiry date is strictly before `today`,
/// regardless of whether it appeared in the latest batch. Rows without an
/// expiry date are never touched.
///
/// Returns the number of rows deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_expired_deals(pool: &PgPool, today: NaiveDate) -> Result<u64, DbError> {
    let result =
        sqlx::query("DELETE FROM deals WHERE expiry_date IS NOT NULL AND expiry_date < $1")
            .bind(today)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

/// Returns all stored deals ordered by id, for read-back verification.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_deals(pool: &PgPool) -> Result<Vec<DealRow>, DbError> {
    let rows = sqlx::query_as::<_, DealRow>(
        "SELECT id, title, original_price, discounted_price, discount, store, \
                category, location, image, expiry_date, stock, is_yellow_sticker, \
                source, updated_at \
         FROM deals \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Returns the number of stored deals.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_deals(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM deals")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
