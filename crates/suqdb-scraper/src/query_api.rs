//! Query-API extraction strategy.
//!
//! One storefront exposes its deal catalog through a public Magento
//! GraphQL endpoint, which is far more stable than its markup. A single
//! paginated query pulls the deal category; fields map structurally — no
//! DOM parsing.
//!
//! ## Observed shape from the live endpoint
//!
//! - Anonymous callers may receive `0` for both `regular_price` and
//!   `final_price`. Zero means the price is withheld, not that the item is
//!   free; such values are surfaced as "unknown" and never turned into a
//!   100% discount.
//! - `discount.percent_off` is source-computed and preferred over deriving
//!   from the two prices when present.
//! - `categories[].name` carries the storefront's own taxonomy, which the
//!   categorizer consults before falling back to title keywords.

use reqwest::header;
use serde::Deserialize;

use suqdb_core::SourceConfig;

use crate::candidate::RawCandidate;
use crate::error::ScrapeError;

/// Product query against the storefront deal category. `categoryId`,
/// `page`, and `pageSize` arrive as variables.
const DEALS_QUERY: &str = "\
query DealProducts($categoryId: String!, $page: Int!, $pageSize: Int!) {\n\
  products(\n\
    filter: { category_id: { eq: $categoryId } }\n\
    currentPage: $page\n\
    pageSize: $pageSize\n\
    sort: { name: ASC }\n\
  ) {\n\
    total_count\n\
    items {\n\
      name\n\
      sku\n\
      image { url }\n\
      categories { name }\n\
      price_range {\n\
        minimum_price {\n\
          regular_price { value currency }\n\
          final_price { value currency }\n\
          discount { amount_off percent_off }\n\
        }\n\
      }\n\
    }\n\
  }\n\
}";

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(default)]
    products: Option<ProductsPayload>,
}

#[derive(Debug, Deserialize)]
struct ProductsPayload {
    #[serde(default)]
    total_count: Option<i64>,
    #[serde(default)]
    items: Option<Vec<ApiProduct>>,
}

#[derive(Debug, Deserialize)]
struct ApiProduct {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    image: Option<ApiImage>,
    #[serde(default)]
    categories: Option<Vec<ApiCategory>>,
    #[serde(default)]
    price_range: Option<ApiPriceRange>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCategory {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPriceRange {
    #[serde(default)]
    minimum_price: Option<ApiMinimumPrice>,
}

#[derive(Debug, Deserialize)]
struct ApiMinimumPrice {
    #[serde(default)]
    regular_price: Option<ApiMoney>,
    #[serde(default)]
    final_price: Option<ApiMoney>,
    #[serde(default)]
    discount: Option<ApiDiscount>,
}

#[derive(Debug, Deserialize)]
struct ApiMoney {
    #[serde(default)]
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiDiscount {
    #[serde(default)]
    percent_off: Option<f64>,
}

/// Fetches and maps candidates for an `api`-strategy source.
///
/// # Errors
///
/// Returns [`ScrapeError`] on network failure, a non-2xx status, or a
/// response body that does not match the expected shape. A well-formed
/// response without product data is a zero-result outcome, not an error.
pub async fn fetch_api_candidates(
    client: &reqwest::Client,
    source: &SourceConfig,
    category_id: &str,
    page_size: u32,
) -> Result<Vec<RawCandidate>, ScrapeError> {
    let body = serde_json::json!({
        "query": DEALS_QUERY,
        "variables": { "categoryId": category_id, "page": 1, "pageSize": page_size },
    });

    let response = client
        .post(&source.url)
        .header(header::ACCEPT, "application/json")
        .json(&body)
        .send()
        .await?;
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ScrapeError::NotFound {
            url: source.url.clone(),
        });
    }
    if !status.is_success() {
        return Err(ScrapeError::UnexpectedStatus {
            status: status.as_u16(),
            url: source.url.clone(),
        });
    }

    let text = response.text().await?;
    let parsed: GraphqlResponse =
        serde_json::from_str(&text).map_err(|e| ScrapeError::Deserialize {
            context: format!("deal products from {}", source.url),
            source: e,
        })?;

    let Some(products) = parsed.data.and_then(|d| d.products) else {
        tracing::info!(source = %source.name, "query API returned no product data");
        return Ok(Vec::new());
    };

    let items = products.items.unwrap_or_default();
    tracing::debug!(
        source = %source.name,
        total_available = products.total_count.unwrap_or(0),
        fetched = items.len(),
        "query API page fetched"
    );

    Ok(items.into_iter().filter_map(map_product).collect())
}

/// Maps one API product onto the candidate shape. Items without a name are
/// discarded here; price validation happens in the normalizer.
fn map_product(product: ApiProduct) -> Option<RawCandidate> {
    let title = product.name.filter(|n| !n.trim().is_empty())?;

    let minimum_price = product.price_range.and_then(|r| r.minimum_price);
    let (regular, fin, percent_off) = match minimum_price {
        Some(p) => (
            p.regular_price.and_then(|m| m.value),
            p.final_price.and_then(|m| m.value),
            p.discount.and_then(|d| d.percent_off),
        ),
        None => (None, None, None),
    };

    // Zero-valued prices are "unknown", not free.
    let original_price = regular.filter(|v| *v > 0.0);
    let discounted_price = fin.filter(|v| *v > 0.0).unwrap_or(0.0);
    let discount_percent = percent_off
        .map(|p| p.round() as i32)
        .filter(|p| *p > 0);

    Some(RawCandidate {
        title,
        discounted_price,
        original_price,
        discount_percent,
        image: product.image.and_then(|i| i.url).filter(|u| !u.is_empty()),
        native_id: product.sku.filter(|s| !s.trim().is_empty()),
        category_labels: product
            .categories
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.name)
            .collect(),
        ..RawCandidate::default()
    })
}
