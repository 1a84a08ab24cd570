mod deals;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use suqdb_core::DealsCache;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DealsCache>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/deals", get(deals::list_deals))
        .route("/api/deals/stores", get(deals::list_stores))
        .route("/api/health", get(health))
        .layer(build_cors())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use suqdb_core::{Category, Deal};
    use tower::ServiceExt;

    fn make_deal(id: &str, store: &str, category: Category, source: &str) -> Deal {
        Deal {
            id: id.to_string(),
            title: format!("Deal {id}"),
            original_price: 8.5,
            discounted_price: 5.9,
            discount: 31,
            store: store.to_string(),
            category,
            location: "Bahrain".to_string(),
            image: String::new(),
            expiry_date: None,
            stock: "Available".to_string(),
            is_yellow_sticker: false,
            source: source.to_string(),
        }
    }

    fn seeded_app() -> Router {
        let cache = Arc::new(DealsCache::new());
        cache.set(
            "lulu",
            vec![
                make_deal("a", "Lulu Hypermarket", Category::Seafood, "lulu"),
                make_deal("b", "Lulu Hypermarket", Category::Electronics, "lulu"),
            ],
        );
        cache.set(
            "alosra",
            vec![make_deal("c", "Alosra", Category::Dairy, "alosra")],
        );
        build_app(AppState { cache })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    #[tokio::test]
    async fn health_returns_ok_with_timestamp() {
        let (status, json) = get_json(seeded_app(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"].as_str(), Some("ok"));
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn list_deals_returns_envelope_with_all_cached_deals() {
        let (status, json) = get_json(seeded_app(), "/api/deals").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"].as_bool(), Some(true));
        assert_eq!(json["count"].as_i64(), Some(3));
        assert!(json["lastUpdated"].is_string());
        assert_eq!(json["deals"].as_array().map(Vec::len), Some(3));
        // Wire shape is camelCase.
        assert!(json["deals"][0]["discountedPrice"].is_number());
    }

    #[tokio::test]
    async fn list_deals_empty_cache_is_success_not_error() {
        let app = build_app(AppState {
            cache: Arc::new(DealsCache::new()),
        });
        let (status, json) = get_json(app, "/api/deals").await;
        assert_eq!(status, StatusCode::OK, "upstream failures never become HTTP errors");
        assert_eq!(json["success"].as_bool(), Some(true));
        assert_eq!(json["count"].as_i64(), Some(0));
        assert!(json["lastUpdated"].is_null());
    }

    #[tokio::test]
    async fn store_filter_matches_source_name_exactly() {
        let (_, json) = get_json(seeded_app(), "/api/deals?store=LULU").await;
        assert_eq!(json["count"].as_i64(), Some(2));
    }

    #[tokio::test]
    async fn store_filter_matches_display_name_substring() {
        let (_, json) = get_json(seeded_app(), "/api/deals?store=hypermarket").await;
        assert_eq!(json["count"].as_i64(), Some(2));
    }

    #[tokio::test]
    async fn store_filter_no_match_returns_empty() {
        let (_, json) = get_json(seeded_app(), "/api/deals?store=carrefour").await;
        assert_eq!(json["count"].as_i64(), Some(0));
        assert_eq!(json["deals"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn category_filter_is_case_insensitive_substring() {
        let (_, json) = get_json(seeded_app(), "/api/deals?category=sea").await;
        assert_eq!(json["count"].as_i64(), Some(1));
        assert_eq!(json["deals"][0]["category"].as_str(), Some("Seafood"));
    }

    #[tokio::test]
    async fn store_and_category_filters_compose() {
        let (_, json) = get_json(seeded_app(), "/api/deals?store=lulu&category=electronics").await;
        assert_eq!(json["count"].as_i64(), Some(1));
        assert_eq!(json["deals"][0]["id"].as_str(), Some("b"));
    }

    #[tokio::test]
    async fn list_stores_returns_distinct_names() {
        let (status, json) = get_json(seeded_app(), "/api/deals/stores").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"].as_bool(), Some(true));
        let stores: Vec<&str> = json["stores"]
            .as_array()
            .expect("stores array")
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(stores, vec!["Lulu Hypermarket", "Alosra"]);
    }
}
