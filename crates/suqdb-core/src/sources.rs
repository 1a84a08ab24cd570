//! Source configuration: which storefronts to scrape and how.
//!
//! Loaded from a YAML file (`config/sources.yaml` by default) and validated
//! at startup. Each source names its extraction strategy as a tagged
//! variant, so adding a strategy never touches existing source entries,
//! and may override the default selector fallback lists.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One external storefront to extract deals from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Adapter name; also the cache partition key and `Deal::source` value.
    pub name: String,
    /// Default retailer display name for deals from this source.
    pub store: String,
    /// Page or endpoint the strategy operates on.
    pub url: String,
    #[serde(flatten)]
    pub strategy: Strategy,
    /// Optional override of the selector fallback lists. Fields left out
    /// in YAML keep their defaults.
    #[serde(default)]
    pub selectors: Option<SelectorSet>,
}

/// Extraction strategy, selected per source at configuration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum Strategy {
    /// One HTTP GET, parse the server-rendered markup.
    Static {
        /// Second page to try when the primary yields no candidates
        /// (e.g. a catalog aggregator mirror of the same retailer).
        #[serde(default)]
        fallback_url: Option<String>,
    },
    /// Drive a headless browser: navigate, wait, scroll, extract from the
    /// live document.
    Browser,
    /// Query a structured storefront API (GraphQL) with pagination.
    Api {
        /// Storefront category holding the deal products.
        category_id: String,
        #[serde(default = "default_page_size")]
        page_size: u32,
    },
}

fn default_page_size() -> u32 {
    50
}

/// Prioritized CSS selector lists for DOM-based strategies. Evaluated in
/// order; the first selector that yields results wins, so a minor markup
/// change degrades to fewer deals instead of zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSet {
    /// Product container candidates.
    pub containers: Vec<String>,
    pub title: Vec<String>,
    /// Discounted-price candidates.
    pub price: Vec<String>,
    pub original_price: Vec<String>,
    pub image: Vec<String>,
}

impl Default for SelectorSet {
    fn default() -> Self {
        fn list(items: &[&str]) -> Vec<String> {
            items.iter().map(ToString::to_string).collect()
        }
        // Covers the Magento 2 grids and the bespoke card layouts observed
        // across the configured storefronts.
        Self {
            containers: list(&[
                ".product-item",
                ".product-card",
                "[data-product]",
                ".plp-card",
                ".products-grid .item",
                ".category-products .item",
            ]),
            title: list(&[
                ".product-item-name",
                ".product-name",
                ".product-title",
                "h3",
                "h4",
            ]),
            price: list(&[
                ".special-price .price",
                ".special-price",
                ".sale-price",
                ".price--sale",
            ]),
            original_price: list(&[
                ".old-price .price",
                ".old-price",
                ".regular-price",
                ".price--regular",
            ]),
            image: list(&["img"]),
        }
    }
}

/// Top-level shape of the sources file.
#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

/// Load and validate the source configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SourcesFileParse)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    if sources_file.sources.is_empty() {
        return Err(ConfigError::Validation(
            "sources file declares no sources".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();

    for source in &sources_file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }
        if source.store.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{}' has an empty store display name",
                source.name
            )));
        }
        if source.url.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{}' has an empty url",
                source.name
            )));
        }

        if let Strategy::Api {
            category_id,
            page_size,
        } = &source.strategy
        {
            if category_id.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "source '{}' uses the api strategy but has an empty category_id",
                    source.name
                )));
            }
            if *page_size == 0 {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has page_size 0; must be at least 1",
                    source.name
                )));
            }
        }

        let lower_name = source.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }
    }

    Ok(())
}
