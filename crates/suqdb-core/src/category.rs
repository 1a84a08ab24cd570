//! Fixed category taxonomy and the shared keyword categorizer.
//!
//! All sources run through one ordered rule set so category semantics stay
//! source-independent: structured category labels (when a source exposes
//! them) are consulted first, then the product title, and anything that
//! matches nothing lands in the general [`Category::Groceries`] bucket.

use serde::{Deserialize, Serialize};

/// Product category assigned during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Seafood,
    Meat,
    Dairy,
    Fruits,
    Vegetables,
    Bakery,
    Beverages,
    Snacks,
    Household,
    Baby,
    #[serde(rename = "Health & Beauty")]
    HealthBeauty,
    Fragrances,
    #[serde(rename = "Premium Nuts")]
    PremiumNuts,
    #[serde(rename = "Premium Dry Fruits")]
    PremiumDryFruits,
    Electronics,
    Appliances,
    /// Catch-all bucket for uncategorized grocery items.
    #[default]
    Groceries,
}

impl Category {
    /// Display name as it appears on the wire and in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Seafood => "Seafood",
            Category::Meat => "Meat",
            Category::Dairy => "Dairy",
            Category::Fruits => "Fruits",
            Category::Vegetables => "Vegetables",
            Category::Bakery => "Bakery",
            Category::Beverages => "Beverages",
            Category::Snacks => "Snacks",
            Category::Household => "Household",
            Category::Baby => "Baby",
            Category::HealthBeauty => "Health & Beauty",
            Category::Fragrances => "Fragrances",
            Category::PremiumNuts => "Premium Nuts",
            Category::PremiumDryFruits => "Premium Dry Fruits",
            Category::Electronics => "Electronics",
            Category::Appliances => "Appliances",
            Category::Groceries => "Groceries",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rules applied to structured category labels from sources that expose
/// them (e.g. storefront API category names). Evaluated per label, in order.
const LABEL_RULES: &[(&[&str], Category)] = &[
    (&["meat", "poultry"], Category::Meat),
    (&["fish", "seafood"], Category::Seafood),
    (&["dairy", "milk", "cheese"], Category::Dairy),
    (&["fruit"], Category::Fruits),
    (&["vegetable"], Category::Vegetables),
    (&["bread", "bakery"], Category::Bakery),
    (&["beverage", "drink", "juice"], Category::Beverages),
    (&["snack", "chocolate", "candy"], Category::Snacks),
    (&["cleaning", "household"], Category::Household),
    (&["baby"], Category::Baby),
    (&["health", "beauty", "personal"], Category::HealthBeauty),
];

/// Rules applied to the product title when no label matched. First match
/// wins, so e.g. "apple" resolves to Fruits before the electronics rules
/// are ever consulted.
const TITLE_RULES: &[(&[&str], Category)] = &[
    (
        &["salmon", "fish", "shrimp", "prawns", "tuna", "crab", "lobster", "seafood"],
        Category::Seafood,
    ),
    (&["chicken", "beef", "lamb", "meat", "steak"], Category::Meat),
    (&["milk", "cheese", "yogurt", "dairy", "butter"], Category::Dairy),
    (
        &["apple", "banana", "mango", "fruit", "berry", "grape"],
        Category::Fruits,
    ),
    (
        &["vegetable", "tomato", "potato", "onion", "carrot"],
        Category::Vegetables,
    ),
    (
        &["perfume", "fragrance", "cologne", "edt", "edp"],
        Category::Fragrances,
    ),
    (&["nuts", "pistachio", "almond", "cashew"], Category::PremiumNuts),
    (&["dates", "dried", "raisin"], Category::PremiumDryFruits),
    (
        &[
            "phone", "laptop", "tv", "television", "electronic", "samsung", "iphone", "airpod",
            "galaxy", "ipad", "macbook",
        ],
        Category::Electronics,
    ),
    (
        &["washer", "fridge", "refrigerator", "microwave", "oven", "blender", "appliance"],
        Category::Appliances,
    ),
    (
        &["rice", "oil", "sugar", "flour", "spice", "coffee", "tea"],
        Category::Groceries,
    ),
];

/// Resolves a category from source-provided labels and the product title.
///
/// Labels are checked first (in the order the source listed them), the
/// title second; the first matching rule wins. Missing or unmatched inputs
/// fall through to [`Category::Groceries`] — this function never fails.
#[must_use]
pub fn categorize(labels: &[String], title: &str) -> Category {
    for label in labels {
        let lower = label.to_lowercase();
        for (keywords, category) in LABEL_RULES {
            if keywords.iter().any(|k| lower.contains(k)) {
                return *category;
            }
        }
    }

    let lower = title.to_lowercase();
    for (keywords, category) in TITLE_RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *category;
        }
    }

    Category::Groceries
}
