//! Canonical retailer display names.
//!
//! Source markup spells the same retailer several ways ("HyperMax",
//! "Hyper Max", "hypermax"); the lookup table collapses the variants so
//! filtering and store listings see one name per retailer.

/// Exact-match (case-insensitive) spelling variants → canonical name.
const STORE_NAMES: &[(&str, &str)] = &[
    ("lulu hypermarket", "Lulu Hypermarket"),
    ("hypermax", "HyperMax"),
    ("hyper max", "HyperMax"),
    ("sharaf dg", "Sharaf DG"),
    ("extra", "eXtra"),
    ("nesto", "Nesto"),
    ("ansar gallery", "Ansar Gallery"),
    ("taj mobiles", "Taj Mobiles"),
    ("arafa phones", "Arafa Phones"),
    ("carrefour", "Carrefour"),
    ("ramez", "Ramez"),
    ("al jazira", "Al Jazira"),
    ("alosra", "Alosra"),
];

/// Maps a raw store name to its canonical display form.
///
/// Unmapped names pass through unchanged (trimmed), so a new retailer
/// appearing in an aggregator feed still surfaces under its own name.
#[must_use]
pub fn normalize_store_name(name: &str) -> String {
    let trimmed = name.trim();
    let lower = trimmed.to_lowercase();
    STORE_NAMES
        .iter()
        .find(|(variant, _)| *variant == lower)
        .map_or_else(|| trimmed.to_string(), |(_, canonical)| (*canonical).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_case_variants() {
        assert_eq!(normalize_store_name("LULU HYPERMARKET"), "Lulu Hypermarket");
        assert_eq!(normalize_store_name("hypermax"), "HyperMax");
    }

    #[test]
    fn collapses_spacing_variants() {
        assert_eq!(normalize_store_name("Hyper Max"), "HyperMax");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize_store_name("  Nesto  "), "Nesto");
    }

    #[test]
    fn unmapped_names_pass_through() {
        assert_eq!(normalize_store_name("Midway Supermarket"), "Midway Supermarket");
    }
}
