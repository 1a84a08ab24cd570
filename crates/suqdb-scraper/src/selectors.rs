//! Ordered-selector-fallback evaluation over parsed markup.
//!
//! Storefront markup is unstable and undocumented, so nothing here commits
//! to a single selector: every lookup walks a prioritized candidate list
//! and the first selector that yields something wins. A minor markup change
//! then degrades to fewer extracted fields instead of an empty batch.

use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;

pub(crate) fn parse_selector(raw: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(raw).map_err(|e| ScrapeError::Selector {
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Returns the matches of the first container selector that selects
/// anything; an empty vec when none of them do.
pub(crate) fn select_containers<'a>(
    document: &'a Html,
    candidates: &[String],
) -> Result<Vec<ElementRef<'a>>, ScrapeError> {
    for raw in candidates {
        let selector = parse_selector(raw)?;
        let matches: Vec<ElementRef<'a>> = document.select(&selector).collect();
        if !matches.is_empty() {
            return Ok(matches);
        }
    }
    Ok(Vec::new())
}

/// First non-empty text content among the nested selector candidates.
pub(crate) fn first_text(
    element: ElementRef<'_>,
    candidates: &[String],
) -> Result<Option<String>, ScrapeError> {
    for raw in candidates {
        let selector = parse_selector(raw)?;
        if let Some(node) = element.select(&selector).next() {
            let text: String = node.text().collect();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }
    Ok(None)
}

/// First non-empty `attr` value among the nested selector candidates.
pub(crate) fn first_attr(
    element: ElementRef<'_>,
    candidates: &[String],
    attr: &str,
) -> Result<Option<String>, ScrapeError> {
    for raw in candidates {
        let selector = parse_selector(raw)?;
        for node in element.select(&selector) {
            if let Some(value) = node.value().attr(attr) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Ok(Some(trimmed.to_string()));
                }
            }
        }
    }
    Ok(None)
}

/// Reduces a price string like `"BHD 5.900"` or `"was 12.5 BD"` to its
/// numeric value.
///
/// Non-numeric characters are stripped and the leading number (one decimal
/// point at most) is parsed, so trailing garbage after a second `.` is
/// ignored rather than failing the whole container.
pub(crate) fn parse_price(text: &str) -> Option<f64> {
    let mut number = String::new();
    let mut seen_dot = false;
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            number.push(ch);
        } else if ch == '.' {
            if seen_dot && !number.is_empty() {
                break;
            }
            if !number.is_empty() {
                number.push(ch);
                seen_dot = true;
            }
        }
    }
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}
