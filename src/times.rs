//! Showtime token extraction from free-form schedule text.
//!
//! comingsoon.it mixes times and prices on the same line, e.g.
//! `"Sala 1 | Posti 447  17.30 / 7,00€ - 19.35 / 7,00€"`.

use once_cell::sync::Lazy;
use regex::Regex;

// Loose clock-like pattern; the comma variant catches european price notation
// so it can be told apart from a genuine time below.
static TIME_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}[.:,]\d{2})\b").expect("time token regex"));

/// Extracts validated time tokens in `HH.MM` form, in text order.
///
/// Never fails: tokens that don't parse or look like currency amounts are
/// silently dropped, and text with no valid token yields an empty vec.
pub fn extract_times(text: &str) -> Vec<String> {
    let mut times = Vec::new();

    for token in TIME_TOKEN.find_iter(text) {
        let raw = token.as_str();
        let normalized = raw.replace([':', ','], ".");

        let Ok(value) = normalized.parse::<f64>() else {
            continue;
        };
        // Anything past 24 is a year, a seat count, a price in cents...
        if !(0.0..24.0).contains(&value) {
            continue;
        }
        // Small comma-decimal numbers are prices ("7,00€"), not times.
        if raw.contains(',') && value < 10.0 {
            continue;
        }

        times.push(normalized);
    }

    times
}
