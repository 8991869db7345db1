//! Showtime extraction and digest rendering for the Matera cinemas listed on
//! comingsoon.it.
//!
//! List pages carry one "film card" per title; ticket pages carry the full
//! multi-day calendar. The pipeline extracts both, merges them per venue and
//! renders a Telegram-ready digest grouped by film and compact date ranges.

use serde::{Deserialize, Serialize};

pub mod dates;
pub mod detail;
pub mod digest;
pub mod dom;
pub mod enrich;
pub mod fetch;
pub mod listing;
pub mod scrape;
pub mod times;
pub mod trakt;

/// One calendar date with the distinct start times for a film at a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowtimeSlot {
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "giorno")]
    pub weekday: String,
    #[serde(rename = "orari")]
    pub times: Vec<String>,
}

/// Common film data structure the extraction pipeline produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    #[serde(rename = "titolo")]
    pub title: String,
    /// Times as printed on the list page. Kept as a fallback even when the
    /// ticket page supplies the full calendar in `schedule`.
    #[serde(rename = "orari")]
    pub times: Vec<String>,
    #[serde(rename = "sala")]
    pub room: Option<String>,
    #[serde(rename = "programmazione")]
    pub schedule: Vec<ShowtimeSlot>,
}

/// One listing source: a venue with its page URL and extracted film set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cinema {
    #[serde(rename = "cinema")]
    pub name: String,
    pub url: String,
    #[serde(rename = "film")]
    pub films: Vec<Film>,
}

/// Top-level artifact of one scrape pass across all venues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeSnapshot {
    pub timestamp: String,
    #[serde(rename = "cinema")]
    pub cinemas: Vec<Cinema>,
}
