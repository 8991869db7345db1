//! Calendar date reconstruction from the partial day fragments shown on
//! ticket pages (weekday label, day of month, three-letter month, no year).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::ShowtimeSlot;

/// Italian month abbreviations as comingsoon.it prints them.
const MONTH_ABBREVIATIONS: [(&str, u32); 12] = [
    ("GEN", 1),
    ("FEB", 2),
    ("MAR", 3),
    ("APR", 4),
    ("MAG", 5),
    ("GIU", 6),
    ("LUG", 7),
    ("AGO", 8),
    ("SET", 9),
    ("OTT", 10),
    ("NOV", 11),
    ("DIC", 12),
];

pub fn month_number(abbreviation: &str) -> u32 {
    let upper = abbreviation.to_uppercase();
    match MONTH_ABBREVIATIONS.iter().find(|(name, _)| *name == upper) {
        Some((_, number)) => *number,
        None => {
            warn!(month = %abbreviation, "unknown month abbreviation, defaulting to gennaio");
            1
        }
    }
}

/// Rebuilds a full ISO date from a (day, month abbreviation) fragment.
///
/// Listings roll over the year boundary without ever printing a year: a month
/// earlier than the reference month, or the same month with an earlier day,
/// belongs to next year.
pub fn resolve_date(day: u32, month_abbreviation: &str, today: NaiveDate) -> String {
    let month = month_number(month_abbreviation);
    let mut year = today.year();
    if month < today.month() || (month == today.month() && day < today.day()) {
        year += 1;
    }
    format!("{year:04}-{month:02}-{day:02}")
}

/// Collects (date, weekday, times) fragments, merging repeats of the same
/// composed date. Ticket pages repeat day blocks; no showtime may be lost to
/// that repetition.
#[derive(Debug, Default)]
pub struct SlotMap {
    slots: BTreeMap<String, (String, BTreeSet<String>)>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions `times` into the entry for `date`. The first weekday label seen
    /// for a date wins.
    pub fn add(&mut self, date: String, weekday: &str, times: impl IntoIterator<Item = String>) {
        let entry = self
            .slots
            .entry(date)
            .or_insert_with(|| (weekday.to_string(), BTreeSet::new()));
        entry.1.extend(times);
    }

    /// Finished schedule, ascending by date. Dates that never collected a
    /// valid time are dropped.
    pub fn into_slots(self) -> Vec<ShowtimeSlot> {
        self.slots
            .into_iter()
            .filter(|(_, (_, times))| !times.is_empty())
            .map(|(date, (weekday, times))| ShowtimeSlot {
                date,
                weekday,
                times: times.into_iter().collect(),
            })
            .collect()
    }
}
