//! Schedule extraction from a film's ticketing page.
//!
//! Each visible day is a `media mbm` block: the `media-left` column carries
//! weekday/day/month labels, the `media-body` column the time buttons.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ShowtimeSlot;
use crate::dates::{SlotMap, resolve_date};
use crate::dom::Page;

static STRICT_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("strict time regex"));

/// Walks the day blocks of a ticketing page and rebuilds the film's calendar.
/// `today` anchors the year inference.
pub fn extract_schedule(page: &Page, today: NaiveDate) -> Vec<ShowtimeSlot> {
    let mut slots = SlotMap::new();

    for block in page.root().find_all("div.media.mbm") {
        let Some(marker) = block.find_first("div.media-left") else {
            continue;
        };
        let (Some(weekday), Some(day), Some(month)) = (
            marker.find_first("span.weekday").map(|n| n.text()),
            marker.find_first("span.day").map(|n| n.text()),
            marker.find_first("span.month").map(|n| n.text()),
        ) else {
            continue;
        };
        if weekday.is_empty() || day.is_empty() || month.is_empty() {
            continue;
        }
        let Ok(day_number) = day.parse::<u32>() else {
            continue;
        };

        let mut times = Vec::new();
        if let Some(body) = block.find_first("div.media-body") {
            for button in body.find_all("button.btn-fab") {
                let text = button.text();
                if let Some(caps) = STRICT_TIME.captures(&text)
                    && let (Ok(hour), Ok(minute)) =
                        (caps[1].parse::<u32>(), caps[2].parse::<u32>())
                    && hour < 24
                    && minute < 60
                {
                    times.push(text);
                }
            }
        }

        slots.add(resolve_date(day_number, &month, today), &weekday, times);
    }

    slots.into_slots()
}
