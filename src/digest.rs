//! Telegram digest rendering: title → venue → compact date ranges.
//!
//! Pure with respect to its inputs; the emoji prefixes and line shapes are a
//! contract with the downstream bot and must not change.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::ScrapeSnapshot;

/// Display names used by the digest, keyed by full venue name.
pub const SHORT_NAMES: &[(&str, &str)] = &[
    ("Cinema Comunale Guerrieri", "Guerrieri"),
    ("Il Piccolo", "Piccolo"),
    ("UCI Cinemas Red Carpet", "Red Carpet"),
];

const MONTH_NAMES: [&str; 12] = [
    "gennaio",
    "febbraio",
    "marzo",
    "aprile",
    "maggio",
    "giugno",
    "luglio",
    "agosto",
    "settembre",
    "ottobre",
    "novembre",
    "dicembre",
];

/// A maximal run of consecutive dates sharing an identical time set.
struct DateRangeGroup {
    start: String,
    end: String,
    times: Vec<String>,
}

/// Renders the digest for one snapshot.
///
/// Titles and venues come out alphabetically, dates ascending and compressed
/// into ranges, so the output is independent of scrape completion order.
pub fn format_digest(snapshot: &ScrapeSnapshot, short_names: &[(&str, &str)]) -> String {
    let mut lines = vec!["🎬 FILM IN PROGRAMMAZIONE - MATERA\n".to_string()];

    // title -> venue short name -> date -> normalized times
    let mut films: BTreeMap<&str, BTreeMap<&str, BTreeMap<&str, BTreeSet<String>>>> =
        BTreeMap::new();

    for cinema in &snapshot.cinemas {
        let short = short_names
            .iter()
            .find(|(full, _)| *full == cinema.name)
            .map(|(_, short)| *short)
            .unwrap_or(cinema.name.as_str());

        for film in &cinema.films {
            if film.title.is_empty() {
                continue;
            }
            for slot in &film.schedule {
                for time in &slot.times {
                    films
                        .entry(film.title.as_str())
                        .or_default()
                        .entry(short)
                        .or_default()
                        .entry(slot.date.as_str())
                        .or_default()
                        .insert(time.replace('.', ":"));
                }
            }
        }
    }

    for (title, venues) in &films {
        lines.push(format!("📽️ {title}"));
        for (venue, dates) in venues {
            for group in compress_ranges(dates) {
                lines.push(format!(
                    "   📅 {} · {}",
                    format_range(&group.start, &group.end),
                    venue
                ));
                lines.push(format!("      🕐 {}", group.times.join(" • ")));
            }
        }
        lines.push(String::new());
    }

    if let Some(stamp) = render_timestamp(&snapshot.timestamp) {
        lines.push(format!("Aggiornato il {stamp}"));
    }

    lines.join("\n")
}

/// Walks dates in order; a new group starts whenever the time set changes or
/// the date is not exactly one day after the current group's end.
fn compress_ranges(dates: &BTreeMap<&str, BTreeSet<String>>) -> Vec<DateRangeGroup> {
    let mut groups: Vec<DateRangeGroup> = Vec::new();

    for (date, times) in dates {
        let times: Vec<String> = times.iter().cloned().collect();
        match groups.last_mut() {
            Some(current) if current.times == times && consecutive(&current.end, date) => {
                current.end = (*date).to_string();
            }
            _ => groups.push(DateRangeGroup {
                start: (*date).to_string(),
                end: (*date).to_string(),
                times,
            }),
        }
    }

    groups
}

fn consecutive(previous: &str, next: &str) -> bool {
    let (Ok(a), Ok(b)) = (
        NaiveDate::parse_from_str(previous, "%Y-%m-%d"),
        NaiveDate::parse_from_str(next, "%Y-%m-%d"),
    ) else {
        return false;
    };
    (b - a).num_days() == 1
}

fn month_name(component: &str) -> String {
    match component.parse::<usize>() {
        Ok(n) if (1..=12).contains(&n) => MONTH_NAMES[n - 1].to_string(),
        _ => component.to_string(),
    }
}

fn day_without_padding(component: &str) -> String {
    component
        .parse::<u32>()
        .map(|day| day.to_string())
        .unwrap_or_else(|_| component.to_string())
}

fn split_date(date: &str) -> (&str, &str, &str) {
    let mut parts = date.splitn(3, '-');
    let year = parts.next().unwrap_or_default();
    let month = parts.next().unwrap_or_default();
    let day = parts.next().unwrap_or_default();
    (year, month, day)
}

/// "2025-06-10" -> "10 giugno"
fn format_date(date: &str) -> String {
    let (_, month, day) = split_date(date);
    format!("{} {}", day_without_padding(day), month_name(month))
}

fn format_range(start: &str, end: &str) -> String {
    if start == end {
        return format_date(start);
    }
    let (start_year, start_month, start_day) = split_date(start);
    let (end_year, end_month, end_day) = split_date(end);
    if start_year == end_year && start_month == end_month {
        format!(
            "{}-{} {}",
            day_without_padding(start_day),
            day_without_padding(end_day),
            month_name(start_month)
        )
    } else {
        format!("{} → {}", format_date(start), format_date(end))
    }
}

/// "2025-06-10T14:30:00.123456" (optionally with offset) -> "10/06/2025 alle 14:30".
/// An unparseable timestamp is not an error; the line is just omitted.
fn render_timestamp(timestamp: &str) -> Option<String> {
    let cleaned = timestamp.replace('Z', "+00:00");
    let parsed = chrono::DateTime::parse_from_rfc3339(&cleaned)
        .map(|dt| dt.naive_local())
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(&cleaned, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()?;
    Some(parsed.format("%d/%m/%Y alle %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cinema, Film, ShowtimeSlot};

    fn slot(date: &str, times: &[&str]) -> ShowtimeSlot {
        ShowtimeSlot {
            date: date.to_string(),
            weekday: "MAR".to_string(),
            times: times.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn snapshot_with(films: Vec<Film>, timestamp: &str) -> ScrapeSnapshot {
        ScrapeSnapshot {
            timestamp: timestamp.to_string(),
            cinemas: vec![Cinema {
                name: "Cinema Comunale Guerrieri".to_string(),
                url: "https://www.comingsoon.it/cinema/matera/cinema-comunale-guerrieri/2635/"
                    .to_string(),
                films,
            }],
        }
    }

    fn film(title: &str, schedule: Vec<ShowtimeSlot>) -> Film {
        Film {
            title: title.to_string(),
            times: Vec::new(),
            room: None,
            schedule,
        }
    }

    #[test]
    fn consecutive_days_with_identical_times_compress_into_a_range() {
        let snapshot = snapshot_with(
            vec![film(
                "Oppenheimer",
                vec![
                    slot("2025-06-10", &["20:00"]),
                    slot("2025-06-11", &["20:00"]),
                    slot("2025-06-12", &["20:00"]),
                    slot("2025-06-13", &["19:00"]),
                ],
            )],
            "",
        );

        let digest = format_digest(&snapshot, SHORT_NAMES);
        assert!(digest.contains("📽️ Oppenheimer"));
        assert!(digest.contains("   📅 10-12 giugno · Guerrieri"));
        assert!(digest.contains("      🕐 20:00"));
        assert!(digest.contains("   📅 13 giugno · Guerrieri"));
        assert!(digest.contains("      🕐 19:00"));
        assert!(!digest.contains("Aggiornato il"));
    }

    #[test]
    fn cross_month_range_renders_both_ends() {
        let snapshot = snapshot_with(
            vec![film(
                "Dune",
                vec![slot("2025-06-30", &["20:00"]), slot("2025-07-01", &["20:00"])],
            )],
            "",
        );

        let digest = format_digest(&snapshot, SHORT_NAMES);
        assert!(digest.contains("📅 30 giugno → 1 luglio · Guerrieri"));
    }

    #[test]
    fn non_consecutive_days_stay_separate_groups() {
        let snapshot = snapshot_with(
            vec![film(
                "Anora",
                vec![slot("2025-06-10", &["20:00"]), slot("2025-06-12", &["20:00"])],
            )],
            "",
        );

        let digest = format_digest(&snapshot, SHORT_NAMES);
        assert!(digest.contains("📅 10 giugno · Guerrieri"));
        assert!(digest.contains("📅 12 giugno · Guerrieri"));
        assert!(!digest.contains("10-12"));
    }

    #[test]
    fn dot_and_colon_times_dedupe_after_normalization() {
        let snapshot = snapshot_with(
            vec![film(
                "Nosferatu",
                vec![slot("2025-06-10", &["20.00", "20:00", "18:30"])],
            )],
            "",
        );

        let digest = format_digest(&snapshot, SHORT_NAMES);
        assert!(digest.contains("🕐 18:30 • 20:00"));
    }

    #[test]
    fn titles_and_venues_sort_alphabetically() {
        let mut snapshot = snapshot_with(
            vec![
                film("Zodiac", vec![slot("2025-06-10", &["20:00"])]),
                film("Anora", vec![slot("2025-06-10", &["20:00"])]),
            ],
            "",
        );
        snapshot.cinemas.push(Cinema {
            name: "Il Piccolo".to_string(),
            url: "https://www.comingsoon.it/cinema/matera/il-piccolo/4976/".to_string(),
            films: vec![film("Anora", vec![slot("2025-06-10", &["18:00"])])],
        });

        let digest = format_digest(&snapshot, SHORT_NAMES);
        let anora = digest.find("📽️ Anora").unwrap();
        let zodiac = digest.find("📽️ Zodiac").unwrap();
        assert!(anora < zodiac);

        let guerrieri = digest.find("· Guerrieri").unwrap();
        let piccolo = digest.find("· Piccolo").unwrap();
        assert!(guerrieri < piccolo);
    }

    #[test]
    fn range_compression_is_lossless_and_maximal() {
        let mut dates: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
        for (date, times) in [
            ("2025-06-10", vec!["20:00"]),
            ("2025-06-11", vec!["20:00"]),
            ("2025-06-12", vec!["18:00", "20:00"]),
            ("2025-06-14", vec!["18:00", "20:00"]),
            ("2025-06-15", vec!["18:00", "20:00"]),
        ] {
            dates.insert(date, times.into_iter().map(String::from).collect());
        }

        let groups = compress_ranges(&dates);

        // Lossless: expanding every group reproduces the input exactly.
        let mut rebuilt: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for group in &groups {
            let mut day = NaiveDate::parse_from_str(&group.start, "%Y-%m-%d").unwrap();
            let end = NaiveDate::parse_from_str(&group.end, "%Y-%m-%d").unwrap();
            while day <= end {
                rebuilt.insert(
                    day.format("%Y-%m-%d").to_string(),
                    group.times.iter().cloned().collect(),
                );
                day = day.succ_opt().unwrap();
            }
        }
        let original: BTreeMap<String, BTreeSet<String>> = dates
            .iter()
            .map(|(date, times)| (date.to_string(), times.clone()))
            .collect();
        assert_eq!(rebuilt, original);

        // Maximal: no adjacent pair could merge.
        for pair in groups.windows(2) {
            let mergeable =
                pair[0].times == pair[1].times && consecutive(&pair[0].end, &pair[1].start);
            assert!(!mergeable);
        }
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn timestamp_renders_in_italian_display_format() {
        let snapshot = snapshot_with(
            vec![film("Dune", vec![slot("2025-06-10", &["20:00"])])],
            "2025-06-10T14:30:00.123456",
        );

        let digest = format_digest(&snapshot, SHORT_NAMES);
        assert!(digest.ends_with("Aggiornato il 10/06/2025 alle 14:30"));
    }

    #[test]
    fn unparseable_timestamp_omits_the_trailing_line() {
        let snapshot = snapshot_with(
            vec![film("Dune", vec![slot("2025-06-10", &["20:00"])])],
            "not a timestamp",
        );
        assert!(!format_digest(&snapshot, SHORT_NAMES).contains("Aggiornato"));
    }

    #[test]
    fn header_survives_an_empty_snapshot() {
        let snapshot = ScrapeSnapshot {
            timestamp: String::new(),
            cinemas: Vec::new(),
        };
        let digest = format_digest(&snapshot, SHORT_NAMES);
        assert!(digest.starts_with("🎬 FILM IN PROGRAMMAZIONE - MATERA"));
    }
}
