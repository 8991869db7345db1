//! Film extraction from a venue's list page.
//!
//! comingsoon.it has two known layouts: the usual one marks each film card
//! with `header-scheda streaming` classes; an older variant only has a
//! "Film in programmazione" heading with plain `header-scheda` cards inside
//! the enclosing section.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::{Node, Page};
use crate::times::extract_times;

static ROOM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Sala\s+(\d+)").expect("room regex"));
static CLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,2}[.:]\d{2}").expect("clock regex"));
static BUY_TICKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)acquista.*biglietto").expect("ticket anchor regex"));

/// One film as it appears on a list page. `detail_url`, when present, points
/// at the ticketing calendar carrying the authoritative multi-day schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedFilm {
    pub title: String,
    pub times: Vec<String>,
    pub room: Option<String>,
    pub detail_url: Option<String>,
}

fn primary_cards<'a>(page: &'a Page) -> Vec<Node<'a>> {
    page.root().find_all("div.header-scheda.streaming")
}

fn heading_fallback<'a>(page: &'a Page) -> Vec<Node<'a>> {
    for heading in page.root().find_all("h2") {
        if !heading
            .text()
            .to_lowercase()
            .contains("film in programmazione")
        {
            continue;
        }
        if let Some(section) = heading.ancestor("section") {
            let cards = section.find_all("div.header-scheda");
            if !cards.is_empty() {
                return cards;
            }
        }
    }
    Vec::new()
}

/// Strategies in priority order; the first one to yield cards wins.
fn film_cards<'a>(page: &'a Page) -> Vec<Node<'a>> {
    let strategies: [for<'p> fn(&'p Page) -> Vec<Node<'p>>; 2] = [primary_cards, heading_fallback];
    for strategy in strategies {
        let cards = strategy(page);
        if !cards.is_empty() {
            return cards;
        }
    }
    Vec::new()
}

/// Extracts every film visible on a venue list page.
///
/// Never fails: a page with no recognizable film card yields an empty vec,
/// and a card without a usable title carries no signal and is skipped.
pub fn extract_listing(page: &Page, venue_url: &str) -> Vec<ListedFilm> {
    let origin = origin_of(venue_url);
    let mut films = Vec::new();

    for card in film_cards(page) {
        let Some(title_node) = card.find_first("a.tit_olo") else {
            continue;
        };
        let title = title_node.text();
        if title.is_empty() {
            continue;
        }

        let mut times = Vec::new();
        let mut room = None;

        if let Some(schedule) = card.find_first("div.cs-btn.sala") {
            let spans = schedule.find_all("span");

            // Hall label sits in its own span ahead of the clock span.
            if let Some(sala_span) = spans.iter().find(|s| s.text().to_lowercase().contains("sala"))
            {
                room = room_label(&sala_span.text());
            }

            let schedule_text = spans
                .iter()
                .map(|s| s.text())
                .find(|t| CLOCK.is_match(t))
                .unwrap_or_else(|| schedule.text());
            times = extract_times(&schedule_text);
        }

        // Some cards drop the dedicated schedule element; the card text still
        // carries the tokens.
        if times.is_empty() {
            let card_text = card.text();
            times = extract_times(&card_text);
            if room.is_none() {
                room = room_label(&card_text);
            }
        }

        let detail_url = ticket_link(&card).map(|href| absolutize(&href, &origin));

        // Emitted even with no times anywhere: upcoming titles are valid,
        // schedule-less entries.
        films.push(ListedFilm {
            title,
            times,
            room,
            detail_url,
        });
    }

    films
}

fn room_label(text: &str) -> Option<String> {
    ROOM.captures(text).map(|caps| format!("Sala {}", &caps[1]))
}

/// Ticketing link on a card: by href convention first, by anchor text second.
fn ticket_link(card: &Node) -> Option<String> {
    let anchors = card.find_all("a");

    for anchor in &anchors {
        if let Some(href) = anchor.attr("href")
            && !href.trim().is_empty()
            && href.to_lowercase().contains("ticket")
        {
            return Some(href.trim().to_string());
        }
    }

    for anchor in &anchors {
        if BUY_TICKET.is_match(&anchor.text())
            && let Some(href) = anchor.attr("href")
            && !href.trim().is_empty()
        {
            return Some(href.trim().to_string());
        }
    }

    None
}

/// "https://www.comingsoon.it/cinema/matera/..." -> "https://www.comingsoon.it"
fn origin_of(url: &str) -> String {
    if let Some(scheme_end) = url.find("://") {
        let rest = &url[scheme_end + 3..];
        match rest.find('/') {
            Some(path_start) => url[..scheme_end + 3 + path_start].to_string(),
            None => url.to_string(),
        }
    } else {
        url.trim_end_matches('/').to_string()
    }
}

fn absolutize(href: &str, origin: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}
