//! Enrichment of scraped films with Trakt metadata.
//!
//! Films are aggregated by exact title across venues, then looked up once
//! per title. A failed lookup stays local to its title.

use std::collections::{BTreeMap, BTreeSet};

use reqwest::Client;
use serde::Serialize;
use tracing::warn;

use crate::trakt::{self, TraktError};
use crate::{Cinema, ShowtimeSlot};

/// Diagnostic note attached to a title whose Trakt lookup failed.
#[derive(Debug, Clone, Serialize)]
pub struct TraktFailure {
    pub status: Option<u16>,
    pub message: String,
}

/// One title aggregated across venues, carrying whatever ids Trakt returned.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedFilm {
    pub title: String,
    pub cinema: Vec<String>,
    pub programmazione: Vec<ShowtimeSlot>,
    pub tmdb: Option<u64>,
    pub imdb: Option<String>,
    pub imdb_url: Option<String>,
    /// Numeric Trakt id when available, slug otherwise.
    pub trakt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trakt_error: Option<TraktFailure>,
}

/// title -> (venues showing it, concatenated schedule)
fn aggregate_by_title(cinemas: &[Cinema]) -> BTreeMap<String, (BTreeSet<String>, Vec<ShowtimeSlot>)> {
    let mut films: BTreeMap<String, (BTreeSet<String>, Vec<ShowtimeSlot>)> = BTreeMap::new();

    for cinema in cinemas {
        for film in &cinema.films {
            if film.title.is_empty() {
                continue;
            }
            let entry = films.entry(film.title.clone()).or_default();
            entry.0.insert(cinema.name.clone());
            entry.1.extend(film.schedule.iter().cloned());
        }
    }

    films
}

/// Queries Trakt once per distinct title (best match only).
///
/// Remote failures are recorded on the affected title and aggregation
/// continues; the missing-credential case belongs to the caller, before any
/// scraping or lookup starts.
pub async fn enrich_with_trakt(
    client: &Client,
    client_id: &str,
    cinemas: &[Cinema],
) -> BTreeMap<String, EnrichedFilm> {
    let mut enriched = BTreeMap::new();

    for (title, (venues, schedule)) in aggregate_by_title(cinemas) {
        let mut film = EnrichedFilm {
            title: title.clone(),
            cinema: venues.into_iter().collect(),
            programmazione: schedule,
            tmdb: None,
            imdb: None,
            imdb_url: None,
            trakt: None,
            trakt_error: None,
        };

        match trakt::search_movie(client, client_id, &title, None, 1).await {
            Ok(results) => match results.into_iter().next() {
                Some(best) => {
                    film.tmdb = best.tmdb;
                    film.imdb = best.imdb;
                    film.trakt = best.trakt.map(|id| id.to_string()).or(best.slug);
                    if let Some(ref imdb) = film.imdb {
                        film.imdb_url = Some(format!("https://www.imdb.com/title/{imdb}/"));
                    }
                }
                None => {
                    film.trakt_error = Some(TraktFailure {
                        status: None,
                        message: "not found".to_string(),
                    });
                }
            },
            Err(TraktError::Api { status, message }) => {
                warn!(title = %title, status, "Trakt search failed");
                film.trakt_error = Some(TraktFailure {
                    status: Some(status),
                    message,
                });
            }
            Err(err) => {
                warn!(title = %title, error = %err, "Trakt request failed");
                film.trakt_error = Some(TraktFailure {
                    status: None,
                    message: err.to_string(),
                });
            }
        }

        enriched.insert(title, film);
    }

    enriched
}
