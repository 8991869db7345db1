//! Per-venue aggregation: list page, per-film ticket pages, snapshot.

use std::sync::Arc;

use tracing::{info, warn};

use crate::detail::extract_schedule;
use crate::dom::Page;
use crate::fetch::PageFetcher;
use crate::listing::{ListedFilm, extract_listing};
use crate::{Cinema, Film, ScrapeSnapshot};

/// The Matera venues on comingsoon.it.
pub const CINEMA_URLS: &[(&str, &str)] = &[
    (
        "Cinema Comunale Guerrieri",
        "https://www.comingsoon.it/cinema/matera/cinema-comunale-guerrieri/2635/",
    ),
    (
        "Il Piccolo",
        "https://www.comingsoon.it/cinema/matera/il-piccolo/4976/",
    ),
    (
        "UCI Cinemas Red Carpet",
        "https://www.comingsoon.it/cinema/matera/uci-cinemas-red-carpet/5635/",
    ),
];

/// Scrapes one venue. A list-page fetch failure degrades to an empty film
/// list, and a ticket-page failure to an empty schedule for that film only;
/// a dead venue or film never aborts the snapshot.
pub async fn scrape_cinema(fetcher: &dyn PageFetcher, name: &str, url: &str) -> Cinema {
    let body = match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(err) => {
            warn!(cinema = name, error = %err, "list page fetch failed");
            return Cinema {
                name: name.to_string(),
                url: url.to_string(),
                films: Vec::new(),
            };
        }
    };

    // Parse in a scope of its own: the document tree must not live across
    // the detail-page awaits below.
    let listed = {
        let page = Page::parse(&body);
        extract_listing(&page, url)
    };

    let today = chrono::Local::now().date_naive();
    let mut films = Vec::new();

    for film in listed {
        let ListedFilm {
            title,
            times,
            room,
            detail_url,
        } = film;

        let schedule = match detail_url {
            Some(detail_url) => match fetcher.fetch(&detail_url).await {
                Ok(detail_body) => {
                    let page = Page::parse(&detail_body);
                    extract_schedule(&page, today)
                }
                Err(err) => {
                    warn!(cinema = name, title = %title, error = %err, "ticket page fetch failed");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        films.push(Film {
            title,
            times,
            room,
            schedule,
        });
    }

    Cinema {
        name: name.to_string(),
        url: url.to_string(),
        films,
    }
}

/// Scrapes every configured venue: one task per venue, joined in declaration
/// order so the snapshot's venue order never depends on fetch interleaving.
pub async fn scrape_all(fetcher: Arc<dyn PageFetcher>) -> ScrapeSnapshot {
    let mut handles = Vec::new();
    for &(name, url) in CINEMA_URLS {
        let fetcher = Arc::clone(&fetcher);
        handles.push(tokio::spawn(async move {
            scrape_cinema(fetcher.as_ref(), name, url).await
        }));
    }

    let mut cinemas = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(cinema) => {
                info!(cinema = %cinema.name, films = cinema.films.len(), "venue scraped");
                cinemas.push(cinema);
            }
            Err(err) => warn!(error = %err, "venue task failed"),
        }
    }

    ScrapeSnapshot {
        timestamp: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        cinemas,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::fetch::FetchError;

    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    impl StubFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::new("timed out"))
        }
    }

    const LIST_PAGE: &str = r#"
        <div class="header-scheda streaming">
          <a class="tit_olo">Inside Out 3</a>
          <div class="cs-btn col sala"><span>Sala 2 | Posti 300</span><span>17.30 / 7,00&euro;</span></div>
          <a href="/cinema/ticket/1/">Acquista biglietto e vedi tutte le date</a>
        </div>"#;

    const TICKET_PAGE: &str = r#"
        <div class="media mbm">
          <div class="media-left">
            <span class="weekday">MAR</span><span class="day">10</span><span class="month">GIU</span>
          </div>
          <div class="media-body">
            <button class="btn-fab c">18:00</button>
            <button class="btn-fab c">21:00</button>
          </div>
        </div>"#;

    #[tokio::test]
    async fn list_and_ticket_pages_combine_into_one_film() {
        let fetcher = StubFetcher::new(&[
            ("https://venue.example/list/", LIST_PAGE),
            ("https://venue.example/cinema/ticket/1/", TICKET_PAGE),
        ]);

        let cinema = scrape_cinema(&fetcher, "Il Piccolo", "https://venue.example/list/").await;

        assert_eq!(cinema.films.len(), 1);
        let film = &cinema.films[0];
        assert_eq!(film.title, "Inside Out 3");
        assert_eq!(film.times, vec!["17.30"]);
        assert_eq!(film.room.as_deref(), Some("Sala 2"));
        assert_eq!(film.schedule.len(), 1);
        assert!(film.schedule[0].date.ends_with("-06-10"));
        assert_eq!(film.schedule[0].times, vec!["18:00", "21:00"]);
    }

    #[tokio::test]
    async fn ticket_page_failure_empties_only_that_schedule() {
        let fetcher = StubFetcher::new(&[("https://venue.example/list/", LIST_PAGE)]);

        let cinema = scrape_cinema(&fetcher, "Il Piccolo", "https://venue.example/list/").await;

        assert_eq!(cinema.films.len(), 1);
        assert_eq!(cinema.films[0].times, vec!["17.30"]);
        assert!(cinema.films[0].schedule.is_empty());
    }

    #[tokio::test]
    async fn venue_fetch_failure_yields_empty_film_list() {
        let fetcher = StubFetcher::new(&[]);

        let cinema = scrape_cinema(&fetcher, "Il Piccolo", "https://venue.example/list/").await;

        assert_eq!(cinema.name, "Il Piccolo");
        assert_eq!(cinema.url, "https://venue.example/list/");
        assert!(cinema.films.is_empty());
    }

    #[tokio::test]
    async fn dead_venue_does_not_abort_the_snapshot() {
        // Only the second configured venue resolves; the other two time out.
        let fetcher = StubFetcher::new(&[(CINEMA_URLS[1].1, LIST_PAGE)]);

        let snapshot = scrape_all(Arc::new(fetcher)).await;

        assert_eq!(snapshot.cinemas.len(), CINEMA_URLS.len());
        let names: Vec<&str> = snapshot.cinemas.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            CINEMA_URLS.iter().map(|(n, _)| *n).collect::<Vec<_>>()
        );
        assert!(snapshot.cinemas[0].films.is_empty());
        assert_eq!(snapshot.cinemas[1].films.len(), 1);
        assert!(snapshot.cinemas[2].films.is_empty());
    }
}
