//! Trakt movie search: title → TMDB/IMDB/Trakt ids.
//! Endpoint: https://api.trakt.tv/search/movie (API version 2).

use std::time::Duration;

use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TRAKT_API_URL: &str = "https://api.trakt.tv";
const TRAKT_API_VERSION: &str = "2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum TraktError {
    /// Configuration failure: surfaced immediately, never retried or
    /// silently degraded.
    #[error("TRAKT_CLIENT_ID not set. Export it with `export TRAKT_CLIENT_ID=...`")]
    MissingClientId,
    #[error("Trakt API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Trakt request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Reads the caller credential from the environment.
pub fn client_id_from_env() -> Result<String, TraktError> {
    std::env::var("TRAKT_CLIENT_ID")
        .ok()
        .filter(|id| !id.is_empty())
        .ok_or(TraktError::MissingClientId)
}

pub fn http_client() -> Result<Client, TraktError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    score: Option<f64>,
    #[serde(default)]
    movie: MovieBody,
}

#[derive(Debug, Default, Deserialize)]
struct MovieBody {
    title: Option<String>,
    year: Option<i32>,
    #[serde(default)]
    ids: MovieIds,
}

#[derive(Debug, Default, Deserialize)]
struct MovieIds {
    slug: Option<String>,
    tmdb: Option<u64>,
    imdb: Option<String>,
    trakt: Option<u64>,
}

/// One search match with the external ids downstream consumers link to.
#[derive(Debug, Clone, Serialize)]
pub struct MovieMatch {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub slug: Option<String>,
    pub tmdb: Option<u64>,
    pub imdb: Option<String>,
    pub trakt: Option<u64>,
    pub score: Option<f64>,
}

/// Searches movies by title, best match first.
pub async fn search_movie(
    client: &Client,
    client_id: &str,
    query: &str,
    year: Option<i32>,
    limit: u32,
) -> Result<Vec<MovieMatch>, TraktError> {
    let mut params: Vec<(&str, String)> = vec![
        ("query", query.to_string()),
        ("type", "movie".to_string()),
        ("limit", limit.to_string()),
    ];
    if let Some(year) = year {
        params.push(("year", year.to_string()));
    }

    let resp = client
        .get(format!("{TRAKT_API_URL}/search/movie"))
        .query(&params)
        .header(header::ACCEPT, "application/json")
        .header(header::CONTENT_TYPE, "application/json")
        .header("trakt-api-version", TRAKT_API_VERSION)
        .header("trakt-api-key", client_id)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(TraktError::Api {
            status: status.as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }

    let items: Vec<SearchItem> = resp.json().await?;
    Ok(items
        .into_iter()
        .map(|item| MovieMatch {
            title: item.movie.title,
            year: item.movie.year,
            slug: item.movie.ids.slug,
            tmdb: item.movie.ids.tmdb,
            imdb: item.movie.ids.imdb,
            trakt: item.movie.ids.trakt,
            score: item.score,
        })
        .collect())
}

/// Plain-text rendering for the search CLI.
pub fn format_results(results: &[MovieMatch]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let mut lines = Vec::new();
    for (idx, result) in results.iter().enumerate() {
        let title = result.title.as_deref().unwrap_or("?");
        let year = result
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "?".to_string());
        lines.push(format!("{}. {} ({})", idx + 1, title, year));
        if let Some(score) = result.score {
            lines.push(format!("   Score: {score}"));
        }
        lines.push(format!(
            "   Trakt slug: {}",
            result.slug.as_deref().unwrap_or("n/a")
        ));
        match result.tmdb {
            Some(tmdb) => lines.push(format!("   TMDB: https://www.themoviedb.org/movie/{tmdb}")),
            None => lines.push("   TMDB: n/a".to_string()),
        }
        match &result.imdb {
            Some(imdb) => lines.push(format!("   IMDB: https://www.imdb.com/title/{imdb}/")),
            None => lines.push("   IMDB: n/a".to_string()),
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
