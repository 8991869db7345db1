use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use matera_scrape::digest::{self, format_digest};
use matera_scrape::fetch::HttpFetcher;
use matera_scrape::scrape::scrape_all;
use matera_scrape::{enrich, trakt};

const SNAPSHOT_FILE: &str = "programmazione_cinema_matera.json";
const ENRICHED_FILE: &str = "programmazione_cinema_matera_with_trakt.json";
const MESSAGE_FILE: &str = "messaggio_telegram.txt";

#[derive(Parser)]
#[command(about = "Showtime scraper for the Matera cinemas on comingsoon.it")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape all venues, write the JSON snapshot and the Telegram digest
    Scrape {
        /// Also enrich titles with TMDB/IMDB ids via Trakt
        #[arg(long)]
        trakt: bool,
    },
    /// Search a movie on Trakt
    Search {
        query: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Scrape { trakt: with_trakt } => {
            // A missing client ID must fail before any scraping happens.
            let client_id = if with_trakt {
                Some(trakt::client_id_from_env()?)
            } else {
                None
            };

            let fetcher = Arc::new(HttpFetcher::new()?);
            let snapshot = scrape_all(fetcher).await;

            std::fs::write(SNAPSHOT_FILE, serde_json::to_string_pretty(&snapshot)?)?;

            let message = format_digest(&snapshot, digest::SHORT_NAMES);
            std::fs::write(MESSAGE_FILE, &message)?;
            println!("{message}");

            if let Some(client_id) = client_id {
                let client = trakt::http_client()?;
                let films =
                    enrich::enrich_with_trakt(&client, &client_id, &snapshot.cinemas).await;
                let enriched = serde_json::json!({
                    "timestamp": snapshot.timestamp,
                    "films": films,
                });
                std::fs::write(ENRICHED_FILE, serde_json::to_string_pretty(&enriched)?)?;
            }

            Ok(())
        }
        Command::Search { query, year, limit } => {
            let client_id = trakt::client_id_from_env()?;
            let client = trakt::http_client()?;
            let results = trakt::search_movie(&client, &client_id, &query, year, limit).await?;
            println!("{}", trakt::format_results(&results));
            Ok(())
        }
    }
}
