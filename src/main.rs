mod analyzer;
mod chart;
mod client;
mod config;
mod model;
mod normalizer;
mod pipeline;
mod utils;

use client::{HttpClient, MentionSource, NytClient, TmdbClient};
use config::{load_config, Credentials};
use pipeline::Pipeline;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_PATH_VAR: &str = "MOVIE_TRENDS_CONFIG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    let config_path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.json".to_string());
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let credentials = match Credentials::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let http = match HttpClient::new(config.request_timeout(), config.retry_delay()) {
        Ok(h) => h,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tmdb = TmdbClient::new(
        http.clone(),
        &config.tmdb_base_url,
        &credentials.tmdb_api_key,
        config.max_pages,
        config.max_movies_per_entity,
    );
    let nyt = NytClient::new(http, &config.nyt_base_url, &credentials.nyt_api_key, config.end_year);
    let mentions: Option<&dyn MentionSource> = config.fetch_mentions.then_some(&nyt as &dyn MentionSource);

    info!(
        "Analyzing {} genres and {} actors for {}",
        config.genres.len(),
        config.actors.len(),
        config.years()
    );
    let report = Pipeline::new(&config, &tmdb, mentions).run().await;

    let analysis = &report.analysis;
    info!(
        "Aggregated {} genre rows, {} actor rows and {} actor summaries",
        analysis.genre_rows.len(),
        analysis.actor_rows.len(),
        analysis.actor_summaries.len()
    );
    if analysis.genre_rows.is_empty() && analysis.actor_rows.is_empty() {
        warn!("No movies were collected for {}", config.years());
    }
    if report.charts.is_empty() {
        warn!("No charts were written");
    }
    for path in &report.charts {
        info!("Chart: {}", path.display());
    }
    ExitCode::SUCCESS
}
