// Sequential fetch -> aggregate -> plot run.
use crate::analyzer::indicators::rating_mention_correlation;
use crate::analyzer::{observations_by_genre, Aggregator};
use crate::chart::{self, ChartSize, Metric};
use crate::client::{MentionSource, MovieSource};
use crate::config::AppConfig;
use crate::model::{
    ActorSummary, AggregateRow, ApiError, ChartError, GroupKey, MentionRecord, MovieRecord, Observation,
};
use crate::utils::to_kebab_case;
use futures::TryStreamExt;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Everything fetched during one run.
#[derive(Debug, Default)]
pub struct Collected {
    pub observations: Vec<Observation>,
    pub mentions: Vec<MentionRecord>,
}

#[derive(Debug, Default)]
pub struct Analysis {
    pub genre_rows: Vec<AggregateRow>,
    pub actor_rows: Vec<AggregateRow>,
    pub actor_summaries: Vec<ActorSummary>,
}

#[derive(Debug, Default)]
pub struct Report {
    pub analysis: Analysis,
    pub charts: Vec<PathBuf>,
}

pub struct Pipeline<'a> {
    config: &'a AppConfig,
    movies: &'a dyn MovieSource,
    mentions: Option<&'a dyn MentionSource>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a AppConfig,
        movies: &'a dyn MovieSource,
        mentions: Option<&'a dyn MentionSource>,
    ) -> Self {
        Self { config, movies, mentions }
    }

    pub async fn run(&self) -> Report {
        let collected = self.collect().await;
        let analysis = analyze(&collected);
        log_report(&collected, &analysis);
        let charts = self.render(&analysis);
        Report { analysis, charts }
    }

    /// Fetches every configured genre and actor; a failing entity is logged and skipped.
    pub async fn collect(&self) -> Collected {
        let years = self.config.years();
        let mut observations = Vec::new();

        for &genre in &self.config.genres {
            info!("Fetching {} movies ({})...", genre, years);
            match self.movies.movies_for_genre(genre, years).try_collect::<Vec<_>>().await {
                Ok(movies) => {
                    info!("{}: {} movies", genre, movies.len());
                    observations.extend(observations_by_genre(&movies));
                }
                Err(e) => warn!("Skipping genre {}: {}", genre, e),
            }
        }

        for actor in &self.config.actors {
            info!("Analyzing {} from {} to {}...", actor, years.start, years.end);
            match self.movies.movies_for_actor(actor, years).try_collect::<Vec<_>>().await {
                Ok(movies) if movies.is_empty() => warn!("No movies found for {}", actor),
                Ok(movies) => {
                    info!("{}: {} movies", actor, movies.len());
                    observations.extend(movies.into_iter().map(|movie| Observation {
                        key: GroupKey::Actor(actor.clone()),
                        movie,
                    }));
                }
                Err(e) => warn!("Skipping actor {}: {}", actor, e),
            }
        }

        let mentions = self.collect_mentions(&observations).await;
        Collected { observations, mentions }
    }

    /// One lookup per distinct movie. Rejected credentials stop further lookups.
    async fn collect_mentions(&self, observations: &[Observation]) -> Vec<MentionRecord> {
        let Some(source) = self.mentions else {
            info!("Mention lookups disabled");
            return Vec::new();
        };

        let mut found: BTreeMap<u64, MentionRecord> = BTreeMap::new();
        let mut failed: HashSet<u64> = HashSet::new();

        for movie in observations.iter().map(|o| &o.movie) {
            if found.contains_key(&movie.id) || failed.contains(&movie.id) {
                continue;
            }
            match source.mentions_for(movie).await {
                Ok(mention) => {
                    found.insert(movie.id, mention);
                }
                Err(e @ ApiError::Auth(_)) => {
                    error!("Mention lookups aborted: {}", e);
                    break;
                }
                Err(e) => {
                    warn!("No mentions for '{}' ({}): {}", movie.title, movie.year, e);
                    failed.insert(movie.id);
                }
            }
        }

        info!("Fetched mentions for {} movies", found.len());
        found.into_values().collect()
    }

    /// Writes every chart that has data; returns the written paths.
    pub fn render(&self, analysis: &Analysis) -> Vec<PathBuf> {
        let size = ChartSize {
            width: self.config.chart_width,
            height: self.config.chart_height,
        };
        let dir = &self.config.output_dir;
        let mut written = Vec::new();

        for metric in [Metric::AverageRating, Metric::Mentions] {
            let path = dir.join(format!("genre_{}.png", metric.slug()));
            record(
                chart::render_genre_lines(&analysis.genre_rows, metric, &path, size),
                path,
                &mut written,
            );
        }

        for actor in &self.config.actors {
            for metric in [Metric::AverageRating, Metric::Mentions] {
                let path = dir.join(format!("actor_{}_{}.png", to_kebab_case(actor), metric.slug()));
                record(
                    chart::render_actor_bars(&analysis.actor_rows, actor, metric, &path, size),
                    path,
                    &mut written,
                );
            }
        }

        let path = dir.join("actor_comparison.png");
        let title = format!("Actor Analysis ({})", self.config.years());
        record(
            chart::render_actor_comparison(&analysis.actor_summaries, &title, &path, size),
            path,
            &mut written,
        );

        written
    }
}

fn record(result: Result<(), ChartError>, path: PathBuf, written: &mut Vec<PathBuf>) {
    match result {
        Ok(()) => written.push(path),
        Err(ChartError::NoData(what)) => warn!("Chart {} skipped: no data for {}", path.display(), what),
        Err(e) => warn!("Chart {} failed: {}", path.display(), e),
    }
}

pub fn analyze(collected: &Collected) -> Analysis {
    let rows = Aggregator::aggregate(&collected.observations, &collected.mentions);
    let (genre_rows, actor_rows): (Vec<_>, Vec<_>) = rows.into_iter().partition(|r| r.key.is_genre());
    let actor_summaries = Aggregator::summarize_actors(&actor_rows);
    Analysis {
        genre_rows,
        actor_rows,
        actor_summaries,
    }
}

fn log_report(collected: &Collected, analysis: &Analysis) {
    let mentions: HashMap<u64, u64> = collected
        .mentions
        .iter()
        .map(|m| (m.movie_id, m.articles))
        .collect();

    for row in analysis.genre_rows.iter().chain(&analysis.actor_rows) {
        info!(
            "{} {}: {} movies, avg rating {}, {} mentions",
            row.key,
            row.year,
            row.movies,
            fmt_rating(row.average_rating),
            fmt_mentions(row.total_mentions)
        );
    }

    for summary in &analysis.actor_summaries {
        info!(
            "Analysis for {}: {} movies, average TMDB rating {}, {} NYT mentions",
            summary.actor,
            summary.movies,
            fmt_rating(summary.average_rating),
            fmt_mentions(summary.total_mentions)
        );
        let movies = collected
            .observations
            .iter()
            .filter(|o| matches!(&o.key, GroupKey::Actor(a) if *a == summary.actor))
            .map(|o| &o.movie);
        for movie in movies {
            info!("  {}", describe_movie(movie, mentions.get(&movie.id).copied()));
        }
    }

    match rating_mention_correlation(&analysis.genre_rows) {
        Some(r) => info!("Genre rating/mention correlation: {:.2}", r),
        None => info!("Genre rating/mention correlation: not enough data"),
    }
}

fn describe_movie(movie: &MovieRecord, mentions: Option<u64>) -> String {
    format!(
        "{} ({}) - Rating: {} - NYT mentions: {}",
        movie.title,
        movie.year,
        fmt_rating(movie.rating),
        fmt_mentions(mentions)
    )
}

fn fmt_mentions(mentions: Option<u64>) -> String {
    mentions.map_or_else(|| "n/a".to_string(), |m| m.to_string())
}

fn fmt_rating(rating: Option<f64>) -> String {
    rating.map_or_else(|| "n/a".to_string(), |r| format!("{:.2}", r))
}
